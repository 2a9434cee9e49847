use super::expressions::Expression;
use super::names::QualifiedName;

///////////////////////////////////////////////////////////////////////////////

/// Where an annotation is written: nested in its target or in an `Annotations` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationLocation {
    Inline,
    OutOfLine,
}

/// Application of a term to a model element
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyAnnotation {
    pub target: AnnotationTarget,
    pub term: QualifiedName,
    pub qualifier: Option<String>,
    pub value: Expression,
    /// Explicit placement, derived from the value and target when unset
    pub location: Option<SerializationLocation>,
    /// Schema receiving the annotation when written out of line
    pub schema_namespace: Option<String>,
}

impl VocabularyAnnotation {
    pub fn new(target: AnnotationTarget, term: impl Into<QualifiedName>, value: Expression) -> Self {
        Self {
            target,
            term: term.into(),
            qualifier: None,
            value,
            location: None,
            schema_namespace: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_location(mut self, location: SerializationLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_schema_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.schema_namespace = Some(namespace.into());
        self
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Operation, optionally narrowed to one overload by its parameter type names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationTarget {
    pub operation: QualifiedName,
    pub signature: Option<Vec<String>>,
}

impl OperationTarget {
    /// Targets every overload of `operation`
    pub fn all_overloads(operation: impl Into<QualifiedName>) -> Self {
        Self {
            operation: operation.into(),
            signature: None,
        }
    }

    pub fn overload<I, S>(operation: impl Into<QualifiedName>, signature: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation: operation.into(),
            signature: Some(signature.into_iter().map(Into::into).collect()),
        }
    }

    fn covers(&self, other: &OperationTarget) -> bool {
        self.operation == other.operation
            && match (&self.signature, &other.signature) {
                (None, _) => true,
                (Some(a), Some(b)) => a == b,
                (Some(_), None) => false,
            }
    }

    pub fn path(&self) -> String {
        match &self.signature {
            Some(signature) => format!("{}({})", self.operation, signature.join(",")),
            None => self.operation.to_string(),
        }
    }
}

/// Element an annotation applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    /// Schema type, term or entity container
    Element(QualifiedName),
    Property {
        owner: QualifiedName,
        property: String,
    },
    EnumMember {
        enum_type: QualifiedName,
        member: String,
    },
    Operation(OperationTarget),
    Parameter {
        operation: OperationTarget,
        parameter: String,
    },
    ReturnType(OperationTarget),
    /// Entity set, singleton or operation import
    ContainerElement {
        container: QualifiedName,
        element: String,
    },
}

impl AnnotationTarget {
    pub fn element(name: impl Into<QualifiedName>) -> Self {
        Self::Element(name.into())
    }

    pub fn property(owner: impl Into<QualifiedName>, property: impl Into<String>) -> Self {
        Self::Property {
            owner: owner.into(),
            property: property.into(),
        }
    }

    pub fn enum_member(enum_type: impl Into<QualifiedName>, member: impl Into<String>) -> Self {
        Self::EnumMember {
            enum_type: enum_type.into(),
            member: member.into(),
        }
    }

    pub fn container_element(
        container: impl Into<QualifiedName>,
        element: impl Into<String>,
    ) -> Self {
        Self::ContainerElement {
            container: container.into(),
            element: element.into(),
        }
    }

    /// Path used as `Target` of out-of-line annotations
    pub fn path(&self) -> String {
        match self {
            Self::Element(name) => name.to_string(),
            Self::Property { owner, property } => format!("{owner}/{property}"),
            Self::EnumMember { enum_type, member } => format!("{enum_type}/{member}"),
            Self::Operation(op) => op.path(),
            Self::Parameter {
                operation,
                parameter,
            } => format!("{}/{parameter}", operation.path()),
            Self::ReturnType(op) => format!("{}/$ReturnType", op.path()),
            Self::ContainerElement { container, element } => format!("{container}/{element}"),
        }
    }

    /// Qualified name of the schema-level element the target lives in
    pub fn root(&self) -> &QualifiedName {
        match self {
            Self::Element(name) => name,
            Self::Property { owner, .. } => owner,
            Self::EnumMember { enum_type, .. } => enum_type,
            Self::Operation(op) | Self::ReturnType(op) => &op.operation,
            Self::Parameter { operation, .. } => &operation.operation,
            Self::ContainerElement { container, .. } => container,
        }
    }

    /// Whether annotations declared for `self` apply to the concrete element `other`.
    /// Operation targets without a signature cover every overload.
    pub fn covers(&self, other: &AnnotationTarget) -> bool {
        match (self, other) {
            (Self::Operation(a), Self::Operation(b)) | (Self::ReturnType(a), Self::ReturnType(b)) => {
                a.covers(b)
            }
            (
                Self::Parameter {
                    operation: a,
                    parameter: pa,
                },
                Self::Parameter {
                    operation: b,
                    parameter: pb,
                },
            ) => pa == pb && a.covers(b),
            _ => self == other,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Foreign-namespace value attached directly to an element, written as an XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectValueAnnotation {
    pub target: AnnotationTarget,
    pub namespace_uri: String,
    pub name: String,
    pub value: String,
}

impl DirectValueAnnotation {
    pub fn new(
        target: AnnotationTarget,
        namespace_uri: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target,
            namespace_uri: namespace_uri.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_paths() {
        let op = OperationTarget::overload("NS.GetTop", ["Edm.Int32", "Collection(NS.Product)"]);
        assert_eq!(
            AnnotationTarget::Operation(op.clone()).path(),
            "NS.GetTop(Edm.Int32,Collection(NS.Product))"
        );
        assert_eq!(
            AnnotationTarget::Parameter {
                operation: op.clone(),
                parameter: "count".into()
            }
            .path(),
            "NS.GetTop(Edm.Int32,Collection(NS.Product))/count"
        );
        assert_eq!(
            AnnotationTarget::ReturnType(OperationTarget::all_overloads("NS.GetTop")).path(),
            "NS.GetTop/$ReturnType"
        );
        assert_eq!(
            AnnotationTarget::enum_member("NS.Color", "Red").path(),
            "NS.Color/Red"
        );
        assert_eq!(
            AnnotationTarget::container_element("NS.Container", "Products").path(),
            "NS.Container/Products"
        );
    }

    #[test]
    fn test_unsigned_operation_target_covers_overloads() {
        let any = AnnotationTarget::Operation(OperationTarget::all_overloads("NS.F"));
        let one = AnnotationTarget::Operation(OperationTarget::overload("NS.F", ["Edm.String"]));
        let other = AnnotationTarget::Operation(OperationTarget::overload("NS.F", ["Edm.Int32"]));
        assert!(any.covers(&one));
        assert!(one.covers(&one));
        assert!(!one.covers(&other));
        assert!(!one.covers(&any));
    }
}
