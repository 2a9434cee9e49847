//! In-memory Entity Data Model consumed by the CSDL writers.
//!
//! The model is plain owned data: schema elements, entity containers and
//! annotations reference each other by [`QualifiedName`] and are resolved
//! through [`EdmModel`] lookups, so partner navigation properties, container
//! `Extends` and annotation targets never form ownership cycles.

mod annotations;
mod container;
mod elements;
mod expressions;
mod names;
mod references;
mod types;

pub use annotations::*;
pub use container::*;
pub use elements::*;
pub use expressions::*;
pub use names::*;
pub use references::*;
pub use types::*;

use indexmap::IndexMap;

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default)]
pub struct EdmModel {
    elements: Vec<SchemaElement>,
    containers: Vec<EntityContainer>,
    annotations: Vec<VocabularyAnnotation>,
    direct_annotations: Vec<DirectValueAnnotation>,
    references: Vec<EdmReference>,
    /// Namespace -> alias
    aliases: IndexMap<String, String>,
}

impl EdmModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: impl Into<SchemaElement>) -> &mut Self {
        self.elements.push(element.into());
        self
    }

    pub fn add_container(&mut self, container: EntityContainer) -> &mut Self {
        self.containers.push(container);
        self
    }

    pub fn add_annotation(&mut self, annotation: VocabularyAnnotation) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    pub fn add_direct_annotation(&mut self, annotation: DirectValueAnnotation) -> &mut Self {
        self.direct_annotations.push(annotation);
        self
    }

    pub fn add_reference(&mut self, reference: EdmReference) -> &mut Self {
        self.references.push(reference);
        self
    }

    pub fn set_namespace_alias(
        &mut self,
        namespace: impl Into<String>,
        alias: impl Into<String>,
    ) -> &mut Self {
        self.aliases.insert(namespace.into(), alias.into());
        self
    }

    ///////////////////////////////////////////////////////////////////////////

    pub fn schema_elements(&self) -> &[SchemaElement] {
        &self.elements
    }

    pub fn entity_containers(&self) -> &[EntityContainer] {
        &self.containers
    }

    /// The container advertised as the service's `$EntityContainer`
    pub fn entity_container(&self) -> Option<&EntityContainer> {
        self.containers.first()
    }

    pub fn vocabulary_annotations(&self) -> &[VocabularyAnnotation] {
        &self.annotations
    }

    pub fn references(&self) -> &[EdmReference] {
        &self.references
    }

    pub fn namespace_aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    /// Alias of a declared namespace, else the alias it was included under
    pub fn namespace_alias(&self, namespace: &str) -> Option<&str> {
        self.aliases.get(namespace).map(String::as_str).or_else(|| {
            self.references
                .iter()
                .flat_map(|r| r.includes.iter())
                .find(|i| i.namespace == namespace)
                .and_then(|i| i.alias.as_deref())
        })
    }

    /// Namespaces of declared elements and containers in first-seen order
    pub fn declared_namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = Vec::new();
        let all = self
            .elements
            .iter()
            .map(SchemaElement::namespace)
            .chain(self.containers.iter().map(|c| c.namespace.as_str()));
        for ns in all {
            if !namespaces.contains(&ns) {
                namespaces.push(ns);
            }
        }
        namespaces
    }

    /// Namespaces made available by `Include` elements of references
    pub fn included_namespaces(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .flat_map(|r| r.includes.iter())
            .map(|i| i.namespace.as_str())
    }

    /// Name as it should appear in the output: alias-qualified when the namespace has an alias
    pub fn serialization_name(&self, name: &QualifiedName) -> String {
        match self.namespace_alias(&name.namespace) {
            Some(alias) => format!("{alias}.{}", name.name),
            None => name.to_string(),
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    /// Any non-operation schema element
    pub fn find_element(&self, name: &QualifiedName) -> Option<&SchemaElement> {
        self.elements.iter().find(|e| {
            e.as_operation().is_none() && e.name() == name.name && e.namespace() == name.namespace
        })
    }

    pub fn find_type(&self, name: &QualifiedName) -> Option<&SchemaElement> {
        self.find_element(name).filter(|e| e.is_type())
    }

    /// The type named `name` followed by its declared base types, stopping at
    /// the first unresolved or repeated name
    pub fn type_hierarchy(&self, name: &QualifiedName) -> Vec<&SchemaElement> {
        let mut chain: Vec<&SchemaElement> = Vec::new();
        let mut current = self.find_type(name);
        while let Some(element) = current {
            if chain.iter().any(|e| std::ptr::eq(*e, element)) {
                break;
            }
            chain.push(element);
            current = element.base_type().and_then(|base| self.find_type(base));
        }
        chain
    }

    /// Whether `derived` is `base` or inherits from it
    pub fn is_same_or_derived(&self, derived: &QualifiedName, base: &QualifiedName) -> bool {
        derived == base
            || self
                .type_hierarchy(derived)
                .iter()
                .any(|t| t.qualified_name() == *base)
    }

    /// Property declared on the type or inherited from one of its base types
    pub fn find_property(&self, owner: &QualifiedName, property: &str) -> Option<&Property> {
        self.type_hierarchy(owner)
            .into_iter()
            .find_map(|t| t.properties().iter().find(|p| p.name() == property))
    }

    pub fn find_entity_type(&self, name: &QualifiedName) -> Option<&EntityType> {
        match self.find_element(name) {
            Some(SchemaElement::EntityType(e)) => Some(e),
            _ => None,
        }
    }

    pub fn find_term(&self, name: &QualifiedName) -> Option<&Term> {
        match self.find_element(name) {
            Some(SchemaElement::Term(t)) => Some(t),
            _ => None,
        }
    }

    /// All overloads declared under `name`
    pub fn find_operations(&self, name: &QualifiedName) -> Vec<&Operation> {
        self.matching_overloads(&OperationTarget::all_overloads(name))
    }

    pub fn find_entity_container(&self, name: &QualifiedName) -> Option<&EntityContainer> {
        self.containers
            .iter()
            .find(|c| c.name == name.name && c.namespace == name.namespace)
    }

    /// Annotations whose target covers `target`, in declaration order
    pub fn find_declared_vocabulary_annotations(
        &self,
        target: &AnnotationTarget,
    ) -> Vec<&VocabularyAnnotation> {
        self.annotations
            .iter()
            .filter(|a| a.target.covers(target))
            .collect()
    }

    pub fn direct_value_annotations(
        &self,
        target: &AnnotationTarget,
    ) -> Vec<&DirectValueAnnotation> {
        self.direct_annotations
            .iter()
            .filter(|a| a.target == *target)
            .collect()
    }

    pub fn all_direct_value_annotations(&self) -> &[DirectValueAnnotation] {
        &self.direct_annotations
    }

    ///////////////////////////////////////////////////////////////////////////

    /// Whether `target` names an element declared in this model
    pub fn resolves_target(&self, target: &AnnotationTarget) -> bool {
        let find_overloads = |op: &OperationTarget| self.matching_overloads(op);

        match target {
            AnnotationTarget::Element(name) => {
                self.find_element(name).is_some() || self.find_entity_container(name).is_some()
            }
            AnnotationTarget::Property { owner, property } => self
                .find_type(owner)
                .is_some_and(|t| t.properties().iter().any(|p| p.name() == property)),
            AnnotationTarget::EnumMember { enum_type, member } => match self.find_type(enum_type) {
                Some(SchemaElement::EnumType(e)) => e.members.iter().any(|m| m.name == *member),
                _ => false,
            },
            AnnotationTarget::Operation(op) => !find_overloads(op).is_empty(),
            AnnotationTarget::Parameter {
                operation,
                parameter,
            } => find_overloads(operation)
                .iter()
                .any(|o| o.parameters.iter().any(|p| p.name == *parameter)),
            AnnotationTarget::ReturnType(op) => find_overloads(op)
                .iter()
                .any(|o| o.return_type.is_some()),
            AnnotationTarget::ContainerElement { container, element } => self
                .find_entity_container(container)
                .is_some_and(|c| c.find_element(element).is_some()),
        }
    }

    fn matching_overloads(&self, target: &OperationTarget) -> Vec<&Operation> {
        self.elements
            .iter()
            .filter_map(SchemaElement::as_operation)
            .filter(|o| {
                o.name == target.operation.name && o.namespace == target.operation.namespace
            })
            .filter(|o| {
                target
                    .signature
                    .as_ref()
                    .map_or(true, |s| *s == o.signature())
            })
            .collect()
    }

    /// Explicit location wins; otherwise inline when the value is an
    /// attribute-style expression and the target is declared here.
    /// Targets spanning several overloads always go out of line.
    pub fn is_inline_annotation(&self, annotation: &VocabularyAnnotation) -> bool {
        let target = &annotation.target;
        match annotation.location {
            Some(SerializationLocation::OutOfLine) => false,
            Some(SerializationLocation::Inline) => {
                self.resolves_target(target) && !self.spans_overloads(target)
            }
            None => {
                annotation.value.is_inline_eligible()
                    && self.resolves_target(target)
                    && !self.spans_overloads(target)
            }
        }
    }

    /// Whether an operation-based target applies to more than one overload
    fn spans_overloads(&self, target: &AnnotationTarget) -> bool {
        let matching = match target {
            AnnotationTarget::Operation(op) => self.matching_overloads(op).len(),
            AnnotationTarget::Parameter {
                operation,
                parameter,
            } => self
                .matching_overloads(operation)
                .iter()
                .filter(|o| o.parameters.iter().any(|p| p.name == *parameter))
                .count(),
            AnnotationTarget::ReturnType(op) => self
                .matching_overloads(op)
                .iter()
                .filter(|o| o.return_type.is_some())
                .count(),
            _ => return false,
        };
        matching > 1
    }

    /// Facet group of the element type, looking through type definitions
    pub fn facet_kind(&self, type_ref: &TypeReference) -> Option<FacetKind> {
        match &type_ref.element_type().definition {
            EdmType::Primitive(kind) => kind.facet_kind(),
            EdmType::Named(name) => match self.find_type(name) {
                Some(SchemaElement::TypeDefinition(td)) => td.underlying_type.facet_kind(),
                _ => None,
            },
            EdmType::EntityReference(_)
            | EdmType::Collection(_)
            | EdmType::Untyped
            | EdmType::None => None,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
