//! Checks a model must pass before it is serialized.
//!
//! [`validate`] reports everything it finds; [`serialization_errors`] keeps
//! the codes that would make the written document wrong or unwritable.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::*;

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmErrorCode {
    InvalidName,
    AlreadyDefined,
    BadUnresolvedType,
    KeyPropertyMustNotBeNullable,
    CycleInTypeHierarchy,
    NavigationPartnerInvalid,
    ReferencedTypeMustHaveValidName,
    InvalidAnnotationTarget,
    OperationImportEntitySetExpressionIsInvalid,
    EnumMustHaveIntegerUnderlyingType,
    EnumMemberValueOutOfRange,
    TypeMustNotHaveKindOfNone,
}

impl EdmErrorCode {
    /// Errors that leave the model's structure inconsistent
    pub fn is_interface_critical(self) -> bool {
        matches!(
            self,
            Self::CycleInTypeHierarchy | Self::NavigationPartnerInvalid
        )
    }

    pub fn is_significant_for_serialization(self) -> bool {
        self.is_interface_critical()
            || matches!(
                self,
                Self::ReferencedTypeMustHaveValidName
                    | Self::InvalidAnnotationTarget
                    | Self::OperationImportEntitySetExpressionIsInvalid
                    | Self::EnumMustHaveIntegerUnderlyingType
                    | Self::EnumMemberValueOutOfRange
                    | Self::TypeMustNotHaveKindOfNone
            )
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{code:?} at {location}: {message}")]
pub struct EdmError {
    pub code: EdmErrorCode,
    /// Path of the offending element, e.g. `NS.Product/Name`
    pub location: String,
    pub message: String,
}

impl EdmError {
    pub fn new(code: EdmErrorCode, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            location: location.into(),
            message: message.into(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

static SIMPLE_IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{Nl}_][\p{L}\p{Nl}\p{Nd}\p{Mn}\p{Mc}\p{Pc}\p{Cf}]{0,127}$")
        .expect("static regex must compile")
});

pub fn is_simple_identifier(s: &str) -> bool {
    SIMPLE_IDENTIFIER_RE.is_match(s)
}

/// Dot-separated simple identifiers; the empty namespace is allowed
pub fn is_valid_namespace(s: &str) -> bool {
    s.is_empty() || s.split('.').all(is_simple_identifier)
}

pub fn is_valid_qualified_name(name: &QualifiedName) -> bool {
    is_simple_identifier(&name.name) && is_valid_namespace(&name.namespace)
}

///////////////////////////////////////////////////////////////////////////////

/// Every error found in `model`
pub fn validate(model: &EdmModel) -> Vec<EdmError> {
    let mut validator = Validator {
        model,
        errors: Vec::new(),
    };
    validator.validate_model();
    validator.errors
}

/// Errors that must block serialization
pub fn serialization_errors(model: &EdmModel) -> Vec<EdmError> {
    validate(model)
        .into_iter()
        .filter(|e| e.code.is_significant_for_serialization())
        .collect()
}

struct Validator<'m> {
    model: &'m EdmModel,
    errors: Vec<EdmError>,
}

impl<'m> Validator<'m> {
    fn report(&mut self, code: EdmErrorCode, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(EdmError::new(code, location, message));
    }

    fn validate_model(&mut self) {
        let model = self.model;
        for namespace in model.declared_namespaces() {
            if !is_valid_namespace(namespace) {
                self.report(
                    EdmErrorCode::InvalidName,
                    namespace,
                    format!("namespace {namespace:?} is not a dotted identifier"),
                );
            }
        }

        let mut declared = HashSet::new();
        for element in model.schema_elements() {
            let name = element.qualified_name();
            if element.as_operation().is_none() && !declared.insert(name.clone()) {
                self.report(
                    EdmErrorCode::AlreadyDefined,
                    name.to_string(),
                    format!("{name} is declared more than once"),
                );
            }
            self.validate_element(element);
        }

        for container in model.entity_containers() {
            self.validate_container(container);
        }

        for annotation in model.vocabulary_annotations() {
            self.validate_annotation(annotation);
        }
    }

    fn validate_name(&mut self, location: &str, name: &str) {
        if !is_simple_identifier(name) {
            self.report(
                EdmErrorCode::InvalidName,
                location,
                format!("{name:?} is not a valid simple identifier"),
            );
        }
    }

    /// Referenced names must be well formed and, unless external, declared
    fn validate_reference(&mut self, location: &str, name: &QualifiedName, resolves: bool) {
        if !is_valid_qualified_name(name) {
            self.report(
                EdmErrorCode::ReferencedTypeMustHaveValidName,
                location,
                format!("referenced name {name} is not a valid qualified name"),
            );
        } else if !resolves && !self.is_external(&name.namespace) {
            self.report(
                EdmErrorCode::BadUnresolvedType,
                location,
                format!("{name} cannot be resolved"),
            );
        }
    }

    fn is_external(&self, namespace: &str) -> bool {
        self.model.included_namespaces().any(|ns| ns == namespace)
    }

    fn validate_type_ref(&mut self, location: &str, type_ref: &TypeReference) {
        match &type_ref.definition {
            EdmType::None => self.report(
                EdmErrorCode::TypeMustNotHaveKindOfNone,
                location,
                "type reference has kind None",
            ),
            EdmType::Collection(inner) => self.validate_type_ref(location, inner),
            EdmType::Named(name) | EdmType::EntityReference(name) => {
                let resolves = self.model.find_type(name).is_some();
                self.validate_reference(location, name, resolves);
            }
            EdmType::Primitive(_) | EdmType::Untyped => {}
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn validate_element(&mut self, element: &SchemaElement) {
        let location = element.qualified_name().to_string();
        self.validate_name(&location, element.name());

        match element {
            SchemaElement::EntityType(entity_type) => {
                self.validate_base_type(&location, element);
                self.validate_properties(&location, &entity_type.properties);
                self.validate_key(&location, entity_type);
            }
            SchemaElement::ComplexType(complex_type) => {
                self.validate_base_type(&location, element);
                self.validate_properties(&location, &complex_type.properties);
            }
            SchemaElement::EnumType(enum_type) => self.validate_enum(&location, enum_type),
            SchemaElement::TypeDefinition(_) => {}
            SchemaElement::Term(term) => {
                self.validate_type_ref(&location, &term.type_ref);
                if let Some(base_term) = &term.base_term {
                    let resolves = self.model.find_term(base_term).is_some();
                    self.validate_reference(&location, base_term, resolves);
                }
            }
            SchemaElement::Operation(operation) => {
                for parameter in &operation.parameters {
                    let location = format!("{location}/{}", parameter.name);
                    self.validate_name(&location, &parameter.name);
                    self.validate_type_ref(&location, &parameter.type_ref);
                }
                if let Some(return_type) = &operation.return_type {
                    self.validate_type_ref(&format!("{location}/$ReturnType"), &return_type.type_ref);
                }
            }
        }
    }

    fn validate_base_type(&mut self, location: &str, element: &SchemaElement) {
        let Some(base_type) = element.base_type() else {
            return;
        };
        let resolves = self.model.find_type(base_type).is_some();
        self.validate_reference(location, base_type, resolves);

        let start = element.qualified_name();
        let mut seen = HashSet::from([start.clone()]);
        let mut current = Some(base_type.clone());
        while let Some(name) = current {
            if name == start {
                self.report(
                    EdmErrorCode::CycleInTypeHierarchy,
                    location,
                    format!("{start} derives from itself"),
                );
                return;
            }
            if !seen.insert(name.clone()) {
                // cycle further up, reported on its own members
                return;
            }
            current = self
                .model
                .find_type(&name)
                .and_then(SchemaElement::base_type)
                .cloned();
        }
    }

    fn validate_properties(&mut self, owner: &str, properties: &[Property]) {
        let mut names = HashSet::new();
        for property in properties {
            let location = format!("{owner}/{}", property.name());
            self.validate_name(&location, property.name());
            if !names.insert(property.name()) {
                self.report(
                    EdmErrorCode::AlreadyDefined,
                    &location,
                    format!("property {} is declared more than once", property.name()),
                );
            }
            self.validate_type_ref(&location, property.type_ref());
            if let Property::Navigation(navigation) = property {
                self.validate_partner(owner, &location, navigation);
            }
        }
    }

    fn validate_partner(&mut self, owner: &str, location: &str, property: &NavigationProperty) {
        let Some(partner) = &property.partner else {
            return;
        };
        let model = self.model;
        let Some(target) = property
            .target_type()
            .and_then(|name| model.find_type(name))
        else {
            return;
        };

        let owner_name = QualifiedName::from(owner);
        let valid = match model.find_property(&target.qualified_name(), partner) {
            Some(Property::Navigation(back)) => {
                // the back reference may point at a base or derived type of the owner
                let points_back = back.target_type().is_some_and(|back_target| {
                    model.is_same_or_derived(&owner_name, back_target)
                        || model.is_same_or_derived(back_target, &owner_name)
                });
                back.partner.as_ref().map_or(true, |p| *p == property.name) && points_back
            }
            _ => false,
        };
        if !valid {
            self.report(
                EdmErrorCode::NavigationPartnerInvalid,
                location,
                format!(
                    "partner {partner} is not a navigation property of {} pointing back to {owner}",
                    target.qualified_name()
                ),
            );
        }
    }

    fn validate_key(&mut self, location: &str, entity_type: &EntityType) {
        for key in &entity_type.key {
            let root = key.name.split('/').next().unwrap_or_default();
            if let Some(Property::Structural(property)) = entity_type.find_property(root) {
                if !key.name.contains('/') && property.type_ref.nullable {
                    self.report(
                        EdmErrorCode::KeyPropertyMustNotBeNullable,
                        format!("{location}/{}", key.name),
                        format!("key property {} is nullable", key.name),
                    );
                }
            }
        }
    }

    fn validate_enum(&mut self, location: &str, enum_type: &EnumType) {
        let Some((min, max)) = enum_type.underlying_type.integer_range() else {
            self.report(
                EdmErrorCode::EnumMustHaveIntegerUnderlyingType,
                location,
                format!(
                    "underlying type {} is not an integer type",
                    enum_type.underlying_type.full_name()
                ),
            );
            return;
        };
        for member in &enum_type.members {
            let member_location = format!("{location}/{}", member.name);
            self.validate_name(&member_location, &member.name);
            if member.value < min || member.value > max {
                self.report(
                    EdmErrorCode::EnumMemberValueOutOfRange,
                    member_location,
                    format!(
                        "value {} does not fit {}",
                        member.value,
                        enum_type.underlying_type.full_name()
                    ),
                );
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn validate_container(&mut self, container: &EntityContainer) {
        let container_name = container.qualified_name();
        let location = container_name.to_string();
        self.validate_name(&location, &container.name);
        if let Some(extends) = &container.extends {
            let resolves = self.model.find_entity_container(extends).is_some();
            self.validate_reference(&location, extends, resolves);
        }

        let mut names = HashSet::new();
        for element in &container.elements {
            let location = format!("{location}/{}", element.name());
            self.validate_name(&location, element.name());
            if !names.insert(element.name()) {
                self.report(
                    EdmErrorCode::AlreadyDefined,
                    &location,
                    format!("{} is declared more than once", element.name()),
                );
            }

            match element {
                ContainerElement::EntitySet(EntitySet { entity_type, .. })
                | ContainerElement::Singleton(Singleton { entity_type, .. }) => {
                    let resolves = self.model.find_entity_type(entity_type).is_some();
                    self.validate_reference(&location, entity_type, resolves);
                }
                ContainerElement::ActionImport(import) | ContainerElement::FunctionImport(import) => {
                    let resolves = !self.model.find_operations(&import.operation).is_empty();
                    self.validate_reference(&location, &import.operation, resolves);
                    if let Some(entity_set) = &import.entity_set {
                        if entity_set.as_path().is_none() {
                            self.report(
                                EdmErrorCode::OperationImportEntitySetExpressionIsInvalid,
                                &location,
                                "entity set must be a path expression",
                            );
                        }
                    }
                }
            }
        }
    }

    fn validate_annotation(&mut self, annotation: &VocabularyAnnotation) {
        let target = &annotation.target;
        let location = format!("{}@{}", target.path(), annotation.term);

        if !is_valid_qualified_name(&annotation.term) {
            self.report(
                EdmErrorCode::ReferencedTypeMustHaveValidName,
                &location,
                format!("term {} is not a valid qualified name", annotation.term),
            );
        }

        let member = match target {
            AnnotationTarget::Element(_)
            | AnnotationTarget::Operation(_)
            | AnnotationTarget::ReturnType(_) => None,
            AnnotationTarget::Property { property, .. } => Some(property),
            AnnotationTarget::EnumMember { member, .. } => Some(member),
            AnnotationTarget::Parameter { parameter, .. } => Some(parameter),
            AnnotationTarget::ContainerElement { element, .. } => Some(element),
        };
        let well_formed = is_valid_qualified_name(target.root())
            && member.map_or(true, |m| is_simple_identifier(m));
        let is_local = self
            .model
            .declared_namespaces()
            .contains(&target.root().namespace.as_str());

        if !well_formed {
            self.report(
                EdmErrorCode::InvalidAnnotationTarget,
                &location,
                format!("target {} is not a valid path", target.path()),
            );
        } else if is_local && !self.model.resolves_target(target) {
            self.report(
                EdmErrorCode::InvalidAnnotationTarget,
                &location,
                format!("target {} cannot be resolved", target.path()),
            );
        }

        self.validate_expression(&location, &annotation.value);
    }

    fn validate_expression(&mut self, location: &str, expression: &Expression) {
        match expression {
            Expression::Cast(test) | Expression::IsOf(test) => {
                self.validate_type_ref(location, &test.type_ref);
                self.validate_expression(location, &test.operand);
            }
            Expression::Record(record) => {
                for property in &record.properties {
                    self.validate_expression(location, &property.value);
                }
            }
            Expression::Collection(items) => {
                for item in items {
                    self.validate_expression(location, item);
                }
            }
            Expression::If(test) => {
                self.validate_expression(location, &test.test);
                self.validate_expression(location, &test.then);
                self.validate_expression(location, &test.otherwise);
            }
            Expression::Apply(apply) => {
                for argument in &apply.arguments {
                    self.validate_expression(location, argument);
                }
            }
            Expression::LabeledElement(element) => self.validate_expression(location, &element.value),
            Expression::UrlRef(value) => self.validate_expression(location, value),
            _ => {}
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_simple_identifier("Product"));
        assert!(is_simple_identifier("_private1"));
        assert!(is_simple_identifier("Größe"));
        assert!(!is_simple_identifier("1st"));
        assert!(!is_simple_identifier("has space"));
        assert!(!is_simple_identifier(""));
        assert!(is_valid_namespace("Org.OData.Core.V1"));
        assert!(!is_valid_namespace("Org..Core"));
    }

    #[test]
    fn test_enum_rules() {
        let mut model = EdmModel::new();
        model
            .add_element(
                EnumType::new("NS", "Small")
                    .with_underlying_type(PrimitiveKind::Byte)
                    .with_member("Big", 300),
            )
            .add_element(EnumType::new("NS", "Text").with_underlying_type(PrimitiveKind::String));

        let codes: Vec<_> = serialization_errors(&model).iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            [
                EdmErrorCode::EnumMemberValueOutOfRange,
                EdmErrorCode::EnumMustHaveIntegerUnderlyingType
            ]
        );
    }

    #[test]
    fn test_cycle_in_type_hierarchy() {
        let mut model = EdmModel::new();
        model
            .add_element(EntityType::new("NS", "A").with_base_type("NS.B"))
            .add_element(EntityType::new("NS", "B").with_base_type("NS.A"));

        let errors = serialization_errors(&model);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.code == EdmErrorCode::CycleInTypeHierarchy));
    }

    #[test]
    fn test_non_significant_errors_are_filtered() {
        let mut model = EdmModel::new();
        model.add_element(
            EntityType::new("NS", "Product")
                .with_key(["Id"])
                .with_property(StructuralProperty::primitive("Id", PrimitiveKind::Int32, true))
                .with_property(StructuralProperty::new(
                    "Category",
                    TypeReference::named("NS.Missing", true),
                )),
        );

        let codes: Vec<_> = validate(&model).iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            [
                EdmErrorCode::BadUnresolvedType,
                EdmErrorCode::KeyPropertyMustNotBeNullable
            ]
        );
        assert!(serialization_errors(&model).is_empty());
    }

    #[test]
    fn test_navigation_partner() {
        let mut model = EdmModel::new();
        model
            .add_element(
                EntityType::new("NS", "Customer")
                    .with_property(NavigationProperty::many("Orders", "NS.Order").with_partner("Customer")),
            )
            .add_element(
                EntityType::new("NS", "Order")
                    .with_property(NavigationProperty::single("Buyer", "NS.Customer", true)),
            );

        let errors = serialization_errors(&model);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, EdmErrorCode::NavigationPartnerInvalid);
        assert_eq!(errors[0].location, "NS.Customer/Orders");
    }

    #[test]
    fn test_annotation_targets() {
        let mut model = EdmModel::new();
        model
            .add_element(EntityType::new("NS", "Product"))
            .add_annotation(VocabularyAnnotation::new(
                AnnotationTarget::property("NS.Product", "Missing"),
                "Core.Description",
                Expression::string("x"),
            ))
            .add_annotation(VocabularyAnnotation::new(
                AnnotationTarget::element("Other.Thing"),
                "Core.Description",
                Expression::string("external targets are fine"),
            ))
            .add_annotation(VocabularyAnnotation::new(
                AnnotationTarget::property("Other.Thing", "not valid"),
                "Core.Description",
                Expression::string("x"),
            ));

        let locations: Vec<_> = serialization_errors(&model)
            .into_iter()
            .map(|e| (e.code, e.location))
            .collect();
        assert_eq!(
            locations,
            [
                (
                    EdmErrorCode::InvalidAnnotationTarget,
                    "NS.Product/Missing@Core.Description".to_string()
                ),
                (
                    EdmErrorCode::InvalidAnnotationTarget,
                    "Other.Thing/not valid@Core.Description".to_string()
                ),
            ]
        );
    }
}
