//! Format-specific rendering of model elements.
//!
//! The visitor walks the model and reports every element as a [`Node`] through
//! [`SchemaWriter::begin`] / [`SchemaWriter::end`]; the leaf calls fill in
//! attributes and members of the element opened last. Whether a node maps to an
//! XML element, a JSON object member or nothing at all is the writer's business.

mod json;
mod xml;

pub use json::JsonSchemaWriter;
pub use xml::XmlSchemaWriter;

use crate::csdl::schema::EdmSchema;
use crate::error::{CsdlError, Result};
use crate::model::*;

///////////////////////////////////////////////////////////////////////////////

/// Element kinds the visitor opens and closes
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// `edmx:Edmx` / the root object
    Document,
    /// `$Reference` member; XML has no wrapper
    References,
    Reference(&'a EdmReference),
    /// `edmx:DataServices`; JSON has no wrapper
    DataServices,
    Schema(&'a EdmSchema<'a>),

    EntityType(&'a EntityType),
    ComplexType(&'a ComplexType),
    StructuralProperty(&'a StructuralProperty),
    /// Header carries type, nullability, partner and containment
    NavigationProperty(&'a NavigationProperty),
    EnumType(&'a EnumType),
    EnumMember(&'a EnumMember),
    TypeDefinition(&'a TypeDefinition),
    Term(&'a Term),

    /// All overloads sharing one name; a JSON array
    Operations(&'a str),
    Operation(&'a Operation),
    /// `$Parameter` array; XML has no wrapper
    Parameters,
    Parameter(&'a OperationParameter),
    ReturnType(&'a OperationReturn),

    EntityContainer(&'a EntityContainer),
    EntitySet(&'a EntitySet),
    Singleton(&'a Singleton),
    OperationImport {
        import: &'a OperationImport,
        is_action: bool,
        /// Rendered path of the import's entity set expression
        entity_set: Option<&'a str>,
    },

    /// `$Annotations` member; XML has no wrapper
    OutOfLineAnnotations,
    AnnotationTarget(&'a str),
    Annotation(&'a VocabularyAnnotation),

    Record(&'a RecordExpression),
    PropertyValue(&'a PropertyValue),
    Collection,
    If,
    Cast,
    IsOf,
    Apply(&'a ApplyExpression),
    LabeledElement(&'a LabeledElement),
    UrlRef,

    /// Spelled-out collection type of a non-inline type reference
    CollectionType,
    TypeRef,
}

/// Type name omitted when the element type equals it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultType {
    String,
    None,
}

pub trait SchemaWriter {
    fn begin(&mut self, node: Node<'_>) -> Result<()>;

    fn end(&mut self, node: Node<'_>) -> Result<()>;

    /// Whether `Cast`/`IsOf` take their type before the operand
    fn type_test_type_first(&self) -> bool;

    fn reference_includes(&mut self, includes: &[EdmInclude]) -> Result<()>;

    fn reference_include_annotations(
        &mut self,
        include_annotations: &[EdmIncludeAnnotations],
    ) -> Result<()>;

    /// Inline type reference of the open element
    fn type_reference(&mut self, type_ref: &TypeReference, default: DefaultType) -> Result<()>;

    fn nullable(&mut self, nullable: bool) -> Result<()>;

    fn facets(&mut self, facets: &Facets, kind: Option<FacetKind>) -> Result<()>;

    fn default_value(&mut self, value: &str) -> Result<()>;

    /// `BaseTerm` and `AppliesTo` of the open term
    fn term_applicability(&mut self, term: &Term) -> Result<()>;

    fn key(&mut self, key: &[PropertyRef]) -> Result<()>;

    fn on_delete(&mut self, action: OnDeleteAction) -> Result<()>;

    fn referential_constraints(&mut self, constraints: &[ReferentialConstraint]) -> Result<()>;

    fn navigation_property_bindings(
        &mut self,
        bindings: &[NavigationPropertyBinding],
    ) -> Result<()>;

    /// Foreign-namespace attributes of the open element
    fn direct_annotations(&mut self, annotations: &[&DirectValueAnnotation]) -> Result<()>;

    /// Constant, path, null, enum member or labeled element reference expression
    fn expression(&mut self, expression: &Expression) -> Result<()>;

    /// Inline-eligible value of the open annotation, property value,
    /// labeled element or URL reference
    fn inline_expression(&mut self, expression: &Expression) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

///////////////////////////////////////////////////////////////////////////////

/// Name of a non-collection type as written, alias-qualified where declared
pub(crate) fn element_type_name(model: &EdmModel, type_ref: &TypeReference) -> Result<String> {
    match &type_ref.definition {
        EdmType::Primitive(kind) => Ok(kind.full_name().to_string()),
        EdmType::Named(name) => Ok(model.serialization_name(name)),
        EdmType::EntityReference(name) => Ok(format!("Ref({})", model.serialization_name(name))),
        EdmType::Untyped => Ok("Edm.Untyped".to_string()),
        EdmType::Collection(_) => Err(CsdlError::internal(
            "collection type reached a scalar type name",
        )),
        EdmType::None => Err(CsdlError::internal(
            "type reference of kind None cannot be serialized",
        )),
    }
}

/// Inline type name, e.g. `Collection(NS.Order)`
pub(crate) fn type_name(model: &EdmModel, type_ref: &TypeReference) -> Result<String> {
    match &type_ref.definition {
        EdmType::Collection(inner) => Ok(format!("Collection({})", element_type_name(model, inner)?)),
        _ => element_type_name(model, type_ref),
    }
}

/// `@Term#Qualifier`
pub(crate) fn annotation_name(model: &EdmModel, annotation: &VocabularyAnnotation) -> String {
    let term = model.serialization_name(&annotation.term);
    match &annotation.qualifier {
        Some(qualifier) => format!("@{term}#{qualifier}"),
        None => format!("@{term}"),
    }
}

/// Space-separated `NS.Enum/Member` list
pub(crate) fn enum_member_value(model: &EdmModel, expression: &EnumMemberExpression) -> String {
    let type_name = model.serialization_name(&expression.enum_type);
    expression
        .members
        .iter()
        .map(|m| format!("{type_name}/{m}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn operation_kind_name(operation: &Operation) -> &'static str {
    match operation.kind {
        OperationKind::Action => "Action",
        OperationKind::Function { .. } => "Function",
    }
}

pub(crate) fn is_default_srid(srid: Srid, kind: Option<FacetKind>) -> bool {
    match (srid, kind) {
        (Srid::Value(value), Some(FacetKind::Spatial(family))) => value == family.default_srid(),
        _ => false,
    }
}

///////////////////////////////////////////////////////////////////////////////
