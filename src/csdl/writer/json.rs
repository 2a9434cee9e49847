use std::io::Write;

use serde_json::ser::Formatter;

use super::{
    annotation_name, element_type_name, enum_member_value, is_default_srid, operation_kind_name,
    DefaultType, Node, SchemaWriter,
};
use crate::csdl::json_emitter::JsonEmitter;
use crate::csdl::settings::CsdlWriterSettings;
use crate::csdl::values;
use crate::error::{CsdlError, Result, UnsupportedFeature};
use crate::model::*;

///////////////////////////////////////////////////////////////////////////////

// {
//   "$Version": "4.0",
//   "$EntityContainer": "ODataDemo.DemoService",
//   "ODataDemo": {
//     "Product": {
//       "$Kind": "EntityType",
//       "$Key": ["ID"],
//       "ID": {"$Type": "Edm.Int32"}
//     }
//   }
// }
/// CSDL-JSON writer
pub struct JsonSchemaWriter<'m, W: Write, F: Formatter> {
    emitter: JsonEmitter<W, F>,
    model: &'m EdmModel,
    settings: CsdlWriterSettings,
    /// Name of the open enum member, prefixing its annotations
    enum_member: Option<String>,
}

impl<'m, W: Write, F: Formatter> JsonSchemaWriter<'m, W, F> {
    pub fn new(emitter: JsonEmitter<W, F>, model: &'m EdmModel, settings: CsdlWriterSettings) -> Self {
        Self {
            emitter,
            model,
            settings,
            enum_member: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.emitter.into_inner()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn member_str(&mut self, name: &str, value: &str) -> Result<()> {
        self.emitter.property_name(name)?;
        self.emitter.string(value)
    }

    fn member_true(&mut self, condition: bool, name: &str) -> Result<()> {
        if condition {
            self.emitter.property_name(name)?;
            self.emitter.bool(true)?;
        }
        Ok(())
    }

    fn member_u32(&mut self, name: &str, value: u32) -> Result<()> {
        self.emitter.property_name(name)?;
        self.emitter.u32(value)
    }

    fn open_member(&mut self, name: &str) -> Result<()> {
        self.emitter.property_name(name)?;
        self.emitter.start_object()
    }

    fn kind(&mut self, kind: &str) -> Result<()> {
        self.member_str("$Kind", kind)
    }

    fn name(&self, name: &QualifiedName) -> String {
        self.model.serialization_name(name)
    }

    fn structured_type_header(
        &mut self,
        kind: &str,
        name: &str,
        base_type: Option<&QualifiedName>,
        is_abstract: bool,
        is_open: bool,
    ) -> Result<()> {
        self.open_member(name)?;
        self.kind(kind)?;
        if let Some(base_type) = base_type {
            let base_type = self.name(base_type);
            self.member_str("$BaseType", &base_type)?;
        }
        self.member_true(is_abstract, "$Abstract")?;
        self.member_true(is_open, "$OpenType")
    }

    /// `{"$Path": "..."}` and its siblings
    fn wrapped(&mut self, member: &str, value: &str) -> Result<()> {
        self.emitter.start_object()?;
        self.member_str(member, value)?;
        self.emitter.end_object()
    }

    fn integer(&mut self, value: i64) -> Result<()> {
        if self.settings.ieee754_compatible {
            self.emitter.string(&value.to_string())
        } else {
            self.emitter.i64(value)
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

impl<'m, W: Write, F: Formatter> SchemaWriter for JsonSchemaWriter<'m, W, F> {
    fn begin(&mut self, node: Node<'_>) -> Result<()> {
        match node {
            Node::Document => {
                self.emitter.start_object()?;
                self.member_str("$Version", self.settings.version.as_str())?;
                if let Some(container) = self.model.entity_container() {
                    let name = self.name(&container.qualified_name());
                    self.member_str("$EntityContainer", &name)?;
                }
                Ok(())
            }
            Node::References => self.open_member("$Reference"),
            Node::Reference(reference) => self.open_member(&reference.uri),
            Node::DataServices => Ok(()),
            Node::Schema(schema) => {
                self.open_member(&schema.namespace)?;
                if let Some(alias) = schema.alias {
                    self.member_str("$Alias", alias)?;
                }
                Ok(())
            }

            Node::EntityType(entity_type) => {
                self.structured_type_header(
                    "EntityType",
                    &entity_type.name,
                    entity_type.base_type.as_ref(),
                    entity_type.is_abstract,
                    entity_type.is_open,
                )?;
                self.member_true(entity_type.has_stream, "$HasStream")
            }
            Node::ComplexType(complex_type) => self.structured_type_header(
                "ComplexType",
                &complex_type.name,
                complex_type.base_type.as_ref(),
                complex_type.is_abstract,
                complex_type.is_open,
            ),
            Node::StructuralProperty(property) => self.open_member(&property.name),
            Node::NavigationProperty(property) => {
                self.open_member(&property.name)?;
                self.kind("NavigationProperty")?;
                self.type_reference(&property.type_ref, DefaultType::None)?;
                if !property.type_ref.is_collection() {
                    self.nullable(property.type_ref.nullable)?;
                }
                if let Some(partner) = &property.partner {
                    self.member_str("$Partner", partner)?;
                }
                self.member_true(property.contains_target, "$ContainsTarget")
            }
            Node::EnumType(enum_type) => {
                self.open_member(&enum_type.name)?;
                self.kind("EnumType")?;
                if enum_type.underlying_type != PrimitiveKind::Int32 {
                    self.member_str("$UnderlyingType", enum_type.underlying_type.full_name())?;
                }
                self.member_true(enum_type.is_flags, "$IsFlags")
            }
            Node::EnumMember(member) => {
                self.emitter.property_name(&member.name)?;
                self.emitter.i64(member.value)?;
                self.enum_member = Some(member.name.clone());
                Ok(())
            }
            Node::TypeDefinition(definition) => {
                self.open_member(&definition.name)?;
                self.kind("TypeDefinition")?;
                self.member_str("$UnderlyingType", definition.underlying_type.full_name())
            }
            Node::Term(term) => {
                self.open_member(&term.name)?;
                self.kind("Term")
            }

            Node::Operations(name) => {
                self.emitter.property_name(name)?;
                self.emitter.start_array()
            }
            Node::Operation(operation) => {
                self.emitter.start_object()?;
                self.kind(operation_kind_name(operation))?;
                self.member_true(operation.is_bound, "$IsBound")?;
                if let Some(path) = &operation.entity_set_path {
                    self.member_str("$EntitySetPath", path)?;
                }
                let is_composable = matches!(
                    operation.kind,
                    OperationKind::Function {
                        is_composable: true
                    }
                );
                self.member_true(is_composable, "$IsComposable")
            }
            Node::Parameters => {
                self.emitter.property_name("$Parameter")?;
                self.emitter.start_array()
            }
            Node::Parameter(parameter) => {
                self.emitter.start_object()?;
                self.member_str("$Name", &parameter.name)
            }
            Node::ReturnType(_) => self.open_member("$ReturnType"),

            Node::EntityContainer(container) => {
                self.open_member(&container.name)?;
                self.kind("EntityContainer")?;
                if let Some(extends) = &container.extends {
                    let extends = self.name(extends);
                    self.member_str("$Extends", &extends)?;
                }
                Ok(())
            }
            Node::EntitySet(entity_set) => {
                self.open_member(&entity_set.name)?;
                self.member_true(true, "$Collection")?;
                let entity_type = self.name(&entity_set.entity_type);
                self.member_str("$Type", &entity_type)?;
                if !entity_set.include_in_service_document {
                    self.emitter.property_name("$IncludeInServiceDocument")?;
                    self.emitter.bool(false)?;
                }
                Ok(())
            }
            Node::Singleton(singleton) => {
                self.open_member(&singleton.name)?;
                let entity_type = self.name(&singleton.entity_type);
                self.member_str("$Type", &entity_type)
            }
            Node::OperationImport {
                import,
                is_action,
                entity_set,
            } => {
                self.open_member(&import.name)?;
                let operation = self.name(&import.operation);
                self.member_str(if is_action { "$Action" } else { "$Function" }, &operation)?;
                if let Some(entity_set) = entity_set {
                    self.member_str("$EntitySet", entity_set)?;
                }
                self.member_true(
                    !is_action && import.include_in_service_document,
                    "$IncludeInServiceDocument",
                )
            }

            Node::OutOfLineAnnotations => self.open_member("$Annotations"),
            Node::AnnotationTarget(target) => self.open_member(target),
            Node::Annotation(annotation) => {
                let name = annotation_name(self.model, annotation);
                let name = match &self.enum_member {
                    Some(member) => format!("{member}{name}"),
                    None => name,
                };
                self.emitter.property_name(&name)
            }

            Node::Record(record) => {
                self.emitter.start_object()?;
                if let Some(type_name) = &record.type_name {
                    let type_name = self.name(type_name);
                    self.member_str("@type", &type_name)?;
                }
                Ok(())
            }
            Node::PropertyValue(value) => self.emitter.property_name(&value.property),
            Node::Collection => self.emitter.start_array(),
            Node::If => {
                self.emitter.start_object()?;
                self.emitter.property_name("$If")?;
                self.emitter.start_array()
            }
            Node::Cast => {
                self.emitter.start_object()?;
                self.emitter.property_name("$Cast")
            }
            Node::IsOf => {
                self.emitter.start_object()?;
                self.emitter.property_name("$IsOf")
            }
            Node::Apply(_) => {
                self.emitter.start_object()?;
                self.emitter.property_name("$Apply")?;
                self.emitter.start_array()
            }
            Node::LabeledElement(_) => {
                self.emitter.start_object()?;
                self.emitter.property_name("$LabeledElement")
            }
            Node::UrlRef => {
                self.emitter.start_object()?;
                self.emitter.property_name("$UrlRef")
            }

            Node::CollectionType | Node::TypeRef => Err(UnsupportedFeature::new(
                "nested collection types cannot be written as CSDL-JSON",
            )
            .into()),
        }
    }

    fn end(&mut self, node: Node<'_>) -> Result<()> {
        match node {
            Node::DataServices | Node::Annotation(_) | Node::PropertyValue(_) => Ok(()),
            Node::EnumMember(_) => {
                self.enum_member = None;
                Ok(())
            }
            Node::Operations(_) | Node::Parameters | Node::Collection => self.emitter.end_array(),
            Node::If => {
                self.emitter.end_array()?;
                self.emitter.end_object()
            }
            Node::Apply(apply) => {
                self.emitter.end_array()?;
                let function = self.name(&apply.function);
                self.member_str("$Function", &function)?;
                self.emitter.end_object()
            }
            Node::LabeledElement(element) => {
                self.member_str("$Name", &element.name)?;
                self.emitter.end_object()
            }
            Node::CollectionType | Node::TypeRef => Err(UnsupportedFeature::new(
                "nested collection types cannot be written as CSDL-JSON",
            )
            .into()),
            Node::Document
            | Node::References
            | Node::Reference(_)
            | Node::Schema(_)
            | Node::EntityType(_)
            | Node::ComplexType(_)
            | Node::StructuralProperty(_)
            | Node::NavigationProperty(_)
            | Node::EnumType(_)
            | Node::TypeDefinition(_)
            | Node::Term(_)
            | Node::Operation(_)
            | Node::Parameter(_)
            | Node::ReturnType(_)
            | Node::EntityContainer(_)
            | Node::EntitySet(_)
            | Node::Singleton(_)
            | Node::OperationImport { .. }
            | Node::OutOfLineAnnotations
            | Node::AnnotationTarget(_)
            | Node::Record(_)
            | Node::Cast
            | Node::IsOf
            | Node::UrlRef => self.emitter.end_object(),
        }
    }

    fn type_test_type_first(&self) -> bool {
        false
    }

    fn reference_includes(&mut self, includes: &[EdmInclude]) -> Result<()> {
        if includes.is_empty() {
            return Ok(());
        }
        self.emitter.property_name("$Include")?;
        self.emitter.start_array()?;
        for include in includes {
            self.emitter.start_object()?;
            self.member_str("$Namespace", &include.namespace)?;
            if let Some(alias) = &include.alias {
                self.member_str("$Alias", alias)?;
            }
            self.emitter.end_object()?;
        }
        self.emitter.end_array()
    }

    fn reference_include_annotations(
        &mut self,
        include_annotations: &[EdmIncludeAnnotations],
    ) -> Result<()> {
        if include_annotations.is_empty() {
            return Ok(());
        }
        self.emitter.property_name("$IncludeAnnotations")?;
        self.emitter.start_array()?;
        for include in include_annotations {
            self.emitter.start_object()?;
            self.member_str("$TermNamespace", &include.term_namespace)?;
            if let Some(qualifier) = &include.qualifier {
                self.member_str("$Qualifier", qualifier)?;
            }
            if let Some(target_namespace) = &include.target_namespace {
                self.member_str("$TargetNamespace", target_namespace)?;
            }
            self.emitter.end_object()?;
        }
        self.emitter.end_array()
    }

    fn type_reference(&mut self, type_ref: &TypeReference, default: DefaultType) -> Result<()> {
        let element = type_ref.element_type();
        if element.is_collection() {
            return Err(UnsupportedFeature::new(
                "nested collection types cannot be written as CSDL-JSON",
            )
            .into());
        }
        self.member_true(type_ref.is_collection(), "$Collection")?;
        let name = element_type_name(self.model, element)?;
        let is_default = default == DefaultType::String
            && element.definition == EdmType::Primitive(PrimitiveKind::String);
        if !is_default {
            self.member_str("$Type", &name)?;
        }
        Ok(())
    }

    fn nullable(&mut self, nullable: bool) -> Result<()> {
        self.member_true(nullable, "$Nullable")
    }

    fn facets(&mut self, facets: &Facets, kind: Option<FacetKind>) -> Result<()> {
        let Some(kind) = kind else {
            return Ok(());
        };
        match kind {
            FacetKind::Binary | FacetKind::String => {
                // symbolic `max` has no JSON form, absence means unbounded
                if let Some(MaxLength::Value(value)) = facets.max_length {
                    self.member_u32("$MaxLength", value)?;
                }
                if kind == FacetKind::String && facets.unicode == Some(false) {
                    self.emitter.property_name("$Unicode")?;
                    self.emitter.bool(false)?;
                }
            }
            FacetKind::Temporal => {
                if let Some(precision) = facets.precision.filter(|p| *p != 0) {
                    self.member_u32("$Precision", precision)?;
                }
            }
            FacetKind::Decimal => {
                if let Some(precision) = facets.precision {
                    self.member_u32("$Precision", precision)?;
                }
                match facets.scale {
                    Some(Scale::Value(0)) | None => {}
                    Some(Scale::Value(value)) => self.member_u32("$Scale", value)?,
                    Some(Scale::Variable) => self.member_str("$Scale", "variable")?,
                    Some(Scale::Floating) => self.member_str("$Scale", "floating")?,
                }
            }
            FacetKind::Spatial(_) => match facets.srid {
                Some(srid) if is_default_srid(srid, Some(kind)) => {}
                Some(Srid::Value(value)) => {
                    self.emitter.property_name("$SRID")?;
                    self.emitter.i64(i64::from(value))?;
                }
                Some(Srid::Variable) => self.member_str("$SRID", "variable")?,
                None => {}
            },
        }
        Ok(())
    }

    fn default_value(&mut self, value: &str) -> Result<()> {
        self.member_str("$DefaultValue", value)
    }

    fn term_applicability(&mut self, term: &Term) -> Result<()> {
        if let Some(base_term) = &term.base_term {
            let base_term = self.name(base_term);
            self.member_str("$BaseTerm", &base_term)?;
        }
        if !term.applies_to.is_empty() {
            self.emitter.property_name("$AppliesTo")?;
            self.emitter.start_array()?;
            for applies_to in &term.applies_to {
                self.emitter.string(applies_to)?;
            }
            self.emitter.end_array()?;
        }
        Ok(())
    }

    fn key(&mut self, key: &[PropertyRef]) -> Result<()> {
        self.emitter.property_name("$Key")?;
        self.emitter.start_array()?;
        for property_ref in key {
            match &property_ref.alias {
                Some(alias) => {
                    self.emitter.start_object()?;
                    self.member_str(alias, &property_ref.name)?;
                    self.emitter.end_object()?;
                }
                None => self.emitter.string(&property_ref.name)?,
            }
        }
        self.emitter.end_array()
    }

    fn on_delete(&mut self, action: OnDeleteAction) -> Result<()> {
        self.member_str("$OnDelete", action.as_str())
    }

    fn referential_constraints(&mut self, constraints: &[ReferentialConstraint]) -> Result<()> {
        if constraints.is_empty() {
            return Ok(());
        }
        self.open_member("$ReferentialConstraint")?;
        for constraint in constraints {
            self.member_str(&constraint.property, &constraint.referenced_property)?;
        }
        self.emitter.end_object()
    }

    fn navigation_property_bindings(
        &mut self,
        bindings: &[NavigationPropertyBinding],
    ) -> Result<()> {
        if bindings.is_empty() {
            return Ok(());
        }
        self.open_member("$NavigationPropertyBinding")?;
        for binding in bindings {
            self.member_str(&binding.path, &binding.target.render())?;
        }
        self.emitter.end_object()
    }

    fn direct_annotations(&mut self, _annotations: &[&DirectValueAnnotation]) -> Result<()> {
        // CSDL-JSON has no representation for foreign attributes
        Ok(())
    }

    fn expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Binary(v) => self.emitter.string(&values::format_binary_base64url(v)),
            Expression::Boolean(v) => self.emitter.bool(*v),
            Expression::Date(v) => self.emitter.string(&values::format_date(v)),
            Expression::DateTimeOffset(v) => {
                self.emitter.string(&values::format_date_time_offset(v))
            }
            Expression::Decimal(v) => {
                if self.settings.ieee754_compatible {
                    self.emitter.string(v.as_str())
                } else {
                    self.emitter.raw_number(v.as_str())
                }
            }
            Expression::Duration(v) => self.emitter.string(&values::format_duration(v)),
            Expression::Floating(v) => match values::special_float(*v) {
                Some(special) => self.emitter.string(special),
                None => self.emitter.f64(*v),
            },
            Expression::Guid(v) => self.emitter.string(&values::format_guid(v)),
            Expression::Integer(v) => self.integer(*v),
            Expression::String(v) => self.emitter.string(v),
            Expression::TimeOfDay(v) => self.emitter.string(&values::format_time_of_day(v)),
            Expression::Null => self.emitter.null(),
            Expression::Path(v) => self.wrapped("$Path", v),
            Expression::PropertyPath(v) => self.wrapped("$PropertyPath", v),
            Expression::NavigationPropertyPath(v) => self.wrapped("$NavigationPropertyPath", v),
            Expression::AnnotationPath(v) => self.wrapped("$AnnotationPath", v),
            Expression::LabeledElementReference(name) => {
                let name = self.name(name);
                self.wrapped("$LabeledElementReference", &name)
            }
            Expression::EnumMember(members) => {
                let value = enum_member_value(self.model, members);
                self.wrapped("$EnumMember", &value)
            }
            Expression::Record(_)
            | Expression::Collection(_)
            | Expression::If(_)
            | Expression::Cast(_)
            | Expression::IsOf(_)
            | Expression::Apply(_)
            | Expression::LabeledElement(_)
            | Expression::UrlRef(_) => Err(CsdlError::internal(format!(
                "structured expression {expression:?} reached the leaf writer"
            ))),
        }
    }

    fn inline_expression(&mut self, expression: &Expression) -> Result<()> {
        if !expression.is_inline_eligible() {
            return Err(CsdlError::internal(format!(
                "expression {expression:?} cannot be written inline"
            )));
        }
        self.expression(expression)
    }

    fn flush(&mut self) -> Result<()> {
        self.emitter.flush()
    }
}
