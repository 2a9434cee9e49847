use std::io::Write;

use quick_xml::events::*;

use super::{
    enum_member_value, is_default_srid, operation_kind_name, type_name, DefaultType, Node,
    SchemaWriter,
};
use crate::csdl::settings::CsdlWriterSettings;
use crate::csdl::values;
use crate::error::{CsdlError, Result};
use crate::model::*;

///////////////////////////////////////////////////////////////////////////////

const EDMX_NAMESPACE: &str = "http://docs.oasis-open.org/odata/ns/edmx";
const EDM_XML_NAMESPACE: &str = "http://docs.oasis-open.org/odata/ns/edm";

// <edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
//   <edmx:DataServices>
//     <Schema Namespace="ODataDemo" xmlns="http://docs.oasis-open.org/odata/ns/edm">
//       <EntityType Name="Product">
//         <Key>
//           <PropertyRef Name="ID"/>
//         </Key>
//         <Property Name="ID" Type="Edm.Int32" Nullable="false"/>
//       </EntityType>
//     </Schema>
//   </edmx:DataServices>
// </edmx:Edmx>
/// CSDL-XML writer.
///
/// Start tags are held back until the first child or text is written so that
/// leaf calls can keep adding attributes; an element closed without content is
/// written as an empty element.
pub struct XmlSchemaWriter<'m, W: Write> {
    writer: quick_xml::Writer<W>,
    model: &'m EdmModel,
    settings: CsdlWriterSettings,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
    /// Direct annotation namespace URIs of the current schema, prefixed `p{index}`
    prefixes: Vec<String>,
}

impl<'m, W: Write> XmlSchemaWriter<'m, W> {
    pub fn new(sink: W, model: &'m EdmModel, settings: CsdlWriterSettings) -> Self {
        let writer = if settings.indent {
            quick_xml::Writer::new_with_indent(sink, b' ', 2)
        } else {
            quick_xml::Writer::new(sink)
        };
        Self {
            writer,
            model,
            settings,
            pending: None,
            open: Vec::new(),
            prefixes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| CsdlError::internal("closing an element that was never opened"))?;
        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    fn attr(&mut self, key: &str, value: &str) -> Result<()> {
        let start = self.pending.as_mut().ok_or_else(|| {
            CsdlError::internal(format!(
                "attribute {key} written after the content of <{}>",
                self.open.last().map(String::as_str).unwrap_or_default()
            ))
        })?;
        start.push_attribute((key, value));
        Ok(())
    }

    fn attr_if(&mut self, condition: bool, key: &str, value: &str) -> Result<()> {
        if condition {
            self.attr(key, value)?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name)?;
        self.text(text)?;
        self.finish()
    }

    fn name(&self, name: &QualifiedName) -> String {
        self.model.serialization_name(name)
    }

    /// Attribute / element name and text of an inline-eligible expression
    fn constant(&self, expression: &Expression) -> Result<(&'static str, String)> {
        let constant = match expression {
            Expression::Binary(v) => ("Binary", values::format_binary_base64(v)),
            Expression::Boolean(v) => ("Bool", values::format_bool(*v).to_string()),
            Expression::Date(v) => ("Date", values::format_date(v)),
            Expression::DateTimeOffset(v) => ("DateTimeOffset", values::format_date_time_offset(v)),
            Expression::Decimal(v) => ("Decimal", v.as_str().to_string()),
            Expression::Duration(v) => ("Duration", values::format_duration(v)),
            Expression::Floating(v) => ("Float", values::format_float(*v)),
            Expression::Guid(v) => ("Guid", values::format_guid(v)),
            Expression::Integer(v) => ("Int", v.to_string()),
            Expression::String(v) => ("String", v.clone()),
            Expression::TimeOfDay(v) => ("TimeOfDay", values::format_time_of_day(v)),
            Expression::Path(v) => ("Path", v.clone()),
            Expression::PropertyPath(v) => ("PropertyPath", v.clone()),
            Expression::NavigationPropertyPath(v) => ("NavigationPropertyPath", v.clone()),
            Expression::AnnotationPath(v) => ("AnnotationPath", v.clone()),
            Expression::Null
            | Expression::Record(_)
            | Expression::Collection(_)
            | Expression::If(_)
            | Expression::Cast(_)
            | Expression::IsOf(_)
            | Expression::Apply(_)
            | Expression::LabeledElement(_)
            | Expression::LabeledElementReference(_)
            | Expression::EnumMember(_)
            | Expression::UrlRef(_) => {
                return Err(CsdlError::internal(format!(
                    "expression {expression:?} has no attribute form"
                )))
            }
        };
        Ok(constant)
    }

    fn structured_type_header(
        &mut self,
        element: &str,
        name: &str,
        base_type: Option<&QualifiedName>,
        is_abstract: bool,
        is_open: bool,
    ) -> Result<()> {
        self.start(element)?;
        self.attr("Name", name)?;
        if let Some(base_type) = base_type {
            let base_type = self.name(base_type);
            self.attr("BaseType", &base_type)?;
        }
        self.attr_if(is_abstract, "Abstract", "true")?;
        self.attr_if(is_open, "OpenType", "true")
    }
}

///////////////////////////////////////////////////////////////////////////////

impl<'m, W: Write> SchemaWriter for XmlSchemaWriter<'m, W> {
    fn begin(&mut self, node: Node<'_>) -> Result<()> {
        match node {
            Node::Document => {
                if self.settings.xml_declaration {
                    self.writer.write_event(Event::Decl(BytesDecl::new(
                        "1.0",
                        Some("utf-8"),
                        None,
                    )))?;
                }
                self.start("edmx:Edmx")?;
                self.attr("Version", self.settings.version.as_str())?;
                self.attr("xmlns:edmx", EDMX_NAMESPACE)
            }
            Node::References
            | Node::Operations(_)
            | Node::Parameters
            | Node::OutOfLineAnnotations => Ok(()),
            Node::Reference(reference) => {
                self.start("edmx:Reference")?;
                self.attr("Uri", &reference.uri)
            }
            Node::DataServices => self.start("edmx:DataServices"),
            Node::Schema(schema) => {
                self.start("Schema")?;
                self.attr("Namespace", &schema.namespace)?;
                if let Some(alias) = schema.alias {
                    self.attr("Alias", alias)?;
                }
                self.attr("xmlns", EDM_XML_NAMESPACE)?;
                self.prefixes = schema.annotation_namespaces.clone();
                for (index, uri) in schema.annotation_namespaces.iter().enumerate() {
                    self.attr(&format!("xmlns:p{index}"), uri)?;
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
                self.attr_if(entity_type.has_stream, "HasStream", "true")
            }
            Node::ComplexType(complex_type) => self.structured_type_header(
                "ComplexType",
                &complex_type.name,
                complex_type.base_type.as_ref(),
                complex_type.is_abstract,
                complex_type.is_open,
            ),
            Node::StructuralProperty(property) => {
                self.start("Property")?;
                self.attr("Name", &property.name)
            }
            Node::NavigationProperty(property) => {
                self.start("NavigationProperty")?;
                self.attr("Name", &property.name)?;
                self.type_reference(&property.type_ref, DefaultType::None)?;
                if !property.type_ref.is_collection() {
                    self.nullable(property.type_ref.nullable)?;
                }
                if let Some(partner) = &property.partner {
                    self.attr("Partner", partner)?;
                }
                self.attr_if(property.contains_target, "ContainsTarget", "true")
            }
            Node::EnumType(enum_type) => {
                self.start("EnumType")?;
                self.attr("Name", &enum_type.name)?;
                self.attr_if(
                    enum_type.underlying_type != PrimitiveKind::Int32,
                    "UnderlyingType",
                    enum_type.underlying_type.full_name(),
                )?;
                self.attr_if(enum_type.is_flags, "IsFlags", "true")
            }
            Node::EnumMember(member) => {
                self.start("Member")?;
                self.attr("Name", &member.name)?;
                self.attr("Value", &member.value.to_string())
            }
            Node::TypeDefinition(definition) => {
                self.start("TypeDefinition")?;
                self.attr("Name", &definition.name)?;
                self.attr("UnderlyingType", definition.underlying_type.full_name())
            }
            Node::Term(term) => {
                self.start("Term")?;
                self.attr("Name", &term.name)
            }

            Node::Operation(operation) => {
                self.start(operation_kind_name(operation))?;
                self.attr("Name", &operation.name)?;
                self.attr_if(operation.is_bound, "IsBound", "true")?;
                if let Some(path) = &operation.entity_set_path {
                    self.attr("EntitySetPath", path)?;
                }
                let is_composable = matches!(
                    operation.kind,
                    OperationKind::Function {
                        is_composable: true
                    }
                );
                self.attr_if(is_composable, "IsComposable", "true")
            }
            Node::Parameter(parameter) => {
                self.start("Parameter")?;
                self.attr("Name", &parameter.name)
            }
            Node::ReturnType(_) => self.start("ReturnType"),

            Node::EntityContainer(container) => {
                self.start("EntityContainer")?;
                self.attr("Name", &container.name)?;
                if let Some(extends) = &container.extends {
                    let extends = self.name(extends);
                    self.attr("Extends", &extends)?;
                }
                Ok(())
            }
            Node::EntitySet(entity_set) => {
                self.start("EntitySet")?;
                self.attr("Name", &entity_set.name)?;
                let entity_type = self.name(&entity_set.entity_type);
                self.attr("EntityType", &entity_type)?;
                self.attr_if(
                    !entity_set.include_in_service_document,
                    "IncludeInServiceDocument",
                    "false",
                )
            }
            Node::Singleton(singleton) => {
                self.start("Singleton")?;
                self.attr("Name", &singleton.name)?;
                let entity_type = self.name(&singleton.entity_type);
                self.attr("Type", &entity_type)
            }
            Node::OperationImport {
                import,
                is_action,
                entity_set,
            } => {
                let operation = self.name(&import.operation);
                if is_action {
                    self.start("ActionImport")?;
                    self.attr("Name", &import.name)?;
                    self.attr("Action", &operation)?;
                } else {
                    self.start("FunctionImport")?;
                    self.attr("Name", &import.name)?;
                    self.attr("Function", &operation)?;
                }
                if let Some(entity_set) = entity_set {
                    self.attr("EntitySet", entity_set)?;
                }
                self.attr_if(
                    !is_action && import.include_in_service_document,
                    "IncludeInServiceDocument",
                    "true",
                )
            }

            Node::AnnotationTarget(target) => {
                self.start("Annotations")?;
                self.attr("Target", target)
            }
            Node::Annotation(annotation) => {
                self.start("Annotation")?;
                let term = self.name(&annotation.term);
                self.attr("Term", &term)?;
                if let Some(qualifier) = &annotation.qualifier {
                    self.attr("Qualifier", qualifier)?;
                }
                Ok(())
            }

            Node::Record(record) => {
                self.start("Record")?;
                if let Some(type_name) = &record.type_name {
                    let type_name = self.name(type_name);
                    self.attr("Type", &type_name)?;
                }
                Ok(())
            }
            Node::PropertyValue(value) => {
                self.start("PropertyValue")?;
                self.attr("Property", &value.property)
            }
            Node::Collection => self.start("Collection"),
            Node::If => self.start("If"),
            Node::Cast => self.start("Cast"),
            Node::IsOf => self.start("IsOf"),
            Node::Apply(apply) => {
                self.start("Apply")?;
                let function = self.name(&apply.function);
                self.attr("Function", &function)
            }
            Node::LabeledElement(element) => {
                self.start("LabeledElement")?;
                self.attr("Name", &element.name)
            }
            Node::UrlRef => self.start("UrlRef"),

            Node::CollectionType => self.start("CollectionType"),
            Node::TypeRef => self.start("TypeRef"),
        }
    }

    fn end(&mut self, node: Node<'_>) -> Result<()> {
        match node {
            Node::References
            | Node::Operations(_)
            | Node::Parameters
            | Node::OutOfLineAnnotations => Ok(()),
            Node::Schema(_) => {
                self.prefixes.clear();
                self.finish()
            }
            Node::Document
            | Node::Reference(_)
            | Node::DataServices
            | Node::EntityType(_)
            | Node::ComplexType(_)
            | Node::StructuralProperty(_)
            | Node::NavigationProperty(_)
            | Node::EnumType(_)
            | Node::EnumMember(_)
            | Node::TypeDefinition(_)
            | Node::Term(_)
            | Node::Operation(_)
            | Node::Parameter(_)
            | Node::ReturnType(_)
            | Node::EntityContainer(_)
            | Node::EntitySet(_)
            | Node::Singleton(_)
            | Node::OperationImport { .. }
            | Node::AnnotationTarget(_)
            | Node::Annotation(_)
            | Node::Record(_)
            | Node::PropertyValue(_)
            | Node::Collection
            | Node::If
            | Node::Cast
            | Node::IsOf
            | Node::Apply(_)
            | Node::LabeledElement(_)
            | Node::UrlRef
            | Node::CollectionType
            | Node::TypeRef => self.finish(),
        }
    }

    fn type_test_type_first(&self) -> bool {
        true
    }

    fn reference_includes(&mut self, includes: &[EdmInclude]) -> Result<()> {
        for include in includes {
            self.start("edmx:Include")?;
            self.attr("Namespace", &include.namespace)?;
            if let Some(alias) = &include.alias {
                self.attr("Alias", alias)?;
            }
            self.finish()?;
        }
        Ok(())
    }

    fn reference_include_annotations(
        &mut self,
        include_annotations: &[EdmIncludeAnnotations],
    ) -> Result<()> {
        for include in include_annotations {
            self.start("edmx:IncludeAnnotations")?;
            self.attr("TermNamespace", &include.term_namespace)?;
            if let Some(qualifier) = &include.qualifier {
                self.attr("Qualifier", qualifier)?;
            }
            if let Some(target_namespace) = &include.target_namespace {
                self.attr("TargetNamespace", target_namespace)?;
            }
            self.finish()?;
        }
        Ok(())
    }

    fn type_reference(&mut self, type_ref: &TypeReference, _default: DefaultType) -> Result<()> {
        let name = type_name(self.model, type_ref)?;
        self.attr("Type", &name)
    }

    fn nullable(&mut self, nullable: bool) -> Result<()> {
        self.attr_if(!nullable, "Nullable", "false")
    }

    fn facets(&mut self, facets: &Facets, kind: Option<FacetKind>) -> Result<()> {
        let Some(kind) = kind else {
            return Ok(());
        };
        match kind {
            FacetKind::Binary | FacetKind::String => {
                match facets.max_length {
                    Some(MaxLength::Value(value)) => self.attr("MaxLength", &value.to_string())?,
                    Some(MaxLength::Max) => self.attr("MaxLength", "max")?,
                    None => {}
                }
                if kind == FacetKind::String {
                    self.attr_if(facets.unicode == Some(false), "Unicode", "false")?;
                }
            }
            FacetKind::Temporal => {
                if let Some(precision) = facets.precision.filter(|p| *p != 0) {
                    self.attr("Precision", &precision.to_string())?;
                }
            }
            FacetKind::Decimal => {
                if let Some(precision) = facets.precision {
                    self.attr("Precision", &precision.to_string())?;
                }
                match facets.scale {
                    Some(Scale::Value(0)) | None => {}
                    Some(Scale::Value(value)) => self.attr("Scale", &value.to_string())?,
                    Some(Scale::Variable) => self.attr("Scale", "variable")?,
                    Some(Scale::Floating) => self.attr("Scale", "floating")?,
                }
            }
            FacetKind::Spatial(_) => match facets.srid {
                Some(srid) if is_default_srid(srid, Some(kind)) => {}
                Some(Srid::Value(value)) => self.attr("SRID", &value.to_string())?,
                Some(Srid::Variable) => self.attr("SRID", "variable")?,
                None => {}
            },
        }
        Ok(())
    }

    fn default_value(&mut self, value: &str) -> Result<()> {
        self.attr("DefaultValue", value)
    }

    fn term_applicability(&mut self, term: &Term) -> Result<()> {
        if let Some(base_term) = &term.base_term {
            let base_term = self.name(base_term);
            self.attr("BaseTerm", &base_term)?;
        }
        if !term.applies_to.is_empty() {
            self.attr("AppliesTo", &term.applies_to.join(" "))?;
        }
        Ok(())
    }

    fn key(&mut self, key: &[PropertyRef]) -> Result<()> {
        self.start("Key")?;
        for property_ref in key {
            self.start("PropertyRef")?;
            self.attr("Name", &property_ref.name)?;
            if let Some(alias) = &property_ref.alias {
                self.attr("Alias", alias)?;
            }
            self.finish()?;
        }
        self.finish()
    }

    fn on_delete(&mut self, action: OnDeleteAction) -> Result<()> {
        self.start("OnDelete")?;
        self.attr("Action", action.as_str())?;
        self.finish()
    }

    fn referential_constraints(&mut self, constraints: &[ReferentialConstraint]) -> Result<()> {
        for constraint in constraints {
            self.start("ReferentialConstraint")?;
            self.attr("Property", &constraint.property)?;
            self.attr("ReferencedProperty", &constraint.referenced_property)?;
            self.finish()?;
        }
        Ok(())
    }

    fn navigation_property_bindings(
        &mut self,
        bindings: &[NavigationPropertyBinding],
    ) -> Result<()> {
        for binding in bindings {
            self.start("NavigationPropertyBinding")?;
            self.attr("Path", &binding.path)?;
            self.attr("Target", &binding.target.render())?;
            self.finish()?;
        }
        Ok(())
    }

    fn direct_annotations(&mut self, annotations: &[&DirectValueAnnotation]) -> Result<()> {
        for annotation in annotations {
            let index = self
                .prefixes
                .iter()
                .position(|uri| *uri == annotation.namespace_uri)
                .ok_or_else(|| {
                    CsdlError::internal(format!(
                        "namespace {} of direct annotation {} is not declared on the schema",
                        annotation.namespace_uri, annotation.name
                    ))
                })?;
            self.attr(&format!("p{index}:{}", annotation.name), &annotation.value)?;
        }
        Ok(())
    }

    fn expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Null => {
                self.start("Null")?;
                self.finish()
            }
            Expression::LabeledElementReference(name) => {
                let name = self.name(name);
                self.text_element("LabeledElementReference", &name)
            }
            Expression::EnumMember(members) => {
                let value = enum_member_value(self.model, members);
                self.text_element("EnumMember", &value)
            }
            _ => {
                let (element, text) = self.constant(expression)?;
                self.text_element(element, &text)
            }
        }
    }

    fn inline_expression(&mut self, expression: &Expression) -> Result<()> {
        let (attribute, value) = self.constant(expression)?;
        self.attr(attribute, &value)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.get_mut().flush()?;
        Ok(())
    }
}
