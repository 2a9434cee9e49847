mod json_emitter;
mod references;
mod schema;
mod settings;
mod validation;
mod values;
mod visitor;
mod writer;

pub use json_emitter::*;
pub use schema::{group_schemas, EdmSchema};
pub use settings::*;
pub use validation::*;
pub use visitor::SerializationVisitor;
pub use writer::*;

use std::io::Write;

use serde_json::ser::Formatter;

use crate::error::{Result, ValidationFailed};
use crate::model::EdmModel;

///////////////////////////////////////////////////////////////////////////////

/// Writes an [`EdmModel`] as a CSDL document.
///
/// ```
/// use edm_csdl::csdl::{CsdlWriter, CsdlWriterSettings};
/// use edm_csdl::model::*;
///
/// let mut model = EdmModel::new();
/// model.add_element(EntityType::new("NS", "Person"));
///
/// let mut buf = Vec::new();
/// CsdlWriter::new(CsdlWriterSettings::default().with_xml_declaration(false))
///     .write_xml(&model, &mut buf)
///     .unwrap();
/// assert!(String::from_utf8(buf).unwrap().contains(r#"<EntityType Name="Person"/>"#));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsdlWriter {
    settings: CsdlWriterSettings,
}

impl CsdlWriter {
    pub fn new(settings: CsdlWriterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CsdlWriterSettings {
        &self.settings
    }

    pub fn write_xml<W: Write>(&self, model: &EdmModel, sink: W) -> Result<W> {
        let schemas = self.prepare(model, "xml")?;

        let writer = XmlSchemaWriter::new(sink, model, self.settings.clone());
        let mut visitor = SerializationVisitor::new(model, writer);
        visitor.visit_model(&schemas)?;
        Ok(visitor.into_writer().into_inner())
    }

    pub fn write_json<W: Write>(&self, model: &EdmModel, sink: W) -> Result<W> {
        if self.settings.indent {
            self.write_json_with(model, JsonEmitter::pretty(sink))
        } else {
            self.write_json_with(model, JsonEmitter::compact(sink))
        }
    }

    fn write_json_with<W: Write, F: Formatter>(
        &self,
        model: &EdmModel,
        emitter: JsonEmitter<W, F>,
    ) -> Result<W> {
        let schemas = self.prepare(model, "json")?;

        let writer = JsonSchemaWriter::new(emitter, model, self.settings.clone());
        let mut visitor = SerializationVisitor::new(model, writer);
        visitor.visit_model(&schemas)?;
        Ok(visitor.into_writer().into_inner())
    }

    /// Refuses models with serialization errors, then groups them by namespace
    fn prepare<'m>(&self, model: &'m EdmModel, format: &str) -> Result<Vec<EdmSchema<'m>>> {
        let errors = serialization_errors(model);
        if !errors.is_empty() {
            tracing::warn!(
                format,
                errors = errors.len(),
                first = %errors[0],
                "Refusing to serialize invalid model",
            );
            return Err(ValidationFailed::new(errors).into());
        }

        let schemas = group_schemas(model);
        tracing::debug!(
            format,
            version = %self.settings.version,
            schemas = schemas.len(),
            "Writing CSDL document",
        );
        Ok(schemas)
    }
}

///////////////////////////////////////////////////////////////////////////////

pub fn to_xml_string(model: &EdmModel, settings: CsdlWriterSettings) -> Result<String> {
    let buf = CsdlWriter::new(settings).write_xml(model, Vec::new())?;
    Ok(String::from_utf8(buf)?)
}

pub fn to_json_string(model: &EdmModel, settings: CsdlWriterSettings) -> Result<String> {
    let buf = CsdlWriter::new(settings).write_json(model, Vec::new())?;
    Ok(String::from_utf8(buf)?)
}
