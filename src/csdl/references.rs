use crate::csdl::writer::{Node, SchemaWriter};
use crate::error::Result;
use crate::model::EdmModel;

///////////////////////////////////////////////////////////////////////////////

// <edmx:Reference Uri="https://oasis-tcs.github.io/odata-vocabularies/vocabularies/Org.OData.Core.V1.xml">
//   <edmx:Include Namespace="Org.OData.Core.V1" Alias="Core"/>
// </edmx:Reference>
/// Writes the model's references to external CSDL documents
pub fn write_references<S: SchemaWriter + ?Sized>(model: &EdmModel, writer: &mut S) -> Result<()> {
    let references = model.references();
    if references.is_empty() {
        return Ok(());
    }

    tracing::trace!(count = references.len(), "Writing references");

    writer.begin(Node::References)?;
    for reference in references {
        writer.begin(Node::Reference(reference))?;
        writer.reference_includes(&reference.includes)?;
        writer.reference_include_annotations(&reference.include_annotations)?;
        writer.end(Node::Reference(reference))?;
    }
    writer.end(Node::References)
}
