pub mod csdl;
pub mod error;
pub mod model;

pub use csdl::{to_json_string, to_xml_string, CsdlWriter, CsdlWriterSettings, EdmVersion};
pub use model::EdmModel;
