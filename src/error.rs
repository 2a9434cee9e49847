use std::string::FromUtf8Error;

use crate::csdl::EdmError;

///////////////////////////////////////////////////////////////////////////////

pub type Result<T, E = CsdlError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum CsdlError {
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    #[error(transparent)]
    UnsupportedFeature(#[from] UnsupportedFeature),
    #[error(transparent)]
    Validation(#[from] ValidationFailed),
    #[error(transparent)]
    FromUtf8Error(#[from] FromUtf8Error),
    #[error(transparent)]
    Internal(InternalError),
}

impl CsdlError {
    pub fn internal(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Internal(InternalError::new(error))
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
#[error("Internal error")]
pub struct InternalError {
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl InternalError {
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            source: error.into(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

/// The model breaks a contract the writer relies on, e.g. an operation
/// import whose entity set is not a path
#[derive(thiserror::Error, Debug)]
#[error("Invalid operation on {element}: {msg}")]
pub struct InvalidOperation {
    pub element: String,
    pub msg: String,
}

impl InvalidOperation {
    pub fn new(element: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            msg: msg.into(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
#[error("Unsupported feature: {feature}")]
pub struct UnsupportedFeature {
    pub feature: String,
}

impl UnsupportedFeature {
    pub fn new(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug)]
#[error("Model has {} serialization error(s), first: {}", .errors.len(), first_error(.errors))]
pub struct ValidationFailed {
    pub errors: Vec<EdmError>,
}

impl ValidationFailed {
    pub fn new(errors: Vec<EdmError>) -> Self {
        Self { errors }
    }
}

fn first_error(errors: &[EdmError]) -> String {
    errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

///////////////////////////////////////////////////////////////////////////////

impl From<quick_xml::Error> for CsdlError {
    fn from(error: quick_xml::Error) -> Self {
        CsdlError::Internal(InternalError::new(error))
    }
}

impl From<std::io::Error> for CsdlError {
    fn from(error: std::io::Error) -> Self {
        CsdlError::Internal(InternalError::new(error))
    }
}

impl From<serde_json::Error> for CsdlError {
    fn from(error: serde_json::Error) -> Self {
        CsdlError::Internal(InternalError::new(error))
    }
}
