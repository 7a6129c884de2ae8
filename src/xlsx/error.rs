//! Container-level error types

use thiserror::Error;

/// Errors raised while decoding or encoding an xlsx container.
#[derive(Error, Debug)]
pub enum XlsxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing workbook part: {0}")]
    MissingPart(String),

    #[error("Malformed workbook: {0}")]
    Malformed(String),
}

impl From<quick_xml::events::attributes::AttrError> for XlsxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XlsxError::Malformed(format!("bad attribute: {}", err))
    }
}
