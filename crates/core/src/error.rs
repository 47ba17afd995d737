//! Error types for report generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a feedback payload into a deck.
///
/// The validation variants carry the user-facing Arabic messages the intake
/// frontend shows verbatim; the rest describe template or renderer faults.
#[derive(Error, Debug)]
pub enum Error {
    /// The payload has no `categories` collection, or it is empty.
    #[error("لا توجد ملاحظات للتحليل")]
    EmptyCategories,

    /// Categories were present but nothing usable survived normalization.
    #[error("لم يتم العثور على ملاحظات صالحة")]
    NoValidNotes,

    /// No template document at the configured path.
    #[error("القالب غير موجود: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template has fewer than the two slides the renderer relies on.
    #[error("template needs at least 2 slides, found {0}")]
    TemplateTooSmall(usize),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (the PPTX container).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error in one of the PPTX parts.
    #[error("XML error: {0}")]
    XmlError(String),

    /// A part the renderer needs is absent from the template package.
    #[error("template part missing: {0}")]
    MissingPart(String),
}

impl Error {
    /// Whether the failure was caused by the request payload rather than
    /// the template or the renderer.
    ///
    /// Frontends map validation failures to client errors and everything
    /// else to server errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyCategories | Error::NoValidNotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::EmptyCategories.is_validation());
        assert!(Error::NoValidNotes.is_validation());
        assert!(!Error::TemplateNotFound(PathBuf::from("template.pptx")).is_validation());
        assert!(!Error::ZipError("truncated".into()).is_validation());
    }

    #[test]
    fn test_template_not_found_names_path() {
        let err = Error::TemplateNotFound(PathBuf::from("assets/template.pptx"));
        assert!(err.to_string().contains("assets/template.pptx"));
        assert!(err.to_string().starts_with("القالب غير موجود"));
    }
}
