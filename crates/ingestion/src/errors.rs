//! Ingestion error types

use paperscope_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("PDF parse error for {path}: {message}")]
    PdfParseError { path: String, message: String },

    #[error("Not a URL: {0}")]
    InvalidUrl(String),

    #[error("Could not resolve a paper from {url}")]
    Unresolvable { url: String },

    #[error("Download failed for {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("Document at {url} is {size} bytes, limit is {limit}")]
    DocumentTooLarge { url: String, size: usize, limit: usize },

    #[error("Metadata lookup failed for {id}: {message}")]
    MetadataError { id: String, message: String },

    #[error("Search failed: {0}")]
    SearchError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] AppError),
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::Common(inner) => inner,
            IngestionError::PdfParseError { .. } => AppError::DocumentParse {
                message: e.to_string(),
            },
            IngestionError::InvalidUrl(url) => AppError::InvalidUrl { url },
            IngestionError::Unresolvable { .. }
            | IngestionError::FetchError { .. }
            | IngestionError::DocumentTooLarge { .. } => AppError::DocumentUnavailable {
                message: e.to_string(),
            },
            IngestionError::MetadataError { .. } | IngestionError::SearchError(_) => {
                AppError::UpstreamSearch {
                    message: e.to_string(),
                }
            }
            IngestionError::ConfigError(message) => AppError::Configuration { message },
            IngestionError::IoError(err) => AppError::from(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperscope_common::errors::ErrorCode;

    #[test]
    fn test_conversion_into_app_error() {
        let parse: AppError = IngestionError::PdfParseError {
            path: "a.pdf".into(),
            message: "no text".into(),
        }
        .into();
        assert_eq!(parse.code(), ErrorCode::DocumentParseError);

        let unresolved: AppError = IngestionError::Unresolvable {
            url: "https://example.com/x".into(),
        }
        .into();
        assert_eq!(unresolved.code(), ErrorCode::DocumentUnavailable);

        let search: AppError = IngestionError::SearchError("timeout".into()).into();
        assert_eq!(search.code(), ErrorCode::UpstreamSearchError);

        let passthrough: AppError = IngestionError::Common(AppError::EmptyGeneration).into();
        assert_eq!(passthrough.code(), ErrorCode::EmptyGeneration);
    }
}
