//! Error types for the harvester.
//!
//! Every variant is terminal for the fetch that produced it: the core never
//! retries and never skips. Records yielded before an error stay valid.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Unsupported fetch category.
    #[error("Invalid category: '{0}'. Expected one of: entity, locale")]
    InvalidCategory(String),

    /// Entity fetches are scoped to a locale.
    #[error("A locale is required to fetch entities")]
    MissingLocale,

    /// Invalid server base address.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Invalid date format.
    #[error("Invalid date: '{0}'. Expected ISO-8601 (e.g., 2024-01-01 or 2024-01-01T10:00:00Z)")]
    InvalidDate(String),

    /// Page size must be positive.
    #[error("Invalid max items: {0}. Expected a positive integer")]
    InvalidMaxItems(usize),

    /// An identity component was empty.
    #[error("Cannot derive identity: component {index} is empty")]
    InvalidIdentity { index: usize },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Entities search request failed.
    #[error("Failed to fetch entities page {page} for locale {locale}: {source}")]
    EntitiesRequest {
        page: u32,
        locale: String,
        #[source]
        source: reqwest::Error,
    },

    /// History lookup failed.
    #[error("Failed to fetch history of entity {entity} for locale {locale}: {source}")]
    HistoryRequest {
        entity: u64,
        locale: String,
        #[source]
        source: reqwest::Error,
    },

    /// Locale listing query failed.
    #[error("Failed to fetch locales: {source}")]
    LocalesRequest {
        #[source]
        source: reqwest::Error,
    },

    /// Response body is not the JSON we expect.
    #[error("Malformed response for {context}: {source}")]
    MalformedResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// GraphQL server reported errors.
    #[error("GraphQL query failed: {0}")]
    GraphQl(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvesterError::InvalidCategory("issue".to_string());
        assert!(err.to_string().contains("issue"));
        assert!(err.to_string().contains("entity, locale"));
    }

    #[test]
    fn test_invalid_url_display() {
        let err = HarvesterError::InvalidUrl {
            url: "ftp://pontoon".to_string(),
            reason: "unsupported scheme".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid server URL 'ftp://pontoon': unsupported scheme"
        );
    }

    #[test]
    fn test_malformed_response_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = HarvesterError::MalformedResponse {
            context: "entities page 2".to_string(),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("Malformed response for entities page 2:"));
    }
}
