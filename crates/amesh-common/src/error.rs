//! Error types for the amesh render pipeline.

use thiserror::Error;

/// Result type alias using AmeshError.
pub type AmeshResult<T> = Result<T, AmeshError>;

/// Classification of an [`AmeshError`], independent of the context chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Timestamp index, lightning data or a single tile could not be fetched.
    UpstreamUnavailable,
    /// The geocoding call failed (network error, bad key, non-2xx, undecodable body).
    Geocoding,
    /// The geocoder answered but returned zero results.
    NotFound,
    /// A coordinate string did not have the expected shape.
    InvalidCoordinateFormat,
    /// A timestamp index or lightning body could not be decoded.
    MalformedResponse,
    /// Image encoding or decoding failed.
    Encoding,
    /// The HTTP transport itself failed (connect, timeout, body read).
    Request,
}

/// Primary error type for amesh operations.
#[derive(Debug, Error)]
pub enum AmeshError {
    // === Upstream Data Errors ===
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    // === Location Errors ===
    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("No results found for place: {0}")]
    NotFound(String),

    #[error("Invalid coordinates format: {0}")]
    InvalidCoordinateFormat(String),

    // === Infrastructure Errors ===
    #[error("Image encoding failed: {0}")]
    Encoding(String),

    #[error("HTTP request failed: {0}")]
    Request(String),

    /// An inner error wrapped with a description of what was being attempted.
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<AmeshError>,
    },
}

impl AmeshError {
    /// The kind of the innermost error in the context chain.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmeshError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            AmeshError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            AmeshError::Geocoding(_) => ErrorKind::Geocoding,
            AmeshError::NotFound(_) => ErrorKind::NotFound,
            AmeshError::InvalidCoordinateFormat(_) => ErrorKind::InvalidCoordinateFormat,
            AmeshError::Encoding(_) => ErrorKind::Encoding,
            AmeshError::Request(_) => ErrorKind::Request,
            AmeshError::Context { source, .. } => source.kind(),
        }
    }

    /// Wrap this error with a context message.
    pub fn context(self, context: impl Into<String>) -> Self {
        AmeshError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Context messages from outermost to innermost.
    pub fn context_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let AmeshError::Context { context, source } = current {
            chain.push(context.as_str());
            current = source;
        }
        chain
    }

    /// Whether this error should abort a whole render request.
    ///
    /// Upstream data problems only degrade the image; location failures
    /// abort it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Geocoding
                | ErrorKind::NotFound
                | ErrorKind::InvalidCoordinateFormat
                | ErrorKind::Encoding
        )
    }
}

/// Attach context to the error side of an [`AmeshResult`].
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> AmeshResult<T>;

    fn with_context<C, F>(self, f: F) -> AmeshResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for AmeshResult<T> {
    fn context(self, context: impl Into<String>) -> AmeshResult<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> AmeshResult<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}

impl From<serde_json::Error> for AmeshError {
    fn from(err: serde_json::Error) -> Self {
        AmeshError::MalformedResponse(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_survives_context_chain() {
        let err = AmeshError::NotFound("東京".to_string())
            .context("Failed to geocode")
            .context("Failed to resolve location");

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.context_chain(),
            vec!["Failed to resolve location", "Failed to geocode"]
        );
        assert_eq!(
            err.to_string(),
            "Failed to resolve location: Failed to geocode: No results found for place: 東京"
        );
    }

    #[test]
    fn test_result_ext() {
        let result: AmeshResult<()> = Err(AmeshError::Geocoding("status 401".to_string()));
        let err = result.with_context(|| format!("query {}", "大阪")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Geocoding);
        assert!(err.to_string().starts_with("query 大阪: "));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(AmeshError::Geocoding(String::new()).is_fatal());
        assert!(AmeshError::NotFound(String::new()).is_fatal());
        assert!(AmeshError::InvalidCoordinateFormat(String::new()).is_fatal());
        assert!(!AmeshError::UpstreamUnavailable(String::new()).is_fatal());
        assert!(!AmeshError::MalformedResponse(String::new()).is_fatal());
    }

    #[test]
    fn test_json_error_is_malformed_response() {
        let err: AmeshError = serde_json::from_str::<Vec<u8>>("invalid json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
