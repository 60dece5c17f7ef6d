// Keyrules Diagnostics
// Non-fatal validation errors raised while reading rule documents

use serde::Serialize;
use serde_json::Value;

/// A validation problem found in a rule document.
///
/// None of these abort parsing. The offending field is skipped and the
/// definition keeps whatever state it had before that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    /// The document or a field does not have the expected JSON shape
    #[error("Invalid form of {what}: {json}")]
    Structural { what: String, json: String },

    /// A second kind-defining key appeared after one was accepted
    #[error("Duplicated type definition: {json}")]
    DuplicateKind { json: String },

    /// An object carries a key nobody recognizes
    #[error("Unknown key: {key} in {json}")]
    UnknownKey { key: String, json: String },

    /// A recognized key holds a string that names nothing
    #[error("Unknown {what}: {value} in {json}")]
    UnknownValue {
        what: String,
        value: String,
        json: String,
    },

    /// A composite field is missing a sub-field or has it with the wrong type
    #[error("valid `{field}` is not found in {key}: {json}")]
    IncompleteField {
        key: String,
        field: String,
        json: String,
    },
}

impl ParseError {
    pub fn structural(what: impl Into<String>, json: &Value) -> Self {
        ParseError::Structural {
            what: what.into(),
            json: json.to_string(),
        }
    }

    pub fn duplicate_kind(json: &Value) -> Self {
        ParseError::DuplicateKind {
            json: json.to_string(),
        }
    }

    pub fn unknown_key(key: impl Into<String>, json: &Value) -> Self {
        ParseError::UnknownKey {
            key: key.into(),
            json: json.to_string(),
        }
    }

    pub fn unknown_value(what: impl Into<String>, value: impl Into<String>, json: &Value) -> Self {
        ParseError::UnknownValue {
            what: what.into(),
            value: value.into(),
            json: json.to_string(),
        }
    }

    pub fn incomplete_field(key: impl Into<String>, field: impl Into<String>, json: &Value) -> Self {
        ParseError::IncompleteField {
            key: key.into(),
            field: field.into(),
            json: json.to_string(),
        }
    }
}

/// Receiver for validation errors.
///
/// Parsing entry points take a sink explicitly so callers decide whether
/// problems are logged, collected for display, or both.
pub trait DiagnosticSink {
    fn report(&mut self, error: ParseError);
}

impl DiagnosticSink for Vec<ParseError> {
    fn report(&mut self, error: ParseError) {
        self.push(error);
    }
}

/// Forwards every error to the `log` facade at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, error: ParseError) {
        log::error!("complex_modifications json error: {}", error);
    }
}

/// Collects errors and logs them as they arrive
#[derive(Debug, Default, Clone)]
pub struct LoggingCollector {
    errors: Vec<ParseError>,
}

impl LoggingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

impl DiagnosticSink for LoggingCollector {
    fn report(&mut self, error: ParseError) {
        LogSink.report(error.clone());
        self.errors.push(error);
    }
}
