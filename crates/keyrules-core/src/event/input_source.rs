// Keyrules Input Source Selectors
// Regex-based selection of keyboard input sources (`select_input_source`)

use regex::Regex;
use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, ParseError};

/// Identifiers of an installed input source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSourceIdentifiers {
    pub language: Option<String>,
    pub input_source_id: Option<String>,
    pub input_mode_id: Option<String>,
}

/// Selects input sources by matching their identifiers against patterns.
///
/// Every pattern that is present must find a match in the corresponding
/// identifier. A selector with no patterns selects everything.
#[derive(Debug, Clone, Default)]
pub struct InputSourceSelector {
    language: Option<Regex>,
    input_source_id: Option<Regex>,
    input_mode_id: Option<Regex>,
}

impl InputSourceSelector {
    /// Read one selector object, reporting bad fields and skipping them
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Self {
        let mut selector = InputSourceSelector::default();

        let Some(object) = json.as_object() else {
            sink.report(ParseError::structural("input_source_selector", json));
            return selector;
        };

        for (key, value) in object {
            let slot = match key.as_str() {
                "language" => &mut selector.language,
                "input_source_id" => &mut selector.input_source_id,
                "input_mode_id" => &mut selector.input_mode_id,
                _ => {
                    sink.report(ParseError::unknown_key(key.as_str(), json));
                    continue;
                }
            };

            let Some(pattern) = value.as_str() else {
                sink.report(ParseError::structural(key.as_str(), json));
                continue;
            };

            match Regex::new(pattern) {
                Ok(regex) => *slot = Some(regex),
                Err(e) => {
                    log::debug!("invalid regex in input source selector: {}", e);
                    sink.report(ParseError::structural(format!("{} regex", key), json));
                }
            }
        }

        selector
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_ref().map(Regex::as_str)
    }

    pub fn input_source_id(&self) -> Option<&str> {
        self.input_source_id.as_ref().map(Regex::as_str)
    }

    pub fn input_mode_id(&self) -> Option<&str> {
        self.input_mode_id.as_ref().map(Regex::as_str)
    }

    /// Check whether an input source is selected
    pub fn test(&self, identifiers: &InputSourceIdentifiers) -> bool {
        matches(&self.language, identifiers.language.as_deref())
            && matches(&self.input_source_id, identifiers.input_source_id.as_deref())
            && matches(&self.input_mode_id, identifiers.input_mode_id.as_deref())
    }
}

fn matches(pattern: &Option<Regex>, identifier: Option<&str>) -> bool {
    match (pattern, identifier) {
        (None, _) => true,
        (Some(regex), Some(identifier)) => regex.is_match(identifier),
        (Some(_), None) => false,
    }
}

impl PartialEq for InputSourceSelector {
    fn eq(&self, other: &Self) -> bool {
        self.language() == other.language()
            && self.input_source_id() == other.input_source_id()
            && self.input_mode_id() == other.input_mode_id()
    }
}
