// Keyrules Rule Documents
// Complex-modification files: rule sets, rules, and basic manipulators

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::Value;

use crate::definition::{EventDefinition, FromEventDefinition, ToEventDefinition};
use crate::diagnostics::{DiagnosticSink, ParseError};
use crate::event::Event;
use crate::modifier::{ModifierFlags, ModifierState};

/// Check if verbose rule load tracing is enabled
fn rules_debug_enabled() -> bool {
    static DEBUG_RULES: OnceLock<bool> = OnceLock::new();
    *DEBUG_RULES.get_or_init(|| {
        std::env::var("KEYRULES_DEBUG_RULES")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "on"))
            .unwrap_or(false)
    })
}

/// Rule file loading errors.
///
/// Only problems that prevent reading the document at all end up here.
/// Problems inside the document are reported through a [`DiagnosticSink`].
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule file root must be an object")]
    NotAnObject,
}

/// A `"type": "basic"` manipulator: one trigger and its outputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manipulator {
    description: Option<String>,
    from: FromEventDefinition,
    to: Vec<ToEventDefinition>,
    to_if_alone: Vec<ToEventDefinition>,
    to_after_key_up: Vec<ToEventDefinition>,
}

impl Manipulator {
    pub fn new(from: FromEventDefinition, to: Vec<ToEventDefinition>) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    /// Parse a manipulator object.
    ///
    /// Returns `None` when the manipulator cannot be used: it is not an
    /// object, its `type` is missing or not `basic`, or it has no `from`.
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Option<Self> {
        let Some(object) = json.as_object() else {
            sink.report(ParseError::structural("manipulator", json));
            return None;
        };

        match object.get("type") {
            Some(Value::String(kind)) if kind == "basic" => {}
            Some(Value::String(kind)) => {
                sink.report(ParseError::unknown_value("manipulator type", kind.as_str(), json));
                return None;
            }
            _ => {
                sink.report(ParseError::incomplete_field("manipulator", "type", json));
                return None;
            }
        }

        let mut manipulator = Manipulator::default();
        let mut has_from = false;

        for (key, value) in object {
            match key.as_str() {
                "type" => {}
                "description" => match value.as_str() {
                    Some(text) => manipulator.description = Some(text.to_string()),
                    None => sink.report(ParseError::structural("description", json)),
                },
                "from" => {
                    manipulator.from = FromEventDefinition::from_json(value, sink);
                    has_from = true;
                }
                "to" => manipulator.to = to_definitions(key, value, sink),
                "to_if_alone" => manipulator.to_if_alone = to_definitions(key, value, sink),
                "to_after_key_up" => {
                    manipulator.to_after_key_up = to_definitions(key, value, sink)
                }
                // Evaluated by the manipulator chain, not here
                "conditions" | "parameters" => {
                    log::debug!("manipulator key `{}` is not evaluated", key);
                }
                _ => sink.report(ParseError::unknown_key(key.as_str(), json)),
            }
        }

        if !has_from {
            sink.report(ParseError::incomplete_field("manipulator", "from", json));
            return None;
        }

        if rules_debug_enabled() {
            log::trace!(
                "manipulator from={:?} to={} to_if_alone={} to_after_key_up={}",
                manipulator.from,
                manipulator.to.len(),
                manipulator.to_if_alone.len(),
                manipulator.to_after_key_up.len()
            );
        }

        Some(manipulator)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn from(&self) -> &FromEventDefinition {
        &self.from
    }

    pub fn to(&self) -> &[ToEventDefinition] {
        &self.to
    }

    pub fn to_if_alone(&self) -> &[ToEventDefinition] {
        &self.to_if_alone
    }

    pub fn to_after_key_up(&self) -> &[ToEventDefinition] {
        &self.to_after_key_up
    }

    /// Test an input event and the held modifiers against the trigger.
    ///
    /// Returns the consumed modifier flags on a match.
    pub fn test<S: ModifierState + ?Sized>(&self, event: &Event, state: &S) -> Option<ModifierFlags> {
        if !self.from.test_event(event) {
            return None;
        }
        self.from.test_modifiers(state)
    }

    /// Events emitted on key down, in order
    pub fn to_events(&self) -> Vec<Event> {
        self.to.iter().filter_map(|to| to.to_event()).collect()
    }

    pub fn needs_virtual_hid_pointing(&self) -> bool {
        self.to
            .iter()
            .chain(&self.to_if_alone)
            .chain(&self.to_after_key_up)
            .any(ToEventDefinition::needs_virtual_hid_pointing)
    }
}

/// Output lists accept a single object or an array of objects
fn to_definitions(key: &str, value: &Value, sink: &mut dyn DiagnosticSink) -> Vec<ToEventDefinition> {
    match value {
        Value::Object(_) => vec![ToEventDefinition::from_json(value, sink)],
        Value::Array(entries) => {
            let mut definitions = Vec::with_capacity(entries.len());
            for entry in entries {
                if entry.is_object() {
                    definitions.push(ToEventDefinition::from_json(entry, sink));
                } else {
                    sink.report(ParseError::structural(key, entry));
                }
            }
            definitions
        }
        _ => {
            sink.report(ParseError::structural(key, value));
            Vec::new()
        }
    }
}

/// A described group of manipulators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    description: Option<String>,
    manipulators: Vec<Manipulator>,
}

impl Rule {
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Option<Self> {
        let Some(object) = json.as_object() else {
            sink.report(ParseError::structural("rule", json));
            return None;
        };

        let mut rule = Rule::default();
        for (key, value) in object {
            match key.as_str() {
                "description" => match value.as_str() {
                    Some(text) => rule.description = Some(text.to_string()),
                    None => sink.report(ParseError::structural("description", json)),
                },
                "manipulators" => match value.as_array() {
                    Some(entries) => {
                        rule.manipulators = entries
                            .iter()
                            .filter_map(|entry| Manipulator::from_json(entry, sink))
                            .collect();
                    }
                    None => sink.report(ParseError::structural("manipulators", json)),
                },
                _ => sink.report(ParseError::unknown_key(key.as_str(), json)),
            }
        }

        log::debug!(
            "rule '{}': {} manipulators",
            rule.description().unwrap_or("<untitled>"),
            rule.manipulators.len()
        );
        Some(rule)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn manipulators(&self) -> &[Manipulator] {
        &self.manipulators
    }
}

/// A complex-modifications file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    title: Option<String>,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build from an already parsed document.
    ///
    /// A non-object root yields an empty set and a structural error.
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Self {
        let mut rule_set = RuleSet::default();
        let Some(object) = json.as_object() else {
            sink.report(ParseError::structural("complex_modifications", json));
            return rule_set;
        };

        for (key, value) in object {
            match key.as_str() {
                "title" => match value.as_str() {
                    Some(text) => rule_set.title = Some(text.to_string()),
                    None => sink.report(ParseError::structural("title", json)),
                },
                "rules" => match value.as_array() {
                    Some(entries) => {
                        rule_set.rules = entries
                            .iter()
                            .filter_map(|entry| Rule::from_json(entry, sink))
                            .collect();
                    }
                    None => sink.report(ParseError::structural("rules", json)),
                },
                _ => sink.report(ParseError::unknown_key(key.as_str(), json)),
            }
        }
        rule_set
    }

    /// Parse rule file text
    pub fn from_json_str(text: &str, sink: &mut dyn DiagnosticSink) -> Result<Self, RuleLoadError> {
        let json: Value = serde_json::from_str(text)?;
        if !json.is_object() {
            return Err(RuleLoadError::NotAnObject);
        }
        Ok(Self::from_json(&json, sink))
    }

    /// Load a rule file from disk
    pub fn from_path(path: impl AsRef<Path>, sink: &mut dyn DiagnosticSink) -> Result<Self, RuleLoadError> {
        let path = path.as_ref();
        log::debug!("loading rules from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text, sink)
    }

    /// Get the default rule file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyrules").join("complex_modifications.json"))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every manipulator in document order
    pub fn manipulators(&self) -> impl Iterator<Item = &Manipulator> {
        self.rules.iter().flat_map(|rule| rule.manipulators.iter())
    }
}
