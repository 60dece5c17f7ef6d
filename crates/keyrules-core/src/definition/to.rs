// Keyrules To-Event Definition
// Output side of a rule: event kind, exact modifiers, and emission attributes

use serde_json::Value;

use super::{ingest, kind_is_free, EventDefinition, EventKind, KeyHandler};
use crate::diagnostics::{DiagnosticSink, ParseError};
use crate::event::{InputSourceSelector, MouseKey, SetVariable};
use crate::modifier::{categories_from_json, ModifierCategories};

/// One output of a manipulator.
///
/// `lazy` outputs are held back by the pipeline until another event needs
/// them; `repeat` controls key-repeat generation for the output.
#[derive(Debug, Clone, PartialEq)]
pub struct ToEventDefinition {
    kind: EventKind,
    modifiers: ModifierCategories,
    lazy: bool,
    repeat: bool,
}

impl Default for ToEventDefinition {
    fn default() -> Self {
        Self {
            kind: EventKind::None,
            modifiers: ModifierCategories::empty(),
            lazy: false,
            repeat: true,
        }
    }
}

impl ToEventDefinition {
    pub fn new(kind: EventKind, modifiers: ModifierCategories) -> Self {
        Self {
            kind,
            modifiers,
            ..Self::default()
        }
    }

    /// Build an output from its JSON object, reporting problems to `sink`
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Self {
        let mut kind = EventKind::None;
        let mut keys = ToKeys::default();
        ingest(json, &mut kind, &mut keys, sink);

        Self {
            kind,
            modifiers: keys.modifiers,
            lazy: keys.lazy,
            repeat: keys.repeat,
        }
    }

    pub fn modifiers(&self) -> ModifierCategories {
        self.modifiers
    }

    pub fn lazy(&self) -> bool {
        self.lazy
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    /// True when the output must go through the virtual pointing device
    /// instead of the virtual keyboard.
    pub fn needs_virtual_hid_pointing(&self) -> bool {
        matches!(self.kind, EventKind::PointingButton(_) | EventKind::MouseKey(_))
    }
}

impl EventDefinition for ToEventDefinition {
    fn kind(&self) -> &EventKind {
        &self.kind
    }
}

/// To-side keys: modifiers, emission flags and the output-only event kinds
struct ToKeys {
    modifiers: ModifierCategories,
    lazy: bool,
    repeat: bool,
}

impl Default for ToKeys {
    fn default() -> Self {
        Self {
            modifiers: ModifierCategories::empty(),
            lazy: false,
            repeat: true,
        }
    }
}

fn bool_field(
    slot: &mut bool,
    key: &str,
    value: &Value,
    json: &Value,
    sink: &mut dyn DiagnosticSink,
) {
    match value.as_bool() {
        Some(flag) => *slot = flag,
        None => sink.report(ParseError::structural(key, json)),
    }
}

fn shell_command(kind: &mut EventKind, value: &Value, json: &Value, sink: &mut dyn DiagnosticSink) {
    if !kind_is_free(kind, json, sink) {
        return;
    }
    match value.as_str() {
        Some(command) => *kind = EventKind::ShellCommand(command.to_string()),
        None => sink.report(ParseError::structural("shell_command", json)),
    }
}

fn select_input_source(
    kind: &mut EventKind,
    value: &Value,
    json: &Value,
    sink: &mut dyn DiagnosticSink,
) {
    if !kind_is_free(kind, json, sink) {
        return;
    }

    let selectors = match value {
        Value::Object(_) => vec![InputSourceSelector::from_json(value, sink)],
        Value::Array(entries) => {
            let mut selectors = Vec::with_capacity(entries.len());
            for entry in entries {
                if entry.is_object() {
                    selectors.push(InputSourceSelector::from_json(entry, sink));
                } else {
                    sink.report(ParseError::structural("input_source_selector", entry));
                }
            }
            selectors
        }
        _ => {
            sink.report(ParseError::structural("select_input_source", json));
            return;
        }
    };

    *kind = EventKind::SelectInputSource(selectors);
}

fn set_variable(kind: &mut EventKind, value: &Value, json: &Value, sink: &mut dyn DiagnosticSink) {
    if !kind_is_free(kind, json, sink) {
        return;
    }
    let Some(object) = value.as_object() else {
        sink.report(ParseError::structural("set_variable", json));
        return;
    };

    let Some(name) = object.get("name").and_then(Value::as_str) else {
        sink.report(ParseError::incomplete_field("set_variable", "name", json));
        return;
    };
    let Some(number) = object
        .get("value")
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
    else {
        sink.report(ParseError::incomplete_field("set_variable", "value", json));
        return;
    };

    *kind = EventKind::SetVariable(SetVariable::new(name, number));
}

fn mouse_key(kind: &mut EventKind, value: &Value, json: &Value, sink: &mut dyn DiagnosticSink) {
    if !kind_is_free(kind, json, sink) {
        return;
    }
    if !value.is_object() {
        sink.report(ParseError::structural("mouse_key", json));
        return;
    }

    *kind = EventKind::MouseKey(MouseKey::from_json(value, sink));
}

impl KeyHandler for ToKeys {
    fn handle_key(
        &mut self,
        kind: &mut EventKind,
        key: &str,
        value: &Value,
        json: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        match key {
            "modifiers" => self.modifiers = categories_from_json(value, sink),
            "lazy" => bool_field(&mut self.lazy, key, value, json, sink),
            "repeat" => bool_field(&mut self.repeat, key, value, json, sink),
            "shell_command" => shell_command(kind, value, json, sink),
            "select_input_source" => select_input_source(kind, value, json, sink),
            "set_variable" => set_variable(kind, value, json, sink),
            "mouse_key" => mouse_key(kind, value, json, sink),
            _ => return false,
        }
        true
    }
}
