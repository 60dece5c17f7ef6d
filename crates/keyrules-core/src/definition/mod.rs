// Keyrules Event Definitions
// The event kind union, shared JSON ingestion, and accessors common to both rule sides
//
// A rule document describes a trigger ("from") and outputs ("to"). Both sides
// share the kind-defining keys `key_code`, `consumer_key_code` and
// `pointing_button`; everything else is handed to a side-specific validator.

mod from;
mod to;

use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, ParseError};
use crate::event::{Event, EventType, InputSourceSelector, MouseKey, SetVariable};
use crate::key::{ConsumerKeyCode, KeyCode, PointingButton};

pub use from::{FromEventDefinition, ModifierMatch};
pub use to::ToEventDefinition;

/// What a definition describes. Exactly one variant is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventKind {
    #[default]
    None,
    KeyCode(KeyCode),
    ConsumerKeyCode(ConsumerKeyCode),
    PointingButton(PointingButton),
    /// Wildcard trigger: any event of the given type
    Any(EventType),
    ShellCommand(String),
    SelectInputSource(Vec<InputSourceSelector>),
    SetVariable(SetVariable),
    MouseKey(MouseKey),
}

impl EventKind {
    pub fn is_none(&self) -> bool {
        matches!(self, EventKind::None)
    }

    /// Type tag of the active variant, `None` when unset
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            EventKind::None => None,
            EventKind::KeyCode(_) => Some(EventType::KeyCode),
            EventKind::ConsumerKeyCode(_) => Some(EventType::ConsumerKeyCode),
            EventKind::PointingButton(_) => Some(EventType::PointingButton),
            EventKind::Any(_) => Some(EventType::Any),
            EventKind::ShellCommand(_) => Some(EventType::ShellCommand),
            EventKind::SelectInputSource(_) => Some(EventType::SelectInputSource),
            EventKind::SetVariable(_) => Some(EventType::SetVariable),
            EventKind::MouseKey(_) => Some(EventType::MouseKey),
        }
    }
}

/// Accessors shared by [`FromEventDefinition`] and [`ToEventDefinition`].
///
/// Each accessor returns a value only when the definition's kind is the
/// matching variant.
pub trait EventDefinition {
    fn kind(&self) -> &EventKind;

    fn key_code(&self) -> Option<KeyCode> {
        match self.kind() {
            EventKind::KeyCode(key_code) => Some(*key_code),
            _ => None,
        }
    }

    fn consumer_key_code(&self) -> Option<ConsumerKeyCode> {
        match self.kind() {
            EventKind::ConsumerKeyCode(code) => Some(*code),
            _ => None,
        }
    }

    fn pointing_button(&self) -> Option<PointingButton> {
        match self.kind() {
            EventKind::PointingButton(button) => Some(*button),
            _ => None,
        }
    }

    fn any_type(&self) -> Option<EventType> {
        match self.kind() {
            EventKind::Any(event_type) => Some(*event_type),
            _ => None,
        }
    }

    fn shell_command(&self) -> Option<&str> {
        match self.kind() {
            EventKind::ShellCommand(command) => Some(command),
            _ => None,
        }
    }

    fn input_source_selectors(&self) -> Option<&[InputSourceSelector]> {
        match self.kind() {
            EventKind::SelectInputSource(selectors) => Some(selectors),
            _ => None,
        }
    }

    fn set_variable(&self) -> Option<&SetVariable> {
        match self.kind() {
            EventKind::SetVariable(assignment) => Some(assignment),
            _ => None,
        }
    }

    fn mouse_key(&self) -> Option<MouseKey> {
        match self.kind() {
            EventKind::MouseKey(mouse_key) => Some(*mouse_key),
            _ => None,
        }
    }

    /// Convert to the event queue's representation.
    ///
    /// `none` and `any` have no emission form.
    fn to_event(&self) -> Option<Event> {
        match self.kind() {
            EventKind::None | EventKind::Any(_) => None,
            EventKind::KeyCode(key_code) => Some(Event::KeyCode(*key_code)),
            EventKind::ConsumerKeyCode(code) => Some(Event::ConsumerKeyCode(*code)),
            EventKind::PointingButton(button) => Some(Event::PointingButton(*button)),
            EventKind::ShellCommand(command) => Some(Event::shell_command(command.clone())),
            EventKind::SelectInputSource(selectors) => {
                Some(Event::select_input_source(selectors.clone()))
            }
            EventKind::SetVariable(assignment) => Some(Event::SetVariable(assignment.clone())),
            EventKind::MouseKey(mouse_key) => Some(Event::mouse_key(*mouse_key)),
        }
    }
}

/// Side-specific half of definition ingestion.
///
/// The shared ingestion loop offers every key it does not own to the side
/// validator, and reports an unknown key when the validator declines it.
pub(crate) trait KeyHandler {
    /// Returns false when the key is not part of this side's vocabulary
    fn handle_key(
        &mut self,
        kind: &mut EventKind,
        key: &str,
        value: &Value,
        json: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> bool;
}

/// Walk a definition object, filling `kind` and delegating unknown keys.
pub(crate) fn ingest(
    json: &Value,
    kind: &mut EventKind,
    handler: &mut dyn KeyHandler,
    sink: &mut dyn DiagnosticSink,
) {
    let Some(object) = json.as_object() else {
        sink.report(ParseError::structural("event_definition", json));
        return;
    };

    for (key, value) in object {
        match key.as_str() {
            "key_code" => {
                assign_named(kind, key, value, json, sink, KeyCode::from_name, EventKind::KeyCode)
            }
            "consumer_key_code" => assign_named(
                kind,
                key,
                value,
                json,
                sink,
                ConsumerKeyCode::from_name,
                EventKind::ConsumerKeyCode,
            ),
            "pointing_button" => assign_named(
                kind,
                key,
                value,
                json,
                sink,
                PointingButton::from_name,
                EventKind::PointingButton,
            ),
            "description" => {}
            _ => {
                if !handler.handle_key(kind, key, value, json, sink) {
                    sink.report(ParseError::unknown_key(key.as_str(), json));
                }
            }
        }
    }
}

/// Report a duplicate when the kind is already taken
pub(crate) fn kind_is_free(kind: &EventKind, json: &Value, sink: &mut dyn DiagnosticSink) -> bool {
    if kind.is_none() {
        true
    } else {
        sink.report(ParseError::duplicate_kind(json));
        false
    }
}

fn assign_named<T>(
    kind: &mut EventKind,
    key: &str,
    value: &Value,
    json: &Value,
    sink: &mut dyn DiagnosticSink,
    lookup: fn(&str) -> Option<T>,
    wrap: fn(T) -> EventKind,
) {
    if !kind_is_free(kind, json, sink) {
        return;
    }
    let Some(name) = value.as_str() else {
        sink.report(ParseError::structural(key, json));
        return;
    };

    match lookup(name) {
        Some(code) => *kind = wrap(code),
        None => sink.report(ParseError::unknown_value(key, name, json)),
    }
}
