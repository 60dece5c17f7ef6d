// Keyrules Event Types
// Emission events handed to the event queue, and the payloads they carry

mod input_source;
mod mouse_key;

use std::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::key::{ConsumerKeyCode, KeyCode, PointingButton};

pub use input_source::{InputSourceIdentifiers, InputSourceSelector};
pub use mouse_key::MouseKey;

/// The kind of an event, without its payload.
///
/// Used as the target of a from-side `any` trigger and to classify events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    KeyCode,
    ConsumerKeyCode,
    PointingButton,
    Any,
    ShellCommand,
    SelectInputSource,
    SetVariable,
    MouseKey,
}

/// A variable assignment (`set_variable`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetVariable {
    pub name: String,
    pub value: i32,
}

impl SetVariable {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for SetVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// An event as the event queue sees it.
///
/// Input events arrive as one of the first three variants; the rest are
/// only ever produced by to-side definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyCode(KeyCode),
    ConsumerKeyCode(ConsumerKeyCode),
    PointingButton(PointingButton),
    ShellCommand(String),
    SelectInputSource(Vec<InputSourceSelector>),
    SetVariable(SetVariable),
    MouseKey(MouseKey),
}

impl Event {
    pub fn shell_command(command: impl Into<String>) -> Self {
        Event::ShellCommand(command.into())
    }

    pub fn select_input_source(selectors: Vec<InputSourceSelector>) -> Self {
        Event::SelectInputSource(selectors)
    }

    pub fn set_variable(name: impl Into<String>, value: i32) -> Self {
        Event::SetVariable(SetVariable::new(name, value))
    }

    pub fn mouse_key(mouse_key: MouseKey) -> Self {
        Event::MouseKey(mouse_key)
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Event::KeyCode(_) => EventType::KeyCode,
            Event::ConsumerKeyCode(_) => EventType::ConsumerKeyCode,
            Event::PointingButton(_) => EventType::PointingButton,
            Event::ShellCommand(_) => EventType::ShellCommand,
            Event::SelectInputSource(_) => EventType::SelectInputSource,
            Event::SetVariable(_) => EventType::SetVariable,
            Event::MouseKey(_) => EventType::MouseKey,
        }
    }
}

impl From<KeyCode> for Event {
    fn from(key_code: KeyCode) -> Self {
        Event::KeyCode(key_code)
    }
}

impl From<ConsumerKeyCode> for Event {
    fn from(consumer_key_code: ConsumerKeyCode) -> Self {
        Event::ConsumerKeyCode(consumer_key_code)
    }
}

impl From<PointingButton> for Event {
    fn from(pointing_button: PointingButton) -> Self {
        Event::PointingButton(pointing_button)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::KeyCode(key_code) => write!(f, "key_code {}", key_code),
            Event::ConsumerKeyCode(code) => write!(f, "consumer_key_code {}", code),
            Event::PointingButton(button) => write!(f, "pointing_button {}", button),
            Event::ShellCommand(command) => write!(f, "shell_command `{}`", command),
            Event::SelectInputSource(selectors) => {
                write!(f, "select_input_source ({} selectors)", selectors.len())
            }
            Event::SetVariable(assignment) => write!(f, "set_variable {}", assignment),
            Event::MouseKey(mouse_key) => write!(f, "mouse_key {}", mouse_key),
        }
    }
}
