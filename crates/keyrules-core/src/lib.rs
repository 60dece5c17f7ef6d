// Keyrules Core Library
// Complex-modification rules: modifier vocabulary, event definitions, and rule documents

pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod event;
pub mod key;
pub mod modifier;
pub mod state;

pub use config::{Manipulator, Rule, RuleLoadError, RuleSet};
pub use definition::{EventDefinition, EventKind, FromEventDefinition, ModifierMatch, ToEventDefinition};
pub use diagnostics::{DiagnosticSink, LogSink, LoggingCollector, ParseError};
pub use event::{Event, EventType, InputSourceIdentifiers, InputSourceSelector, MouseKey, SetVariable};
pub use key::{ConsumerKeyCode, KeyCode, PointingButton};
pub use modifier::{
    category_for_flag, flags_for_category, ModifierCategories, ModifierCategory, ModifierFlag,
    ModifierFlags, ModifierState,
};
pub use state::{ModifierFlagManager, RuleStore};
