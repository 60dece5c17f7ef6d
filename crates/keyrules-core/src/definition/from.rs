// Keyrules From-Event Definition
// Trigger side of a rule: event kind plus mandatory/optional modifiers, and the matcher

use serde_json::Value;
use strum::IntoEnumIterator;

use super::{ingest, kind_is_free, EventDefinition, EventKind, KeyHandler};
use crate::diagnostics::{DiagnosticSink, ParseError};
use crate::event::{Event, EventType};
use crate::modifier::{
    categories_from_json, ModifierCategories, ModifierCategory, ModifierFlag, ModifierFlags,
    ModifierState,
};

/// Outcome of a satisfied single-category test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierMatch {
    /// The `any` category, satisfied without consuming a flag
    Wildcard,
    /// The first pressed flag of the category
    Flag(ModifierFlag),
}

/// The trigger side of a manipulator.
///
/// `mandatory` categories must all be held and are reported as consumed on a
/// match. `optional` categories may be held without breaking the match;
/// `optional: any` tolerates every extra modifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromEventDefinition {
    kind: EventKind,
    mandatory: ModifierCategories,
    optional: ModifierCategories,
}

impl FromEventDefinition {
    pub fn new(kind: EventKind, mandatory: ModifierCategories, optional: ModifierCategories) -> Self {
        Self {
            kind,
            mandatory,
            optional,
        }
    }

    /// Build a trigger from its JSON object, reporting problems to `sink`
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Self {
        let mut kind = EventKind::None;
        let mut keys = FromKeys::default();
        ingest(json, &mut kind, &mut keys, sink);

        Self {
            kind,
            mandatory: keys.mandatory,
            optional: keys.optional,
        }
    }

    pub fn mandatory_modifiers(&self) -> ModifierCategories {
        self.mandatory
    }

    pub fn optional_modifiers(&self) -> ModifierCategories {
        self.optional
    }

    /// Test the trigger's modifier shape against the live state.
    ///
    /// Returns `None` when the trigger does not match. On a match, returns the
    /// flags consumed by mandatory categories (possibly empty). With
    /// `mandatory: any`, every pressed flag is returned.
    pub fn test_modifiers<S: ModifierState + ?Sized>(&self, state: &S) -> Option<ModifierFlags> {
        if self.mandatory.contains(ModifierCategory::Any) {
            return Some(ModifierFlag::iter().filter(|f| state.is_pressed(*f)).collect());
        }

        let mut consumed = ModifierFlags::empty();
        for category in self.mandatory.iter() {
            match Self::test_modifier(state, category)? {
                ModifierMatch::Flag(flag) => consumed.insert(flag),
                ModifierMatch::Wildcard => {}
            }
        }

        if !self.optional.contains(ModifierCategory::Any) {
            let covered = self.mandatory.union(self.optional).covered_flags();
            let extra_pressed = ModifierFlag::iter()
                .filter(|flag| !covered.contains(*flag))
                .any(|flag| state.is_pressed(flag));
            if extra_pressed {
                return None;
            }
        }

        Some(consumed)
    }

    /// Test a single category: the first pressed flag of the category, a
    /// wildcard match for `any`, or `None` when none of its flags is pressed.
    pub fn test_modifier<S: ModifierState + ?Sized>(
        state: &S,
        category: ModifierCategory,
    ) -> Option<ModifierMatch> {
        if category == ModifierCategory::Any {
            return Some(ModifierMatch::Wildcard);
        }

        category
            .flags()
            .iter()
            .copied()
            .find(|flag| state.is_pressed(*flag))
            .map(ModifierMatch::Flag)
    }

    /// Whether an input event is this trigger's event (modifiers aside)
    pub fn test_event(&self, event: &Event) -> bool {
        match (&self.kind, event) {
            (EventKind::KeyCode(expected), Event::KeyCode(actual)) => expected == actual,
            (EventKind::ConsumerKeyCode(expected), Event::ConsumerKeyCode(actual)) => {
                expected == actual
            }
            (EventKind::PointingButton(expected), Event::PointingButton(actual)) => {
                expected == actual
            }
            (EventKind::Any(event_type), event) => *event_type == event.event_type(),
            _ => false,
        }
    }
}

impl EventDefinition for FromEventDefinition {
    fn kind(&self) -> &EventKind {
        &self.kind
    }
}

/// From-side keys: `modifiers` and `any`
#[derive(Default)]
struct FromKeys {
    mandatory: ModifierCategories,
    optional: ModifierCategories,
}

impl FromKeys {
    fn handle_modifiers(&mut self, value: &Value, sink: &mut dyn DiagnosticSink) {
        let Some(object) = value.as_object() else {
            sink.report(ParseError::structural("modifiers", value));
            return;
        };

        for (key, v) in object {
            match key.as_str() {
                "mandatory" => self.mandatory = categories_from_json(v, sink),
                "optional" => self.optional = categories_from_json(v, sink),
                _ => sink.report(ParseError::unknown_key(key.as_str(), value)),
            }
        }
    }

    fn handle_any(
        &mut self,
        kind: &mut EventKind,
        value: &Value,
        json: &Value,
        sink: &mut dyn DiagnosticSink,
    ) {
        if !kind_is_free(kind, json, sink) {
            return;
        }
        let Some(name) = value.as_str() else {
            sink.report(ParseError::structural("any", json));
            return;
        };

        match name {
            "key_code" => *kind = EventKind::Any(EventType::KeyCode),
            "consumer_key_code" => *kind = EventKind::Any(EventType::ConsumerKeyCode),
            "pointing_button" => *kind = EventKind::Any(EventType::PointingButton),
            _ => sink.report(ParseError::unknown_value("value of any", name, json)),
        }
    }
}

impl KeyHandler for FromKeys {
    fn handle_key(
        &mut self,
        kind: &mut EventKind,
        key: &str,
        value: &Value,
        json: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        match key {
            "modifiers" => self.handle_modifiers(value, sink),
            "any" => self.handle_any(kind, value, json, sink),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyCode, PointingButton};
    use serde_json::json;

    fn from_def(mandatory: &[ModifierCategory], optional: &[ModifierCategory]) -> FromEventDefinition {
        FromEventDefinition::new(
            EventKind::KeyCode(KeyCode(0x04)),
            mandatory.iter().copied().collect(),
            optional.iter().copied().collect(),
        )
    }

    fn pressed(flags: &[ModifierFlag]) -> ModifierFlags {
        flags.iter().copied().collect()
    }

    #[test]
    fn test_mandatory_any_returns_all_pressed() {
        let definition = from_def(&[ModifierCategory::Any], &[ModifierCategory::Shift]);
        assert_eq!(
            definition.test_modifiers(&pressed(&[])),
            Some(ModifierFlags::empty())
        );

        let state = pressed(&[ModifierFlag::Fn, ModifierFlag::RightOption]);
        assert_eq!(definition.test_modifiers(&state), Some(state));
    }

    #[test]
    fn test_mandatory_command_strict() {
        let definition = from_def(&[ModifierCategory::Command], &[]);

        assert_eq!(
            definition.test_modifiers(&pressed(&[ModifierFlag::RightCommand])),
            Some(pressed(&[ModifierFlag::RightCommand]))
        );
        assert_eq!(definition.test_modifiers(&pressed(&[])), None);
        assert_eq!(
            definition.test_modifiers(&pressed(&[ModifierFlag::LeftCommand, ModifierFlag::LeftShift])),
            None
        );
    }

    #[test]
    fn test_both_sides_held_consumes_first_in_order() {
        let definition = from_def(&[ModifierCategory::Command], &[]);
        let state = pressed(&[ModifierFlag::LeftCommand, ModifierFlag::RightCommand]);
        assert_eq!(
            definition.test_modifiers(&state),
            Some(pressed(&[ModifierFlag::LeftCommand]))
        );
    }

    #[test]
    fn test_optional_any_tolerates_extras() {
        let definition = from_def(&[ModifierCategory::Command], &[ModifierCategory::Any]);
        let state = pressed(&[
            ModifierFlag::RightCommand,
            ModifierFlag::LeftShift,
            ModifierFlag::CapsLock,
        ]);
        assert_eq!(
            definition.test_modifiers(&state),
            Some(pressed(&[ModifierFlag::RightCommand]))
        );
        assert_eq!(definition.test_modifiers(&pressed(&[ModifierFlag::LeftShift])), None);
    }

    #[test]
    fn test_optional_is_not_consumed() {
        let definition = from_def(&[ModifierCategory::Shift], &[ModifierCategory::Control]);
        let state = pressed(&[ModifierFlag::LeftShift, ModifierFlag::LeftControl]);
        assert_eq!(
            definition.test_modifiers(&state),
            Some(pressed(&[ModifierFlag::LeftShift]))
        );
    }

    #[test]
    fn test_uncovered_extra_fails() {
        let definition = from_def(&[ModifierCategory::Shift], &[]);
        let state = pressed(&[ModifierFlag::LeftShift, ModifierFlag::Fn]);
        assert_eq!(definition.test_modifiers(&state), None);
    }

    #[test]
    fn test_side_specific_category_rejects_other_side() {
        let definition = from_def(&[ModifierCategory::LeftShift], &[]);
        assert_eq!(
            definition.test_modifiers(&pressed(&[ModifierFlag::RightShift])),
            None
        );
        assert_eq!(
            definition.test_modifiers(&pressed(&[ModifierFlag::LeftShift])),
            Some(pressed(&[ModifierFlag::LeftShift]))
        );
    }

    #[test]
    fn test_no_modifiers_requires_clean_state() {
        let definition = from_def(&[], &[]);
        assert_eq!(
            definition.test_modifiers(&pressed(&[])),
            Some(ModifierFlags::empty())
        );
        assert_eq!(definition.test_modifiers(&pressed(&[ModifierFlag::CapsLock])), None);
    }

    #[test]
    fn test_multiple_mandatory_categories() {
        let definition = from_def(
            &[ModifierCategory::Control, ModifierCategory::Option],
            &[ModifierCategory::Shift],
        );
        let state = pressed(&[
            ModifierFlag::RightControl,
            ModifierFlag::LeftOption,
            ModifierFlag::RightShift,
        ]);
        assert_eq!(
            definition.test_modifiers(&state),
            Some(pressed(&[ModifierFlag::RightControl, ModifierFlag::LeftOption]))
        );
        assert_eq!(
            definition.test_modifiers(&pressed(&[ModifierFlag::RightControl])),
            None
        );
    }

    #[test]
    fn test_test_modifier() {
        let state = pressed(&[ModifierFlag::RightOption]);
        assert_eq!(
            FromEventDefinition::test_modifier(&state, ModifierCategory::Any),
            Some(ModifierMatch::Wildcard)
        );
        assert_eq!(
            FromEventDefinition::test_modifier(&state, ModifierCategory::Option),
            Some(ModifierMatch::Flag(ModifierFlag::RightOption))
        );
        assert_eq!(
            FromEventDefinition::test_modifier(&state, ModifierCategory::LeftOption),
            None
        );
    }

    #[test]
    fn test_from_json_full() {
        let mut errors = Vec::new();
        let definition = FromEventDefinition::from_json(
            &json!({
                "key_code": "h",
                "modifiers": {"mandatory": ["command"], "optional": ["any"]},
                "description": "hide"
            }),
            &mut errors,
        );
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(definition.key_code(), Some(KeyCode(0x0b)));
        assert_eq!(
            definition.mandatory_modifiers(),
            ModifierCategories::from([ModifierCategory::Command])
        );
        assert_eq!(
            definition.optional_modifiers(),
            ModifierCategories::from([ModifierCategory::Any])
        );
    }

    #[test]
    fn test_from_json_any() {
        let mut errors = Vec::new();
        let definition = FromEventDefinition::from_json(&json!({"any": "pointing_button"}), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(definition.any_type(), Some(EventType::PointingButton));
        assert_eq!(definition.to_event(), None);

        let definition = FromEventDefinition::from_json(&json!({"any": "mouse_key"}), &mut errors);
        assert!(definition.kind().is_none());
        assert!(matches!(
            &errors[..],
            [ParseError::UnknownValue { what, .. }] if what == "value of any"
        ));
    }

    #[test]
    fn test_from_json_any_non_string_leaves_kind_free() {
        let mut errors = Vec::new();
        let definition = FromEventDefinition::from_json(&json!({"any": 1, "key_code": "a"}), &mut errors);
        assert_eq!(definition.kind(), &EventKind::KeyCode(KeyCode(0x04)));
        assert!(matches!(
            &errors[..],
            [ParseError::Structural { what, .. }] if what == "any"
        ));
    }

    #[test]
    fn test_from_json_any_after_key_code_is_duplicate() {
        let mut errors = Vec::new();
        let definition =
            FromEventDefinition::from_json(&json!({"key_code": "a", "any": "key_code"}), &mut errors);
        assert_eq!(definition.key_code(), Some(KeyCode(0x04)));
        assert_eq!(definition.any_type(), None);
        assert!(matches!(&errors[..], [ParseError::DuplicateKind { .. }]));
    }

    #[test]
    fn test_from_json_bad_modifiers() {
        let mut errors = Vec::new();
        let definition = FromEventDefinition::from_json(
            &json!({"key_code": "a", "modifiers": ["shift"]}),
            &mut errors,
        );
        assert!(definition.mandatory_modifiers().is_empty());
        assert_eq!(errors.len(), 1);

        let mut errors = Vec::new();
        let definition = FromEventDefinition::from_json(
            &json!({"key_code": "a", "modifiers": {"mandatory": ["shift"], "required": ["fn"]}}),
            &mut errors,
        );
        assert_eq!(
            definition.mandatory_modifiers(),
            ModifierCategories::from([ModifierCategory::Shift])
        );
        assert!(matches!(
            &errors[..],
            [ParseError::UnknownKey { key, .. }] if key == "required"
        ));
    }

    #[test]
    fn test_from_json_to_side_key_is_unknown() {
        let mut errors = Vec::new();
        let definition =
            FromEventDefinition::from_json(&json!({"key_code": "a", "lazy": true}), &mut errors);
        assert_eq!(definition.key_code(), Some(KeyCode(0x04)));
        assert!(matches!(
            &errors[..],
            [ParseError::UnknownKey { key, .. }] if key == "lazy"
        ));
    }

    #[test]
    fn test_pointing_button_to_event() {
        let mut errors = Vec::new();
        let definition =
            FromEventDefinition::from_json(&json!({"pointing_button": "button1"}), &mut errors);
        assert_eq!(
            definition.to_event(),
            Some(Event::PointingButton(PointingButton(1)))
        );
    }

    #[test]
    fn test_test_event() {
        let definition = from_def(&[], &[]);
        assert!(definition.test_event(&Event::KeyCode(KeyCode(0x04))));
        assert!(!definition.test_event(&Event::KeyCode(KeyCode(0x05))));
        assert!(!definition.test_event(&Event::PointingButton(PointingButton(1))));

        let any_button = FromEventDefinition::new(
            EventKind::Any(EventType::PointingButton),
            ModifierCategories::empty(),
            ModifierCategories::empty(),
        );
        assert!(any_button.test_event(&Event::PointingButton(PointingButton(4))));
        assert!(!any_button.test_event(&Event::KeyCode(KeyCode(0x04))));

        assert!(!FromEventDefinition::default().test_event(&Event::KeyCode(KeyCode(0x04))));
    }
}
