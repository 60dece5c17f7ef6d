// Keyrules Modifier Vocabulary
// Abstract modifier categories, concrete modifier flags, and the tables between them

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::diagnostics::{DiagnosticSink, ParseError};
use crate::key::{KeyCode, FN_KEY_CODE};

/// A modifier as written in a rule document.
///
/// Categories are abstract: `command` stands for either command key, while
/// `left_command` names one side. `any` is the wildcard category.
///
/// Declaration order is the enumeration order used by matching.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ModifierCategory {
    Any,
    CapsLock,
    Command,
    Control,
    Fn,
    LeftCommand,
    LeftControl,
    LeftOption,
    LeftShift,
    Option,
    RightCommand,
    RightControl,
    RightOption,
    RightShift,
    Shift,
}

/// A concrete physical modifier key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ModifierFlag {
    CapsLock,
    Fn,
    LeftCommand,
    LeftControl,
    LeftOption,
    LeftShift,
    RightCommand,
    RightControl,
    RightOption,
    RightShift,
}

impl ModifierCategory {
    /// Concrete flags this category stands for, in enumeration order
    pub fn flags(self) -> &'static [ModifierFlag] {
        flags_for_category(self)
    }

    /// Name as written in rule documents
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl ModifierFlag {
    /// The side-specific category naming exactly this flag
    pub fn category(self) -> ModifierCategory {
        category_for_flag(self)
    }

    /// Name of the flag (`left_shift`, `fn`, ...)
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Modifier flag produced by a modifier key, if the key is one
    pub fn from_key_code(key_code: KeyCode) -> Option<ModifierFlag> {
        match key_code.code() {
            0x39 => Some(ModifierFlag::CapsLock),
            0xe0 => Some(ModifierFlag::LeftControl),
            0xe1 => Some(ModifierFlag::LeftShift),
            0xe2 => Some(ModifierFlag::LeftOption),
            0xe3 => Some(ModifierFlag::LeftCommand),
            0xe4 => Some(ModifierFlag::RightControl),
            0xe5 => Some(ModifierFlag::RightShift),
            0xe6 => Some(ModifierFlag::RightOption),
            0xe7 => Some(ModifierFlag::RightCommand),
            FN_KEY_CODE => Some(ModifierFlag::Fn),
            _ => None,
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

/// Map a category to its concrete flags.
///
/// `any` maps to nothing, side-specific categories to one flag, and
/// side-agnostic categories to the left/right pair (left first).
pub fn flags_for_category(category: ModifierCategory) -> &'static [ModifierFlag] {
    match category {
        ModifierCategory::Any => &[],
        ModifierCategory::CapsLock => &[ModifierFlag::CapsLock],
        ModifierCategory::Command => &[ModifierFlag::LeftCommand, ModifierFlag::RightCommand],
        ModifierCategory::Control => &[ModifierFlag::LeftControl, ModifierFlag::RightControl],
        ModifierCategory::Fn => &[ModifierFlag::Fn],
        ModifierCategory::LeftCommand => &[ModifierFlag::LeftCommand],
        ModifierCategory::LeftControl => &[ModifierFlag::LeftControl],
        ModifierCategory::LeftOption => &[ModifierFlag::LeftOption],
        ModifierCategory::LeftShift => &[ModifierFlag::LeftShift],
        ModifierCategory::Option => &[ModifierFlag::LeftOption, ModifierFlag::RightOption],
        ModifierCategory::RightCommand => &[ModifierFlag::RightCommand],
        ModifierCategory::RightControl => &[ModifierFlag::RightControl],
        ModifierCategory::RightOption => &[ModifierFlag::RightOption],
        ModifierCategory::RightShift => &[ModifierFlag::RightShift],
        ModifierCategory::Shift => &[ModifierFlag::LeftShift, ModifierFlag::RightShift],
    }
}

/// Inverse of the single-flag mappings in [`flags_for_category`]
pub fn category_for_flag(flag: ModifierFlag) -> ModifierCategory {
    match flag {
        ModifierFlag::CapsLock => ModifierCategory::CapsLock,
        ModifierFlag::Fn => ModifierCategory::Fn,
        ModifierFlag::LeftCommand => ModifierCategory::LeftCommand,
        ModifierFlag::LeftControl => ModifierCategory::LeftControl,
        ModifierFlag::LeftOption => ModifierCategory::LeftOption,
        ModifierFlag::LeftShift => ModifierCategory::LeftShift,
        ModifierFlag::RightCommand => ModifierCategory::RightCommand,
        ModifierFlag::RightControl => ModifierCategory::RightControl,
        ModifierFlag::RightOption => ModifierCategory::RightOption,
        ModifierFlag::RightShift => ModifierCategory::RightShift,
    }
}

/// Live modifier state as seen by the matcher
pub trait ModifierState {
    fn is_pressed(&self, flag: ModifierFlag) -> bool;
}

macro_rules! enum_bitset {
    ($(#[$meta:meta])* $name:ident, $item:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(u16);

        impl $name {
            pub const fn empty() -> Self {
                Self(0)
            }

            pub fn all() -> Self {
                $item::iter().collect()
            }

            pub fn insert(&mut self, item: $item) {
                self.0 |= item.bit();
            }

            pub fn remove(&mut self, item: $item) {
                self.0 &= !item.bit();
            }

            pub fn contains(&self, item: $item) -> bool {
                self.0 & item.bit() != 0
            }

            pub fn is_empty(&self) -> bool {
                self.0 == 0
            }

            pub fn len(&self) -> usize {
                self.0.count_ones() as usize
            }

            pub fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Members in enumeration order
            pub fn iter(self) -> impl Iterator<Item = $item> {
                $item::iter().filter(move |item| self.contains(*item))
            }
        }

        impl FromIterator<$item> for $name {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                let mut set = Self::empty();
                for item in iter {
                    set.insert(item);
                }
                set
            }
        }

        impl<const N: usize> From<[$item; N]> for $name {
            fn from(items: [$item; N]) -> Self {
                items.into_iter().collect()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_set().entries(self.iter()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let names: Vec<&str> = self.iter().map(|item| item.as_str()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.iter())
            }
        }
    };
}

enum_bitset!(
    /// A set of modifier categories
    ModifierCategories,
    ModifierCategory
);

enum_bitset!(
    /// A set of concrete modifier flags.
    ///
    /// Also serves as a modifier state snapshot: a flag is pressed when it is
    /// in the set.
    ModifierFlags,
    ModifierFlag
);

impl ModifierCategories {
    /// Every concrete flag covered by some category in this set
    pub fn covered_flags(self) -> ModifierFlags {
        self.iter()
            .flat_map(|category| category.flags().iter().copied())
            .collect()
    }
}

impl ModifierState for ModifierFlags {
    fn is_pressed(&self, flag: ModifierFlag) -> bool {
        self.contains(flag)
    }
}

/// Parse a list of modifier names into a category set.
///
/// Non-string entries and unknown names are reported and skipped. A bare
/// string is read as a one-element list.
pub fn categories_from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> ModifierCategories {
    let mut categories = ModifierCategories::empty();

    let entries: &[Value] = match json {
        Value::Array(entries) => entries,
        Value::String(_) => std::slice::from_ref(json),
        _ => {
            sink.report(ParseError::structural("modifiers", json));
            return categories;
        }
    };

    for entry in entries {
        match entry {
            Value::String(name) => match name.parse::<ModifierCategory>() {
                Ok(category) => categories.insert(category),
                Err(_) => sink.report(ParseError::unknown_value("modifier", name.as_str(), json)),
            },
            _ => sink.report(ParseError::structural("modifier (should be string)", entry)),
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::EnumCount;

    #[test]
    fn test_category_names() {
        assert_eq!(ModifierCategory::Fn.to_string(), "fn");
        assert_eq!(ModifierCategory::LeftCommand.as_str(), "left_command");
        assert_eq!(
            "caps_lock".parse::<ModifierCategory>(),
            Ok(ModifierCategory::CapsLock)
        );
        assert!("Command".parse::<ModifierCategory>().is_err());
        assert_eq!(ModifierCategory::COUNT, 15);
        assert_eq!(ModifierFlag::COUNT, 10);
    }

    #[test]
    fn test_flags_for_category_shapes() {
        assert!(flags_for_category(ModifierCategory::Any).is_empty());
        assert_eq!(
            flags_for_category(ModifierCategory::Shift),
            &[ModifierFlag::LeftShift, ModifierFlag::RightShift]
        );
        assert_eq!(
            flags_for_category(ModifierCategory::RightOption),
            &[ModifierFlag::RightOption]
        );
    }

    #[test]
    fn test_flag_category_round_trip() {
        for category in ModifierCategory::iter() {
            for &flag in flags_for_category(category) {
                let recovered = category_for_flag(flag);
                assert!(flags_for_category(recovered).contains(&flag));
            }
        }
        for flag in ModifierFlag::iter() {
            assert_eq!(flags_for_category(flag.category()), &[flag]);
        }
    }

    #[test]
    fn test_from_key_code() {
        assert_eq!(
            ModifierFlag::from_key_code(KeyCode(0xe1)),
            Some(ModifierFlag::LeftShift)
        );
        assert_eq!(
            ModifierFlag::from_key_code(KeyCode(FN_KEY_CODE)),
            Some(ModifierFlag::Fn)
        );
        assert_eq!(ModifierFlag::from_key_code(KeyCode(0x04)), None);
    }

    #[test]
    fn test_bitset_operations() {
        let mut flags = ModifierFlags::empty();
        assert!(flags.is_empty());
        flags.insert(ModifierFlag::RightShift);
        flags.insert(ModifierFlag::CapsLock);
        flags.insert(ModifierFlag::CapsLock);
        assert_eq!(flags.len(), 2);
        assert!(flags.is_pressed(ModifierFlag::RightShift));
        assert!(!flags.is_pressed(ModifierFlag::LeftShift));

        let ordered: Vec<_> = flags.iter().collect();
        assert_eq!(ordered, vec![ModifierFlag::CapsLock, ModifierFlag::RightShift]);

        flags.remove(ModifierFlag::CapsLock);
        assert_eq!(flags, ModifierFlags::from([ModifierFlag::RightShift]));
        assert_eq!(ModifierFlags::all().len(), ModifierFlag::COUNT);
    }

    #[test]
    fn test_covered_flags() {
        let categories = ModifierCategories::from([
            ModifierCategory::Command,
            ModifierCategory::LeftShift,
            ModifierCategory::Any,
        ]);
        assert_eq!(
            categories.covered_flags(),
            ModifierFlags::from([
                ModifierFlag::LeftCommand,
                ModifierFlag::RightCommand,
                ModifierFlag::LeftShift,
            ])
        );
    }

    #[test]
    fn test_display_and_serialize() {
        let categories = ModifierCategories::from([ModifierCategory::Shift, ModifierCategory::Command]);
        assert_eq!(categories.to_string(), "[command, shift]");
        assert_eq!(
            serde_json::to_value(categories).unwrap(),
            json!(["command", "shift"])
        );
    }

    #[test]
    fn test_categories_from_json() {
        let mut errors = Vec::new();
        let categories = categories_from_json(&json!(["command", "left_shift", "any"]), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(
            categories,
            ModifierCategories::from([
                ModifierCategory::Command,
                ModifierCategory::LeftShift,
                ModifierCategory::Any,
            ])
        );
    }

    #[test]
    fn test_categories_from_json_skips_bad_entries() {
        let mut errors = Vec::new();
        let categories = categories_from_json(&json!(["shift", 3, "hyper", "fn"]), &mut errors);
        assert_eq!(
            categories,
            ModifierCategories::from([ModifierCategory::Shift, ModifierCategory::Fn])
        );
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ParseError::Structural { .. }));
        assert!(matches!(
            &errors[1],
            ParseError::UnknownValue { value, .. } if value == "hyper"
        ));
    }

    #[test]
    fn test_categories_from_json_single_string_and_bad_shape() {
        let mut errors = Vec::new();
        let categories = categories_from_json(&json!("control"), &mut errors);
        assert_eq!(categories, ModifierCategories::from([ModifierCategory::Control]));
        assert!(errors.is_empty());

        let categories = categories_from_json(&json!({"mandatory": []}), &mut errors);
        assert!(categories.is_empty());
        assert_eq!(errors.len(), 1);
    }
}
