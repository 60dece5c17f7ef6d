// Keyrules Mouse Key Parameters
// Cursor motion and wheel amounts emitted by a `mouse_key` output

use std::fmt;

use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, ParseError};

/// Parameters of a `mouse_key` output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseKey {
    pub x: i32,
    pub y: i32,
    pub vertical_wheel: i32,
    pub horizontal_wheel: i32,
    pub speed_multiplier: f64,
}

impl Default for MouseKey {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            vertical_wheel: 0,
            horizontal_wheel: 0,
            speed_multiplier: 1.0,
        }
    }
}

impl MouseKey {
    /// Read mouse key parameters from a `mouse_key` object.
    ///
    /// Fields with the wrong type are reported and left at their defaults.
    pub fn from_json(json: &Value, sink: &mut dyn DiagnosticSink) -> Self {
        let mut mouse_key = MouseKey::default();

        let Some(object) = json.as_object() else {
            sink.report(ParseError::structural("mouse_key", json));
            return mouse_key;
        };

        for (key, value) in object {
            let target = match key.as_str() {
                "x" => &mut mouse_key.x,
                "y" => &mut mouse_key.y,
                "vertical_wheel" => &mut mouse_key.vertical_wheel,
                "horizontal_wheel" => &mut mouse_key.horizontal_wheel,
                "speed_multiplier" => {
                    match value.as_f64() {
                        Some(multiplier) => mouse_key.speed_multiplier = multiplier,
                        None => sink.report(ParseError::structural("mouse_key.speed_multiplier", json)),
                    }
                    continue;
                }
                _ => {
                    sink.report(ParseError::unknown_key(key.as_str(), json));
                    continue;
                }
            };

            match value.as_i64().and_then(|v| i32::try_from(v).ok()) {
                Some(amount) => *target = amount,
                None => sink.report(ParseError::structural(format!("mouse_key.{}", key), json)),
            }
        }

        mouse_key
    }

    /// True when the parameters move nothing
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0 && self.vertical_wheel == 0 && self.horizontal_wheel == 0
    }
}

impl fmt::Display for MouseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x:{} y:{} vertical_wheel:{} horizontal_wheel:{} speed_multiplier:{}",
            self.x, self.y, self.vertical_wheel, self.horizontal_wheel, self.speed_multiplier
        )
    }
}
