// Keyrules Config API
// Loading complex-modification rule files

pub mod rules;

pub use rules::{Manipulator, Rule, RuleLoadError, RuleSet};
