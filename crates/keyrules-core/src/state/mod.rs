// Keyrules Live State
// Pressed-modifier tracking and the atomically swapped rule set

mod modifier_flag_manager;
mod rule_store;

pub use modifier_flag_manager::ModifierFlagManager;
pub use rule_store::RuleStore;
