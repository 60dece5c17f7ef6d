// Keyrules CLI
// Validate complex-modification rule files and try triggers against held modifiers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use keyrules_core::{
    EventDefinition, LoggingCollector, ModifierFlag, ModifierFlags, ParseError, RuleSet,
};

/// Complex-modification rule checker
#[derive(Parser, Debug)]
#[command(name = "keyrules")]
#[command(version)]
#[command(about = "Validate complex-modification rules and test their triggers", long_about = None)]
struct Args {
    /// Rule file (defaults to <config_dir>/keyrules/complex_modifications.json)
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Held modifier flags to test every trigger against, e.g. left_shift,right_command
    #[arg(short, long, value_name = "FLAGS", value_delimiter = ',')]
    modifiers: Option<Vec<ModifierFlag>>,

    /// Exit with status 1 when the rule file has diagnostics
    #[arg(long)]
    check: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// One manipulator whose trigger accepted the held modifiers
#[derive(Debug, Serialize)]
struct TriggerMatch {
    rule: usize,
    manipulator: usize,
    description: Option<String>,
    consumed: ModifierFlags,
}

#[derive(Debug, Serialize)]
struct Report {
    path: PathBuf,
    title: Option<String>,
    rules: usize,
    manipulators: usize,
    errors: Vec<ParseError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    held: Option<ModifierFlags>,
    matches: Vec<TriggerMatch>,
}

impl Report {
    fn build(path: PathBuf, rule_set: &RuleSet, errors: Vec<ParseError>, held: Option<ModifierFlags>) -> Self {
        let mut matches = Vec::new();
        if let Some(held) = held {
            for (rule_index, rule) in rule_set.rules().iter().enumerate() {
                for (index, manipulator) in rule.manipulators().iter().enumerate() {
                    // A trigger without an event never fires
                    if manipulator.from().kind().is_none() {
                        continue;
                    }
                    if let Some(consumed) = manipulator.from().test_modifiers(&held) {
                        matches.push(TriggerMatch {
                            rule: rule_index,
                            manipulator: index,
                            description: manipulator
                                .description()
                                .or(rule.description())
                                .map(str::to_string),
                            consumed,
                        });
                    }
                }
            }
        }

        Self {
            path,
            title: rule_set.title().map(str::to_string),
            rules: rule_set.rules().len(),
            manipulators: rule_set.manipulators().count(),
            errors,
            held,
            matches,
        }
    }

    fn print_text(&self, rule_set: &RuleSet) {
        println!(
            "{}: {} ({} rules, {} manipulators)",
            self.path.display(),
            self.title.as_deref().unwrap_or("<untitled>"),
            self.rules,
            self.manipulators
        );

        for error in &self.errors {
            println!("  error: {}", error);
        }

        let Some(held) = self.held else {
            return;
        };
        println!("held modifiers: {}", held);
        for found in &self.matches {
            let manipulator = &rule_set.rules()[found.rule].manipulators()[found.manipulator];
            let trigger = manipulator
                .from()
                .to_event()
                .map(|event| event.to_string())
                .unwrap_or_else(|| format!("{:?}", manipulator.from().kind()));
            println!(
                "  match rule {} manipulator {} ({}): {} consumes {}",
                found.rule,
                found.manipulator,
                found.description.as_deref().unwrap_or("-"),
                trigger,
                found.consumed
            );
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let path = match args.rules.clone() {
        Some(path) => path,
        None => match RuleSet::default_path() {
            Some(path) => path,
            None => bail!("no config directory found; pass --rules"),
        },
    };

    let mut collector = LoggingCollector::new();
    let rule_set = RuleSet::from_path(&path, &mut collector)
        .with_context(|| format!("failed to load rules from {}", path.display()))?;

    let held = args
        .modifiers
        .as_ref()
        .map(|flags| flags.iter().copied().collect::<ModifierFlags>());
    let report = Report::build(path, &rule_set, collector.into_errors(), held);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text(&rule_set);
    }

    if args.check && !report.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["keyrules", "--rules", "/tmp/rules.json"]);

        assert_eq!(args.rules, Some(PathBuf::from("/tmp/rules.json")));
        assert!(args.modifiers.is_none());
        assert!(!args.check);
        assert!(!args.json);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_modifier_list() {
        let args = Args::parse_from(["keyrules", "--modifiers", "left_shift,right_command", "--check"]);

        assert_eq!(
            args.modifiers,
            Some(vec![ModifierFlag::LeftShift, ModifierFlag::RightCommand])
        );
        assert!(args.check);
    }

    #[test]
    fn test_args_reject_unknown_modifier() {
        assert!(Args::try_parse_from(["keyrules", "--modifiers", "hyper"]).is_err());
    }

    #[test]
    fn test_report_matches() {
        let mut errors = Vec::new();
        let rule_set = RuleSet::from_json_str(
            r#"{
                "title": "test",
                "rules": [{
                    "description": "shift+a",
                    "manipulators": [
                        {"type": "basic", "from": {"key_code": "a", "modifiers": {"mandatory": ["shift"]}}, "to": {"key_code": "b"}},
                        {"type": "basic", "from": {"key_code": "a"}, "to": {"key_code": "c"}}
                    ]
                }]
            }"#,
            &mut errors,
        )
        .unwrap();

        let held = ModifierFlags::from([ModifierFlag::LeftShift]);
        let report = Report::build(PathBuf::from("rules.json"), &rule_set, errors, Some(held));
        assert_eq!(report.manipulators, 2);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].manipulator, 0);
        assert_eq!(report.matches[0].description.as_deref(), Some("shift+a"));
        assert_eq!(report.matches[0].consumed, held);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["matches"][0]["consumed"][0], "left_shift");
    }

    #[test]
    fn test_report_skips_trigger_without_event() {
        let mut errors = Vec::new();
        let rule_set = RuleSet::from_json_str(
            r#"{
                "rules": [{
                    "manipulators": [
                        {"type": "basic", "from": {"key_code": "no_such_key"}, "to": {"key_code": "b"}}
                    ]
                }]
            }"#,
            &mut errors,
        )
        .unwrap();
        assert_eq!(errors.len(), 1);

        let report = Report::build(PathBuf::from("rules.json"), &rule_set, errors, Some(ModifierFlags::empty()));
        assert_eq!(report.manipulators, 1);
        assert!(report.matches.is_empty());
    }
}
