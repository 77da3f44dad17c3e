//! # Help Text
//!
//! Catalog of configured rules, returned for the `help` and `all` messages.

use crate::domain::rules::RuleSet;

pub const NO_COMMANDS: &str = "No commands defined.";

fn dir_suffix(dir: &str) -> String {
    if dir.is_empty() {
        String::new()
    } else {
        format!(" [{dir}]")
    }
}

/// Renders every shortcut, prefix command and template, grouped by category.
pub fn catalog(rules: &RuleSet) -> String {
    if rules.is_empty() {
        return NO_COMMANDS.to_string();
    }

    let mut sections = Vec::new();

    if !rules.shortcuts.is_empty() {
        let mut s = String::from("Shortcuts:");
        for rule in &rules.shortcuts {
            s.push_str(&format!("\n  {} => {}{}", rule.name, rule.command, dir_suffix(&rule.working_dir)));
        }
        sections.push(s);
    }

    if !rules.commands.is_empty() {
        let mut s = String::from("Commands:");
        for rule in &rules.commands {
            s.push_str(&format!("\n  {}...{}", rule.prefix, dir_suffix(&rule.working_dir)));
        }
        sections.push(s);
    }

    if !rules.templates.is_empty() {
        let mut s = String::from("Templates:");
        for rule in &rules.templates {
            s.push_str(&format!("\n  {} => {}{}", rule.name, rule.format, dir_suffix(&rule.working_dir)));
        }
        sections.push(s);
    }

    sections.join("\n")
}
