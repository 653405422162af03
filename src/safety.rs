//! Safety filter: neutralise player-teleport commands.
//!
//! A blocked command is never dropped.  It is replaced in place by a
//! placeholder whose text is `# BLOCKED UNSAFE COMMAND: <original>`, so the
//! list keeps its length and order and the original stays auditable.
//! Entries that are already non-executable are left untouched, which makes
//! filtering idempotent.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandKind, PlaceholderReason};

pub const BLOCKED_MARKER: &str = "BLOCKED UNSAFE COMMAND";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SafetyPolicy {
    /// Blocked when the command (leading whitespace trimmed) starts with one
    /// of these.
    pub blocked_prefixes: Vec<String>,
    /// Blocked when the command contains one of these anywhere.
    pub blocked_substrings: Vec<String>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            blocked_prefixes: ["tp @a", "tp @p", "teleport @a", "teleport @p"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocked_substrings: [" tp @a", " teleport @a"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SafetyPolicy {
    /// Nothing is blocked.
    pub fn permissive() -> Self {
        Self {
            blocked_prefixes: Vec::new(),
            blocked_substrings: Vec::new(),
        }
    }

    pub fn is_blocked(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        if trimmed.starts_with('#') {
            return false;
        }
        self.blocked_prefixes
            .iter()
            .any(|p| trimmed.starts_with(p.as_str()))
            || self
                .blocked_substrings
                .iter()
                .any(|s| text.contains(s.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafetyFilter {
    policy: SafetyPolicy,
}

impl SafetyFilter {
    pub fn new(policy: SafetyPolicy) -> Self {
        Self { policy }
    }

    /// Filter a list, preserving length and order.
    pub fn filter(&self, commands: Vec<Command>) -> Vec<Command> {
        commands.into_iter().map(|c| self.filter_one(c)).collect()
    }

    pub fn filter_one(&self, command: Command) -> Command {
        if !command.kind.is_executable() || !self.policy.is_blocked(&command.command) {
            return command;
        }
        debug!("Blocked command at tick {}: {}", command.tick, command.command);
        Command::placeholder(
            command.tick,
            format!("{}: {}", BLOCKED_MARKER, command.command),
            format!("Blocked: {}", command.description),
            PlaceholderReason::Blocked,
        )
    }
}

/// Count of blocked placeholders in a list.
pub fn blocked_count(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|c| c.kind == CommandKind::Placeholder(PlaceholderReason::Blocked))
        .count()
}
