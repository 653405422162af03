//! Compiled command records.
//!
//! A [`Command`] is one opaque line of world text stamped with a tick.  The
//! compiler never interprets the text after building it; only the safety
//! filter pattern-matches on it.
//!
//! ## Kinds
//!
//! | Kind                  | Executable | Produced by                              |
//! |-----------------------|------------|------------------------------------------|
//! | `world`               | yes        | setting, world mods, actors, effects     |
//! | `camera`              | yes        | static / orbit / dolly keyframes         |
//! | `placeholder`         | no         | follow, FOV, path, unknown effect, block |
//!
//! Placeholder text always starts with `#` so line-oriented consumers can
//! tell it apart without the kind tag.

use serde::{Deserialize, Serialize};

use crate::types::Tick;

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// Why a placeholder was emitted instead of an executable command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    /// Follow camera, expanded by a downstream camera system.
    FollowCamera,
    /// Field-of-view keyframe, no native world command exists.
    FieldOfView,
    /// Spline camera path, not expanded by this compiler.
    CameraPath,
    /// Effect kind other than particles.
    UnknownEffect,
    /// Neutralised by the safety filter; the original text is retained.
    Blocked,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "reason", rename_all = "snake_case")]
pub enum CommandKind {
    World,
    Camera,
    Placeholder(PlaceholderReason),
}

impl CommandKind {
    pub fn is_executable(self) -> bool {
        !matches!(self, CommandKind::Placeholder(_))
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub tick: Tick,
    pub command: String,
    pub description: String,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(
        tick: Tick,
        command: impl Into<String>,
        description: impl Into<String>,
        kind: CommandKind,
    ) -> Self {
        Self {
            tick,
            command: command.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn world(tick: Tick, command: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(tick, command, description, CommandKind::World)
    }

    pub fn camera(tick: Tick, command: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(tick, command, description, CommandKind::Camera)
    }

    /// Non-executable entry.  `note` is prefixed with `# ` unless it already
    /// starts with `#`.
    pub fn placeholder(
        tick: Tick,
        note: impl Into<String>,
        description: impl Into<String>,
        reason: PlaceholderReason,
    ) -> Self {
        let note = note.into();
        let text = if note.starts_with('#') {
            note
        } else {
            format!("# {}", note)
        };
        Self::new(tick, text, description, CommandKind::Placeholder(reason))
    }

    /// Executable kind and not comment text.
    pub fn is_executable(&self) -> bool {
        self.kind.is_executable() && !self.command.trim_start().starts_with('#')
    }
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// Compiled output of one scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandSequence {
    pub name: String,
    pub commands: Vec<Command>,
    /// Advertised duration (declared seconds × tick rate).  Independent of
    /// the highest command tick.
    pub duration_ticks: Tick,
}

impl CommandSequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            duration_ticks: 0,
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.extend(commands);
    }

    /// Stable sort by tick; equal ticks keep insertion order.
    pub fn sort_by_tick(&mut self) {
        self.commands.sort_by_key(|c| c.tick);
    }

    pub fn max_command_tick(&self) -> Option<Tick> {
        self.commands.iter().map(|c| c.tick).max()
    }

    /// Ticks by which the last command runs past the advertised duration.
    pub fn overflow_ticks(&self) -> Tick {
        self.max_command_tick()
            .map(|t| t.saturating_sub(self.duration_ticks))
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
