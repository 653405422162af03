//! Script assembler: a whole [`Storyboard`] → one global timeline.
//!
//! Scenes are laid end to end using their *advertised* durations.  Scene `k`
//! starts at the sum of the durations of scenes `0..k`, and every command in
//! it is shifted by that offset.  A scene whose commands run past its
//! declared duration is neither truncated nor extended, so its tail can
//! overlap the next scene's start.  Offsets saturate at `u64::MAX`.
//!
//! One [`EntityRegistry`] is created per [`ScriptAssembler::assemble`] call
//! and dropped at its end, so a new project never sees a stale registry.

use log::info;
use serde::Serialize;

use crate::command::Command;
use crate::entity::EntityRegistry;
use crate::error::CompileResult;
use crate::safety::{self, SafetyFilter, SafetyPolicy};
use crate::scene::SceneCompiler;
use crate::storyboard::Storyboard;
use crate::types::{Tick, TICKS_PER_SECOND};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One scene placed on the global timeline.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScriptScene {
    pub name: String,
    pub start_tick: Tick,
    pub duration_ticks: Tick,
    /// Absolute ticks, sorted, safety-filtered.
    pub commands: Vec<Command>,
}

impl ScriptScene {
    /// Tick at which the next scene starts.
    pub fn end_tick(&self) -> Tick {
        self.start_tick.saturating_add(self.duration_ticks)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Script {
    pub title: String,
    pub total_duration_ticks: Tick,
    pub total_duration_seconds: f64,
    pub scenes: Vec<ScriptScene>,
}

impl Script {
    /// Every command of every scene, stable-sorted by absolute tick.
    ///
    /// Scene order breaks ties, so an overflowing scene's tail stays ahead of
    /// the next scene's commands at the same tick.
    pub fn timeline(&self) -> Vec<Command> {
        let mut all: Vec<Command> = self
            .scenes
            .iter()
            .flat_map(|s| s.commands.iter().cloned())
            .collect();
        all.sort_by_key(|c| c.tick);
        all
    }

    pub fn command_count(&self) -> usize {
        self.scenes.iter().map(|s| s.commands.len()).sum()
    }

    pub fn executable_count(&self) -> usize {
        self.scenes
            .iter()
            .flat_map(|s| &s.commands)
            .filter(|c| c.is_executable())
            .count()
    }

    pub fn blocked_count(&self) -> usize {
        self.scenes
            .iter()
            .map(|s| safety::blocked_count(&s.commands))
            .sum()
    }

    /// MD5 over the flattened timeline (`tick`, tab, text, newline per
    /// command).  Equal fingerprints mean identical timelines.
    pub fn fingerprint(&self) -> String {
        let mut text = String::new();
        for command in self.timeline() {
            text.push_str(&format!("{}\t{}\n", command.tick, command.command));
        }
        format!("{:x}", md5::compute(text.as_bytes()))
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ScriptAssembler {
    filter: SafetyFilter,
}

impl ScriptAssembler {
    pub fn new(policy: SafetyPolicy) -> Self {
        Self {
            filter: SafetyFilter::new(policy),
        }
    }

    pub fn assemble(&self, storyboard: &Storyboard) -> Script {
        let mut registry = EntityRegistry::new();
        let mut compiler = SceneCompiler::new(&mut registry);

        let mut offset: Tick = 0;
        let mut scenes = Vec::with_capacity(storyboard.scenes.len());

        for scene in &storyboard.scenes {
            let seq = compiler.compile(scene);
            let start_tick = offset;

            let shifted: Vec<Command> = seq
                .commands
                .into_iter()
                .map(|mut c| {
                    c.tick = c.tick.saturating_add(start_tick);
                    c
                })
                .collect();

            scenes.push(ScriptScene {
                name: seq.name,
                start_tick,
                duration_ticks: seq.duration_ticks,
                commands: self.filter.filter(shifted),
            });

            offset = offset.saturating_add(seq.duration_ticks);
        }

        let script = Script {
            title: storyboard.title.clone(),
            total_duration_ticks: offset,
            total_duration_seconds: offset as f64 / TICKS_PER_SECOND as f64,
            scenes,
        };

        info!(
            "Assembled '{}': {} scenes, {} commands ({} blocked), {} ticks",
            script.title,
            script.scenes.len(),
            script.command_count(),
            script.blocked_count(),
            script.total_duration_ticks
        );
        script
    }
}

/// Assemble with the default safety policy.
pub fn assemble(storyboard: &Storyboard) -> Script {
    ScriptAssembler::default().assemble(storyboard)
}

/// Parse and assemble a storyboard document in one step.
pub fn compile_storyboard(json: &str) -> CompileResult<Script> {
    let storyboard = Storyboard::from_json(json)?;
    Ok(assemble(&storyboard))
}
