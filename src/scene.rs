//! Scene compiler: one [`Scene`] → one tick-annotated [`CommandSequence`].
//!
//! Emission order (also the tie-break order within a tick):
//!
//! 1. time-of-day and weather at tick 0
//! 2. world modifications, 5 ticks apart from tick 0
//! 3. actors in declaration order, each action expanded in order
//! 4. camera movements, then FOV keyframes
//! 5. effects
//!
//! The result is stable-sorted by tick.  Steps 3 and 4 share the pass's
//! [`EntityRegistry`]: spawns register actors that later dolly `look_at`
//! and `look_at` actions resolve against.
//!
//! ## Action expansion
//!
//! | Action           | Commands                                       |
//! |------------------|------------------------------------------------|
//! | spawn            | summon at declared position (+ NBT), registers |
//! | walk_to / run_to | `tp <selector> <target>`                       |
//! | teleport         | `tp <selector> <position>`                     |
//! | sit              | `data merge entity` (camels use `Pose`)        |
//! | jump             | upward `Motion`                                |
//! | attack / swipe   | attack sound + forward lunge `Motion`          |
//! | interact         | trade sound                                    |
//! | look_at          | `facing <pos>` or `facing entity <selector>`   |
//! | unhandled        | nothing                                        |

use log::{debug, warn};

use crate::camera;
use crate::command::{Command, CommandSequence, PlaceholderReason};
use crate::entity::{self, EntityRegistry, RegistryEntry};
use crate::storyboard::{Action, Actor, Effect, EffectKind, LookTarget, Scene, TimedAction};
use crate::types::{seconds_to_ticks, Coords, SetupSettings, Tick};

/// Spacing between consecutive world modifications.
pub const WORLD_MOD_SPACING: Tick = 5;

/// Substring rules for world modifications, checked in order.
const STRUCTURE_RULES: &[(&str, &str)] = &[
    ("castle", "minecraft:pillager_outpost"),
    ("village", "minecraft:village_plains"),
    ("house", "minecraft:plains_village_shepherds_house_1"),
    ("tower", "minecraft:pillager_outpost"),
];

const PARTICLE_TABLE: &[(&str, &str)] = &[
    ("explosion", "explosion"),
    ("smoke", "smoke"),
    ("fire", "flame"),
    ("magic", "enchant"),
    ("portal", "portal"),
    ("heart", "heart"),
    ("cloud", "cloud"),
    ("dust", "dust 1 0 0 1"),
    ("growth", "happy_villager"),
];

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Structure placement for a world-modification label, or an announcement
/// when no rule matches.
pub fn world_modification_command(label: &str) -> String {
    let lowered = label.to_lowercase();
    match STRUCTURE_RULES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
    {
        Some((_, structure)) => format!(
            "execute at @p run place structure {} ~ ~ ~",
            structure
        ),
        None => format!("say [Agent] World Mod: {}", label),
    }
}

/// World particle for a declared label.  Unknown labels pass through verbatim.
pub fn particle_name(label: &str) -> String {
    let key = label.trim().to_lowercase();
    PARTICLE_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, particle)| particle.to_string())
        .unwrap_or_else(|| label.to_string())
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Compiles scenes against a registry borrowed from the enclosing pass.
pub struct SceneCompiler<'r> {
    registry: &'r mut EntityRegistry,
}

impl<'r> SceneCompiler<'r> {
    pub fn new(registry: &'r mut EntityRegistry) -> Self {
        Self { registry }
    }

    pub fn compile(&mut self, scene: &Scene) -> CommandSequence {
        let mut seq = CommandSequence::new(scene.name.clone());

        seq.push(Command::world(
            0,
            scene.setting.time_of_day.world_command(),
            "Set time of day",
        ));
        seq.push(Command::world(
            0,
            scene.setting.weather.world_command(),
            "Set weather",
        ));

        for (i, label) in scene.setting.world_modifications.iter().enumerate() {
            seq.push(Command::world(
                i as Tick * WORLD_MOD_SPACING,
                world_modification_command(label),
                format!("Build {}", label),
            ));
        }

        for actor in &scene.actors {
            for action in &actor.actions {
                let commands = self.action_commands(actor, action);
                seq.extend(commands);
            }
        }

        seq.extend(camera::compile_camera(&scene.camera, &*self.registry));

        seq.extend(scene.effects.iter().map(effect_command));

        seq.duration_ticks = seconds_to_ticks(scene.duration_seconds);
        seq.sort_by_tick();

        let overflow = seq.overflow_ticks();
        if overflow > 0 {
            warn!(
                "Scene '{}' has commands {} ticks past its declared duration of {} ticks",
                seq.name, overflow, seq.duration_ticks
            );
        }

        debug!(
            "Compiled scene '{}': {} commands over {} ticks",
            seq.name,
            seq.len(),
            seq.duration_ticks
        );
        seq
    }

    fn action_commands(&mut self, actor: &Actor, timed: &TimedAction) -> Vec<Command> {
        let tick = timed.tick;
        let label = actor.label();

        let selector = entity::resolve_selector(&actor.name, actor.declared_type.as_deref());

        match &timed.action {
            Action::Spawn { position } => vec![self.spawn(actor, tick, *position)],

            Action::WalkTo { target } | Action::RunTo { target } => vec![Command::world(
                tick,
                format!("tp {} {}", selector, target),
                format!("{} moves to {}", label, target),
            )],

            Action::Teleport { position } => vec![Command::world(
                tick,
                format!("tp {} {}", selector, position),
                format!("Teleport {}", label),
            )],

            Action::Sit => {
                let is_camel = actor.name.to_lowercase().contains("camel")
                    || actor.type_or_unknown().to_lowercase().contains("camel");
                let data = if is_camel { "{Pose:sitting}" } else { "{Sitting:1b}" };
                vec![Command::world(
                    tick,
                    format!("data merge entity {} {}", selector, data),
                    format!("{} sits", label),
                )]
            }

            Action::Jump => vec![Command::world(
                tick,
                format!(
                    "execute as {} run data merge entity @s {{Motion:[0.0d,0.6d,0.0d]}}",
                    selector
                ),
                format!("{} jumps", label),
            )],

            Action::Attack => vec![
                Command::world(
                    tick,
                    format!(
                        "execute at {} run playsound entity.player.attack.strong master @a ~ ~ ~ 1 1",
                        selector
                    ),
                    format!("{} attacks (sound)", label),
                ),
                Command::world(
                    tick,
                    format!(
                        "execute as {} run data merge entity @s {{Motion:[0.0d,0.2d,0.4d]}}",
                        selector
                    ),
                    format!("{} attacks (motion)", label),
                ),
            ],

            Action::Interact => vec![Command::world(
                tick,
                format!(
                    "execute at {} run playsound entity.villager.trade master @a ~ ~ ~ 1 1",
                    selector
                ),
                format!("{} interacts", label),
            )],

            Action::LookAt { target } => {
                let (clause, shown) = match target {
                    LookTarget::Position(pos) => (format!("facing {}", pos), pos.to_string()),
                    LookTarget::Entity(reference) => (
                        format!(
                            "facing entity {} eyes",
                            self.registry.selector_for_reference(reference)
                        ),
                        reference.clone(),
                    ),
                };
                vec![Command::world(
                    tick,
                    format!("execute as {} at @s run {}", selector, clause),
                    format!("{} looks at {}", label, shown),
                )]
            }

            Action::Unhandled { kind } => {
                debug!(
                    "Skipping unhandled action '{}' for actor '{}' at tick {}",
                    kind, actor.id, tick
                );
                Vec::new()
            }
        }
    }

    fn spawn(&mut self, actor: &Actor, tick: Tick, position: Option<Coords>) -> Command {
        let declared_type = actor.declared_type.as_deref();
        let entity_id = entity::resolve_entity(declared_type, &actor.name);
        let custom = entity::custom_name(declared_type, &actor.name, &entity_id);
        let attributes = entity::spawn_attributes(custom.as_deref(), &entity_id);
        let position = position.unwrap_or_else(Coords::here);

        let mut text = format!("execute at @p run summon {} {}", entity_id, position);
        if !attributes.is_empty() {
            text.push(' ');
            text.push_str(&attributes);
        }

        self.registry.register(
            actor.id.clone(),
            RegistryEntry {
                name: actor.label().to_string(),
                position,
                entity_id,
            },
        );

        Command::world(tick, text, format!("Spawn {}", actor.label()))
    }
}

fn effect_command(effect: &Effect) -> Command {
    match &effect.kind {
        EffectKind::Particles {
            particle,
            position,
            count,
        } => Command::world(
            effect.tick,
            format!(
                "particle {} {} 1 1 1 0 {}",
                particle_name(particle),
                position,
                count
            ),
            format!("{} effect", particle),
        ),
        EffectKind::Other { kind } => Command::placeholder(
            effect.tick,
            format!("Unknown effect '{}'", kind),
            "Placeholder",
            PlaceholderReason::UnknownEffect,
        ),
    }
}

/// Compile a scene on its own, with a fresh registry.
pub fn compile_scene(scene: &Scene) -> CommandSequence {
    let mut registry = EntityRegistry::new();
    SceneCompiler::new(&mut registry).compile(scene)
}

// ---------------------------------------------------------------------------
// World setup
// ---------------------------------------------------------------------------

/// Commands that prepare a world for recording, one tick apart.
pub fn world_setup_commands(setup: &SetupSettings) -> Vec<Command> {
    [
        (format!("gamemode {}", setup.gamemode), "Set game mode"),
        (format!("difficulty {}", setup.difficulty), "Set difficulty"),
        (
            "gamerule doDaylightCycle false".to_string(),
            "Freeze daylight cycle",
        ),
        (
            "gamerule doWeatherCycle false".to_string(),
            "Freeze weather cycle",
        ),
        (
            "gamerule doMobSpawning false".to_string(),
            "Disable natural mob spawning",
        ),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (text, description))| Command::world(i as Tick, text, description))
    .collect()
}
