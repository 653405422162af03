//! Storyboard Compiler
//!
//! Compiles a loosely-typed storyboard document (scenes, actors, camera
//! movements, effects) into a flat, tick-ordered timeline of world commands,
//! and optionally paces that timeline against a command transport.
//!
//! ## Architecture
//!
//! ```text
//! Storyboard  (storyboard.rs)                 ← lenient JSON → typed model
//!   └── ScriptAssembler  (script.rs)          ← scene offsets, one registry per pass
//!         ├── SceneCompiler  (scene.rs)       ← per-scene command sequence
//!         │     ├── entity.rs                 ← entity ids, selectors, registry
//!         │     └── camera.rs                 ← keyframe interpolation
//!         └── SafetyFilter  (safety.rs)       ← teleport denylist
//! Script ──► export.rs                        ← text / function files / datapack
//!        └─► Scheduler  (scheduler.rs)        ← paced submission to a Transport
//! ```
//!
//! Everything above the scheduler is synchronous and pure.  The scheduler and
//! the CLI need the `runtime` feature.

// Compiler modules are always available.
pub mod camera;
pub mod command;
pub mod entity;
pub mod error;
pub mod export;
pub mod safety;
pub mod scene;
pub mod script;
pub mod storyboard;
pub mod types;

// Async execution requires the `runtime` feature.
#[cfg(feature = "runtime")]
pub mod scheduler;

pub use command::{Command, CommandKind, CommandSequence, PlaceholderReason};
pub use entity::{ActorLookup, EntityRegistry, RegistryEntry};
pub use error::{CompileError, CompileResult, TransportError};
pub use safety::{SafetyFilter, SafetyPolicy};
pub use scene::{compile_scene, world_setup_commands, SceneCompiler};
pub use script::{assemble, compile_storyboard, Script, ScriptAssembler, ScriptScene};
pub use storyboard::Storyboard;
pub use types::{CompilerSettings, Coords, Tick, Vec3, TICKS_PER_SECOND};

#[cfg(feature = "runtime")]
pub use scheduler::{
    CommandResult, DryRunTransport, RunOptions, RunReport, RunSummary, Scheduler, Transport,
};
