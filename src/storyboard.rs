//! Storyboard data model and lenient decoding.
//!
//! Storyboards come from a text generator and are routinely incomplete or
//! mistyped.  Decoding therefore never fails below the top level: every
//! missing or malformed field resolves to the default listed here.
//!
//! | Field                        | Default                  |
//! |------------------------------|--------------------------|
//! | `title`                      | `Untitled`               |
//! | `scene.name`                 | `unnamed_scene`          |
//! | `scene.duration_seconds`     | `30`                     |
//! | `setting.time_of_day`        | `day`                    |
//! | `setting.weather`            | `clear`                  |
//! | `action.tick`                | `0`                      |
//! | `action.type`                | `idle` (unhandled)       |
//! | `walk_to.target_position`    | `0 64 0`                 |
//! | `movement.tick_start / end`  | `0` / `100`              |
//! | `effect.particle_type`       | `cloud`                  |
//! | non-numeric coordinate       | `0`                      |

use serde::Serialize;
use serde_json::Value;

use crate::error::{CompileError, CompileResult};
use crate::types::{Coords, Tick, Vec3};

// ---------------------------------------------------------------------------
// Lenient field access
// ---------------------------------------------------------------------------

mod lenient {
    use super::*;

    pub fn string(v: &Value, key: &str) -> Option<String> {
        match v.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn number(v: &Value, key: &str) -> Option<f64> {
        match v.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|f| f.is_finite())
    }

    /// Ticks are non-negative integers; fractions truncate, negatives clamp.
    pub fn tick(v: &Value, key: &str) -> Option<Tick> {
        number(v, key).map(|f| if f <= 0.0 { 0 } else { f.floor() as Tick })
    }

    pub fn list<'a>(v: &'a Value, key: &str) -> &'a [Value] {
        v.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn strings(v: &Value, key: &str) -> Vec<String> {
        list(v, key)
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn coords(v: &Value, key: &str) -> Option<Coords> {
        v.get(key).and_then(Coords::from_value)
    }

    pub fn vec3(v: &Value, key: &str, default: Vec3) -> Vec3 {
        coords(v, key).map(Coords::to_vec3).unwrap_or(default)
    }

    pub fn type_name(v: &Value) -> &'static str {
        match v {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace([' ', '-'], "_")
}

// ---------------------------------------------------------------------------
// Storyboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Storyboard {
    pub title: String,
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    pub const UNTITLED: &'static str = "Untitled";

    /// Parse JSON text.  Fails only for invalid JSON or a non-object top level.
    pub fn from_json(text: &str) -> CompileResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> CompileResult<Self> {
        if !value.is_object() {
            return Err(CompileError::NotAMapping {
                found: lenient::type_name(value),
            });
        }

        let title = lenient::string(value, "title")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| Self::UNTITLED.to_string());

        let scenes = lenient::list(value, "scenes")
            .iter()
            .map(Scene::from_value)
            .collect();

        Ok(Self { title, scenes })
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration_seconds).sum()
    }

    /// Multi-line human-readable overview.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Title: {}", self.title),
            format!("Total duration: {}s", self.total_duration_seconds()),
            format!("Scenes: {}", self.scenes.len()),
            String::new(),
        ];

        for (i, scene) in self.scenes.iter().enumerate() {
            lines.push(format!("Scene {}: {}", i + 1, scene.name));
            lines.push(format!(
                "  Location: {}",
                scene.setting.location.as_deref().unwrap_or("Unknown location")
            ));
            lines.push(format!(
                "  Duration: {}s{}",
                scene.duration_seconds,
                scene
                    .time_period
                    .as_deref()
                    .map(|p| format!(" - {}", p))
                    .unwrap_or_default()
            ));
            lines.push(format!("  Actors: {}", scene.actors.len()));
            lines.push(format!(
                "  Camera movements: {}",
                scene.camera.movements.len()
            ));
            lines.push(format!("  Effects: {}", scene.effects.len()));
        }

        lines.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Scene {
    pub name: String,
    pub time_period: Option<String>,
    pub duration_seconds: f64,
    pub setting: Setting,
    pub actors: Vec<Actor>,
    pub camera: Camera,
    pub effects: Vec<Effect>,
}

impl Scene {
    pub const DEFAULT_NAME: &'static str = "unnamed_scene";
    pub const DEFAULT_DURATION_SECONDS: f64 = 30.0;

    pub fn from_value(v: &Value) -> Self {
        let name = lenient::string(v, "name")
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_NAME.to_string());

        let duration_seconds = lenient::number(v, "duration_seconds")
            .unwrap_or(Self::DEFAULT_DURATION_SECONDS)
            .max(0.0);

        let actors = lenient::list(v, "actors")
            .iter()
            .enumerate()
            .map(|(i, a)| Actor::from_value(a, i))
            .collect();

        let effects = lenient::list(v, "effects")
            .iter()
            .map(Effect::from_value)
            .collect();

        Self {
            name,
            time_period: lenient::string(v, "time_period"),
            duration_seconds,
            setting: v.get("setting").map(Setting::from_value).unwrap_or_default(),
            actors,
            camera: v.get("camera").map(Camera::from_value).unwrap_or_default(),
            effects,
        }
    }
}

// ---------------------------------------------------------------------------
// Setting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    #[default]
    Day,
    Noon,
    Sunset,
    Night,
    Midnight,
    Sunrise,
}

impl TimeOfDay {
    /// Unrecognised labels fall back to [`TimeOfDay::Day`].
    pub fn from_label(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "noon" => Self::Noon,
            "sunset" => Self::Sunset,
            "night" => Self::Night,
            "midnight" => Self::Midnight,
            "sunrise" => Self::Sunrise,
            _ => Self::Day,
        }
    }

    pub fn world_command(self) -> &'static str {
        match self {
            Self::Day => "time set day",
            Self::Noon => "time set noon",
            Self::Sunset => "time set 12000",
            Self::Night => "time set night",
            Self::Midnight => "time set midnight",
            Self::Sunrise => "time set 23000",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Thunder,
}

impl Weather {
    /// `storm` is an alias for thunder; unrecognised labels are clear.
    pub fn from_label(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "rain" => Self::Rain,
            "thunder" | "storm" => Self::Thunder,
            _ => Self::Clear,
        }
    }

    pub fn world_command(self) -> &'static str {
        match self {
            Self::Clear => "weather clear",
            Self::Rain => "weather rain",
            Self::Thunder => "weather thunder",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Setting {
    pub location: Option<String>,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    pub world_modifications: Vec<String>,
}

impl Setting {
    pub fn from_value(v: &Value) -> Self {
        Self {
            location: lenient::string(v, "location"),
            time_of_day: lenient::string(v, "time_of_day")
                .map(|l| TimeOfDay::from_label(&l))
                .unwrap_or_default(),
            weather: lenient::string(v, "weather")
                .map(|l| Weather::from_label(&l))
                .unwrap_or_default(),
            world_modifications: lenient::strings(v, "world_modifications"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actors & actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Actor {
    /// Unique within the scene; the only key into the entity registry.
    pub id: String,
    pub name: String,
    /// `None` when absent; the sentinel `unknown` is kept verbatim.
    pub declared_type: Option<String>,
    pub actions: Vec<TimedAction>,
}

impl Actor {
    pub fn from_value(v: &Value, index: usize) -> Self {
        let id = lenient::string(v, "id")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("actor_{:03}", index + 1));
        Self {
            name: lenient::string(v, "name").unwrap_or_default(),
            declared_type: lenient::string(v, "type").filter(|s| !s.trim().is_empty()),
            actions: lenient::list(v, "actions")
                .iter()
                .map(TimedAction::from_value)
                .collect(),
            id,
        }
    }

    /// Display name, or the id when the name is blank.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn type_or_unknown(&self) -> &str {
        self.declared_type.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimedAction {
    pub tick: Tick,
    pub action: Action,
}

impl TimedAction {
    pub fn from_value(v: &Value) -> Self {
        Self {
            tick: lenient::tick(v, "tick").unwrap_or(0),
            action: Action::from_value(v),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum LookTarget {
    Position(Coords),
    Entity(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// `None` spawns at the executing position.
    Spawn { position: Option<Coords> },
    WalkTo { target: Coords },
    RunTo { target: Coords },
    Teleport { position: Coords },
    Sit,
    Jump,
    /// `attack` and `swipe`.
    Attack,
    Interact,
    LookAt { target: LookTarget },
    /// Any kind this compiler does not expand (`morph`, `emote`, `idle`…).
    Unhandled { kind: String },
}

impl Action {
    fn default_position() -> Coords {
        Coords::absolute(0.0, 64.0, 0.0)
    }

    pub fn from_value(v: &Value) -> Self {
        let kind = lenient::string(v, "type")
            .map(|k| normalize_label(&k))
            .unwrap_or_else(|| "idle".to_string());

        match kind.as_str() {
            "spawn" => Self::Spawn {
                position: lenient::coords(v, "position"),
            },
            "walk_to" => Self::WalkTo {
                target: lenient::coords(v, "target_position").unwrap_or_else(Self::default_position),
            },
            "run_to" => Self::RunTo {
                target: lenient::coords(v, "target_position").unwrap_or_else(Self::default_position),
            },
            "teleport" => Self::Teleport {
                position: lenient::coords(v, "position").unwrap_or_else(Self::default_position),
            },
            "look_at" => Self::LookAt {
                target: Self::look_target(v.get("target")),
            },
            "action" => {
                let name = lenient::string(v, "action_name")
                    .map(|n| normalize_label(&n))
                    .unwrap_or_default();
                Self::from_simple_kind(&name).unwrap_or(Self::Unhandled {
                    kind: format!("action:{}", name),
                })
            }
            other => Self::from_simple_kind(other).unwrap_or(Self::Unhandled {
                kind: other.to_string(),
            }),
        }
    }

    /// Parameterless kinds, shared by top-level `type` and `action_name`.
    fn from_simple_kind(kind: &str) -> Option<Self> {
        match kind {
            "sit" => Some(Self::Sit),
            "jump" => Some(Self::Jump),
            "attack" | "swipe" => Some(Self::Attack),
            "interact" | "use" => Some(Self::Interact),
            _ => None,
        }
    }

    fn look_target(target: Option<&Value>) -> LookTarget {
        match target {
            Some(Value::Array(_)) => LookTarget::Position(
                target
                    .and_then(Coords::from_value)
                    .unwrap_or_else(|| Coords::absolute(0.0, 0.0, 0.0)),
            ),
            Some(Value::String(s)) => match Coords::parse_strict(s) {
                Some(c) => LookTarget::Position(c),
                None if s.trim().is_empty() => {
                    LookTarget::Position(Coords::absolute(0.0, 0.0, 0.0))
                }
                None => LookTarget::Entity(s.trim().to_string()),
            },
            _ => LookTarget::Position(Coords::absolute(0.0, 0.0, 0.0)),
        }
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Camera {
    pub movements: Vec<CameraMovement>,
    pub fov_keyframes: Vec<FovKeyframe>,
}

impl Camera {
    pub fn from_value(v: &Value) -> Self {
        Self {
            movements: lenient::list(v, "movements")
                .iter()
                .map(CameraMovement::from_value)
                .collect(),
            fov_keyframes: lenient::list(v, "fov_keyframes")
                .iter()
                .map(|kf| FovKeyframe {
                    tick: lenient::tick(kf, "tick").unwrap_or(0),
                    fov: lenient::number(kf, "fov").unwrap_or(70.0),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FovKeyframe {
    pub tick: Tick,
    pub fov: f64,
}

/// A camera behaviour over `[tick_start, tick_end]`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CameraMovement {
    pub tick_start: Tick,
    /// Never below `tick_start`.
    pub tick_end: Tick,
    pub shape: MovementShape,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementShape {
    Static {
        position: Vec3,
    },
    Orbit {
        center: Vec3,
        radius: f64,
        /// Degrees.
        start_angle: f64,
        /// Degrees.
        end_angle: f64,
        height: f64,
    },
    Dolly {
        start: Vec3,
        end: Vec3,
        /// Actor id resolved through the entity registry.
        look_at: Option<String>,
    },
    Follow {
        target: Option<String>,
        distance: f64,
        height: f64,
    },
    Path {
        points: usize,
    },
    Unhandled {
        kind: String,
    },
}

impl CameraMovement {
    pub const DEFAULT_TICK_END: Tick = 100;

    pub fn from_value(v: &Value) -> Self {
        let tick_start = lenient::tick(v, "tick_start").unwrap_or(0);
        let tick_end = lenient::tick(v, "tick_end")
            .unwrap_or(Self::DEFAULT_TICK_END)
            .max(tick_start);

        let kind = lenient::string(v, "type")
            .map(|k| normalize_label(&k))
            .unwrap_or_else(|| "static".to_string());

        let shape = match kind.as_str() {
            "static" => MovementShape::Static {
                position: lenient::vec3(v, "position", Vec3::new(0.0, 70.0, 0.0)),
            },
            "orbit" => MovementShape::Orbit {
                center: lenient::vec3(v, "center", Vec3::new(0.0, 64.0, 0.0)),
                radius: lenient::number(v, "radius").unwrap_or(10.0),
                start_angle: lenient::number(v, "start_angle").unwrap_or(0.0),
                end_angle: lenient::number(v, "end_angle").unwrap_or(360.0),
                height: lenient::number(v, "height").unwrap_or(5.0),
            },
            "dolly" => MovementShape::Dolly {
                start: lenient::vec3(v, "start_position", Vec3::new(0.0, 70.0, 0.0)),
                end: lenient::vec3(v, "end_position", Vec3::new(10.0, 70.0, 0.0)),
                look_at: lenient::string(v, "look_at").filter(|s| !s.trim().is_empty()),
            },
            "follow" => MovementShape::Follow {
                target: lenient::string(v, "target").filter(|s| !s.trim().is_empty()),
                distance: lenient::number(v, "distance").unwrap_or(5.0),
                height: lenient::number(v, "height").unwrap_or(2.0),
            },
            "path" => MovementShape::Path {
                points: lenient::list(v, "points").len(),
            },
            other => MovementShape::Unhandled {
                kind: other.to_string(),
            },
        };

        Self {
            tick_start,
            tick_end,
            shape,
        }
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Effect {
    pub tick: Tick,
    pub kind: EffectKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    Particles {
        /// Label as declared; mapped to a world particle at compile time.
        particle: String,
        position: Coords,
        count: u64,
    },
    Other {
        kind: String,
    },
}

impl Effect {
    pub fn from_value(v: &Value) -> Self {
        let tick = lenient::tick(v, "tick").unwrap_or(0);
        let kind = lenient::string(v, "type")
            .map(|k| normalize_label(&k))
            .unwrap_or_else(|| "particles".to_string());

        let kind = if kind == "particles" {
            EffectKind::Particles {
                particle: lenient::string(v, "particle_type")
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| "cloud".to_string()),
                position: lenient::coords(v, "position")
                    .unwrap_or_else(|| Coords::absolute(0.0, 64.0, 0.0)),
                count: lenient::tick(v, "count").unwrap_or(10),
            }
        } else {
            EffectKind::Other { kind }
        };

        Self { tick, kind }
    }
}
