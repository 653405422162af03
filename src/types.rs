//! Core types shared across all modules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::safety::SafetyPolicy;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Logical world time.  Scene-relative until assembly, absolute afterwards.
pub type Tick = u64;

/// Fixed world tick rate.
pub const TICKS_PER_SECOND: u64 = 20;

/// Convert a declared duration in seconds into ticks.
///
/// Negative and non-finite values clamp to zero; fractional results round to
/// the nearest tick.
pub fn seconds_to_ticks(seconds: f64) -> Tick {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * TICKS_PER_SECOND as f64).round() as Tick
}

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Linear interpolation towards `other` by fraction `t`.
    pub fn lerp(self, other: Vec3, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    pub fn distance(self, other: Vec3) -> f64 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Renders with one decimal per component, space separated (`1.0 64.0 -3.5`).
impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            fixed1(self.x),
            fixed1(self.y),
            fixed1(self.z)
        )
    }
}

/// One-decimal rendering with negative zero folded into `0.0`.
pub fn fixed1(v: f64) -> String {
    let rounded = (v * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.1}", rounded)
}

/// Shortest rendering (`64`, `0.5`) with negative zero folded into `0`.
fn shortest(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{}", v)
}

// ---------------------------------------------------------------------------
// Declared coordinates
// ---------------------------------------------------------------------------

/// One declared coordinate component, absolute or relative (`~`) to the
/// executing position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coord {
    pub value: f64,
    pub relative: bool,
}

impl Coord {
    pub fn absolute(value: f64) -> Self {
        Self {
            value,
            relative: false,
        }
    }

    pub fn relative(value: f64) -> Self {
        Self {
            value,
            relative: true,
        }
    }

    /// Lenient decode.  Numbers, numeric strings and `~`-prefixed strings are
    /// understood; anything else is an absolute `0`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self::absolute(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => Self::parse(s).unwrap_or(Self::absolute(0.0)),
            _ => Self::absolute(0.0),
        }
    }

    /// Strict parse of a single textual token.  Returns `None` when the token
    /// is not a coordinate.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix('~') {
            if rest.is_empty() {
                return Some(Self::relative(0.0));
            }
            return rest.parse::<f64>().ok().map(Self::relative);
        }
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::absolute)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.relative, self.value == 0.0) {
            (true, true) => write!(f, "~"),
            (true, false) => write!(f, "~{}", shortest(self.value)),
            (false, _) => write!(f, "{}", shortest(self.value)),
        }
    }
}

/// A declared position triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coords {
    pub x: Coord,
    pub y: Coord,
    pub z: Coord,
}

impl Coords {
    pub fn absolute(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Coord::absolute(x),
            y: Coord::absolute(y),
            z: Coord::absolute(z),
        }
    }

    /// `~ ~ ~`: the executing position itself.
    pub fn here() -> Self {
        Self {
            x: Coord::relative(0.0),
            y: Coord::relative(0.0),
            z: Coord::relative(0.0),
        }
    }

    /// Lenient decode of a position.  Accepts a 3-element array or a
    /// whitespace-separated string; short input is padded with `0`.
    /// Returns `None` only when the value has no usable shape at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                let at = |i: usize| {
                    items
                        .get(i)
                        .map(Coord::from_value)
                        .unwrap_or(Coord::absolute(0.0))
                };
                Some(Self {
                    x: at(0),
                    y: at(1),
                    z: at(2),
                })
            }
            Value::String(s) => {
                let parts: Vec<&str> = s.split_whitespace().collect();
                if parts.is_empty() {
                    return None;
                }
                let at = |i: usize| {
                    parts
                        .get(i)
                        .and_then(|p| Coord::parse(p))
                        .unwrap_or(Coord::absolute(0.0))
                };
                Some(Self {
                    x: at(0),
                    y: at(1),
                    z: at(2),
                })
            }
            _ => None,
        }
    }

    /// Strict parse used to tell coordinates apart from entity names: exactly
    /// three tokens, all of them coordinates.
    pub fn parse_strict(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 3 {
            return None;
        }
        Some(Self {
            x: Coord::parse(parts[0])?,
            y: Coord::parse(parts[1])?,
            z: Coord::parse(parts[2])?,
        })
    }

    /// Numeric view used by interpolation.  The relative marker is dropped.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.value, self.y.value, self.z.value)
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// World preparation used by [`crate::scene::world_setup_commands`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SetupSettings {
    pub gamemode: String,
    pub difficulty: String,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            gamemode: "creative".into(),
            difficulty: "peaceful".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Wall-clock milliseconds per logical tick when pacing in real time.
    pub tick_delay_ms: u64,
    /// Pace submissions to match tick spacing.
    pub realtime: bool,
    /// Namespace used for exported function files.
    pub namespace: String,
    /// Directory the CLI writes exported artifacts to.
    pub output_dir: String,
    /// Denylist applied by the assembler.
    pub safety: SafetyPolicy,
    /// World preparation preset.
    pub setup: SetupSettings,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            tick_delay_ms: 1000 / TICKS_PER_SECOND,
            realtime: false,
            namespace: "storyboard".into(),
            output_dir: "output".into(),
            safety: SafetyPolicy::default(),
            setup: SetupSettings::default(),
        }
    }
}
