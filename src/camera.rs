//! Camera interpolation: continuous movements → discrete per-tick keyframe
//! commands.
//!
//! Orbit and dolly sample `n + 1` keyframes where
//! `n = clamp(span / 5, 1, 20)` and `span = tick_end - tick_start`.  Keyframe
//! `i` lands on `tick_start + span * i / n` (integer division, so fractional
//! ticks truncate toward the interval start and the last frame is exactly
//! `tick_end`).  Angles are degrees on input.
//!
//! Follow, path and field-of-view have no native world command; they compile
//! to placeholders for a downstream camera system.

use log::debug;

use crate::command::{Command, PlaceholderReason};
use crate::entity::ActorLookup;
use crate::storyboard::{Camera, CameraMovement, FovKeyframe, MovementShape};
use crate::types::{Tick, Vec3};

pub const MAX_KEYFRAMES: u64 = 20;
pub const TICKS_PER_KEYFRAME: u64 = 5;

/// The selector the camera rides on.
const CAMERA_TARGET: &str = "@p";

/// One sampled instant of a camera path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub tick: Tick,
    pub position: Vec3,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Number of intervals between keyframes.  Never zero.
pub fn frame_count(tick_start: Tick, tick_end: Tick) -> u64 {
    let span = tick_end.saturating_sub(tick_start);
    (span / TICKS_PER_KEYFRAME).clamp(1, MAX_KEYFRAMES)
}

/// Widened to `u128` so spans near `u64::MAX` cannot overflow.
fn keyframe_tick(tick_start: Tick, tick_end: Tick, i: u64, n: u64) -> Tick {
    let span = tick_end.saturating_sub(tick_start) as u128;
    let offset = (span * i as u128 / n as u128) as Tick;
    tick_start.saturating_add(offset)
}

/// Sample `n + 1` keyframes, handing each the fraction `t = i / n`.
fn sample(tick_start: Tick, tick_end: Tick, at: impl Fn(f64) -> Vec3) -> Vec<Keyframe> {
    let n = frame_count(tick_start, tick_end);
    (0..=n)
        .map(|i| Keyframe {
            tick: keyframe_tick(tick_start, tick_end, i, n),
            position: at(i as f64 / n as f64),
        })
        .collect()
}

pub fn orbit_keyframes(
    tick_start: Tick,
    tick_end: Tick,
    center: Vec3,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    height: f64,
) -> Vec<Keyframe> {
    sample(tick_start, tick_end, |t| {
        let angle = (start_angle + (end_angle - start_angle) * t).to_radians();
        Vec3::new(
            center.x + radius * angle.cos(),
            center.y + height,
            center.z + radius * angle.sin(),
        )
    })
}

pub fn dolly_keyframes(tick_start: Tick, tick_end: Tick, start: Vec3, end: Vec3) -> Vec<Keyframe> {
    sample(tick_start, tick_end, |t| start.lerp(end, t))
}

// ---------------------------------------------------------------------------
// Command emission
// ---------------------------------------------------------------------------

/// Expand one movement into camera commands.
pub fn interpolate(movement: &CameraMovement, actors: &dyn ActorLookup) -> Vec<Command> {
    let (start, end) = (movement.tick_start, movement.tick_end);

    match &movement.shape {
        MovementShape::Static { position } => vec![Command::camera(
            start,
            format!("tp {} {}", CAMERA_TARGET, position),
            "Static camera position",
        )],

        MovementShape::Orbit {
            center,
            radius,
            start_angle,
            end_angle,
            height,
        } => orbit_keyframes(start, end, *center, *radius, *start_angle, *end_angle, *height)
            .into_iter()
            .enumerate()
            .map(|(i, kf)| {
                Command::camera(
                    kf.tick,
                    format!("tp {} {} facing {}", CAMERA_TARGET, kf.position, center),
                    format!("Orbit frame {}", i),
                )
            })
            .collect(),

        MovementShape::Dolly {
            start: from,
            end: to,
            look_at,
        } => {
            let facing = look_at
                .as_deref()
                .and_then(|id| actors.display_name(id))
                .map(|name| {
                    format!(
                        " facing entity @e[name=\"{}\",limit=1]",
                        name.replace('"', "\\\"")
                    )
                })
                .unwrap_or_default();

            dolly_keyframes(start, end, *from, *to)
                .into_iter()
                .enumerate()
                .map(|(i, kf)| {
                    Command::camera(
                        kf.tick,
                        format!("tp {} {}{}", CAMERA_TARGET, kf.position, facing),
                        format!("Dolly frame {}", i),
                    )
                })
                .collect()
        }

        MovementShape::Follow {
            target,
            distance,
            height,
        } => vec![Command::placeholder(
            start,
            format!(
                "Camera follows {} at distance {}, height {} until tick {}",
                target.as_deref().unwrap_or("nothing"),
                distance,
                height,
                end
            ),
            "Follow camera setup",
            PlaceholderReason::FollowCamera,
        )],

        MovementShape::Path { points } => vec![Command::placeholder(
            start,
            format!("Camera path over {} points until tick {}", points, end),
            "Camera path",
            PlaceholderReason::CameraPath,
        )],

        MovementShape::Unhandled { kind } => {
            debug!("Skipping unhandled camera movement '{}' at tick {}", kind, start);
            Vec::new()
        }
    }
}

pub fn fov_command(keyframe: &FovKeyframe) -> Command {
    Command::placeholder(
        keyframe.tick,
        format!("Set FOV to {}", keyframe.fov),
        "FOV keyframe",
        PlaceholderReason::FieldOfView,
    )
}

/// All movements in declaration order, then all FOV keyframes.
pub fn compile_camera(camera: &Camera, actors: &dyn ActorLookup) -> Vec<Command> {
    camera
        .movements
        .iter()
        .flat_map(|m| interpolate(m, actors))
        .chain(camera.fov_keyframes.iter().map(fov_command))
        .collect()
}
