//! Camera interpolation unit tests

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storyboard_compiler::camera::{
        compile_camera, dolly_keyframes, frame_count, interpolate, orbit_keyframes,
        MAX_KEYFRAMES,
    };
    use storyboard_compiler::command::{CommandKind, PlaceholderReason};
    use storyboard_compiler::entity::{EntityRegistry, RegistryEntry};
    use storyboard_compiler::storyboard::{Camera, CameraMovement};
    use storyboard_compiler::types::{Coords, Vec3};

    fn movement(value: serde_json::Value) -> CameraMovement {
        CameraMovement::from_value(&value)
    }

    // -----------------------------------------------------------------------
    // Frame count
    // -----------------------------------------------------------------------

    #[test]
    fn frame_count_is_clamped() {
        assert_eq!(frame_count(0, 0), 1);
        assert_eq!(frame_count(0, 4), 1);
        assert_eq!(frame_count(0, 50), 10);
        assert_eq!(frame_count(0, 100), MAX_KEYFRAMES);
        assert_eq!(frame_count(0, 10_000), MAX_KEYFRAMES);
    }

    #[test]
    fn zero_span_emits_two_frames_without_dividing_by_zero() {
        let frames = orbit_keyframes(40, 40, Vec3::zero(), 10.0, 0.0, 90.0, 0.0);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.tick == 40));
        assert!(frames.iter().all(|f| f.position.x.is_finite()));

        let frames = dolly_keyframes(7, 7, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(frames.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Orbit
    // -----------------------------------------------------------------------

    #[test]
    fn full_orbit_closes() {
        let center = Vec3::new(0.0, 64.0, 0.0);
        let frames = orbit_keyframes(0, 100, center, 10.0, 0.0, 360.0, 5.0);
        assert_eq!(frames.len(), 21);

        let first = frames[0].position;
        let last = frames[frames.len() - 1].position;
        assert!(first.distance(last) < 1e-9, "{:?} vs {:?}", first, last);
        assert_eq!(first, Vec3::new(10.0, 69.0, 0.0));
    }

    #[test]
    fn orbit_ticks_truncate_toward_start() {
        // span 7 → n = 1; span 13 → n = 2, middle frame at 6.5 → 6
        let ticks: Vec<u64> = orbit_keyframes(0, 13, Vec3::zero(), 1.0, 0.0, 90.0, 0.0)
            .iter()
            .map(|f| f.tick)
            .collect();
        assert_eq!(ticks, vec![0, 6, 13]);

        let ticks: Vec<u64> = orbit_keyframes(10, 17, Vec3::zero(), 1.0, 0.0, 90.0, 0.0)
            .iter()
            .map(|f| f.tick)
            .collect();
        assert_eq!(ticks, vec![10, 17]);
    }

    #[test]
    fn orbit_commands_face_center_with_one_decimal() {
        let m = movement(json!({
            "type": "orbit",
            "tick_start": 0,
            "tick_end": 5,
            "center": [0, 64, 0],
            "radius": 10,
            "start_angle": 0,
            "end_angle": 90,
            "height": 5
        }));
        let cmds = interpolate(&m, &EntityRegistry::new());
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].tick, 0);
        assert_eq!(cmds[0].command, "tp @p 10.0 69.0 0.0 facing 0.0 64.0 0.0");
        assert_eq!(cmds[1].tick, 5);
        assert_eq!(cmds[1].command, "tp @p 0.0 69.0 10.0 facing 0.0 64.0 0.0");
        assert!(cmds.iter().all(|c| c.kind == CommandKind::Camera));
    }

    // -----------------------------------------------------------------------
    // Dolly
    // -----------------------------------------------------------------------

    #[test]
    fn dolly_interpolates_linearly() {
        let frames = dolly_keyframes(0, 10, Vec3::zero(), Vec3::new(10.0, 0.0, -4.0));
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].tick, 5);
        assert_eq!(frames[1].position, Vec3::new(5.0, 0.0, -2.0));
    }

    #[test]
    fn dolly_faces_registered_actor() {
        let mut reg = EntityRegistry::new();
        reg.register(
            "hero",
            RegistryEntry {
                name: "Zoro".into(),
                position: Coords::absolute(0.0, 64.0, 0.0),
                entity_id: "minecraft:zombie".into(),
            },
        );

        let m = movement(json!({
            "type": "dolly",
            "tick_start": 0,
            "tick_end": 0,
            "start_position": [0, 70, 0],
            "end_position": [10, 70, 0],
            "look_at": "hero"
        }));
        let cmds = interpolate(&m, &reg);
        assert_eq!(
            cmds[0].command,
            "tp @p 0.0 70.0 0.0 facing entity @e[name=\"Zoro\",limit=1]"
        );
    }

    #[test]
    fn dolly_with_unknown_look_at_is_plain_reposition() {
        let m = movement(json!({
            "type": "dolly",
            "tick_start": 0,
            "tick_end": 0,
            "look_at": "ghost"
        }));
        let cmds = interpolate(&m, &EntityRegistry::new());
        assert_eq!(cmds[0].command, "tp @p 0.0 70.0 0.0");
        assert_eq!(cmds[1].command, "tp @p 10.0 70.0 0.0");
    }

    // -----------------------------------------------------------------------
    // Static / placeholders
    // -----------------------------------------------------------------------

    #[test]
    fn static_is_single_reposition() {
        let m = movement(json!({"type": "static", "tick_start": 12, "position": [1, 2, -3]}));
        let cmds = interpolate(&m, &EntityRegistry::new());
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].tick, 12);
        assert_eq!(cmds[0].command, "tp @p 1.0 2.0 -3.0");
    }

    #[test]
    fn follow_emits_one_placeholder() {
        let m = movement(json!({
            "type": "follow",
            "tick_start": 20,
            "tick_end": 80,
            "target": "hero",
            "distance": 6,
            "height": 3
        }));
        let cmds = interpolate(&m, &EntityRegistry::new());
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].tick, 20);
        assert!(cmds[0].command.starts_with('#'));
        assert!(cmds[0].command.contains("hero"));
        assert!(!cmds[0].is_executable());
        assert_eq!(
            cmds[0].kind,
            CommandKind::Placeholder(PlaceholderReason::FollowCamera)
        );
    }

    #[test]
    fn unknown_movement_is_skipped() {
        let m = movement(json!({"type": "crane", "tick_start": 0, "tick_end": 50}));
        assert!(interpolate(&m, &EntityRegistry::new()).is_empty());
    }

    #[test]
    fn fov_keyframes_follow_movements() {
        let camera = Camera::from_value(&json!({
            "movements": [{"type": "static", "tick_start": 30}],
            "fov_keyframes": [{"tick": 0, "fov": 90}]
        }));
        let cmds = compile_camera(&camera, &EntityRegistry::new());
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].kind, CommandKind::Camera);
        assert_eq!(cmds[1].command, "# Set FOV to 90");
        assert_eq!(
            cmds[1].kind,
            CommandKind::Placeholder(PlaceholderReason::FieldOfView)
        );
    }

    #[test]
    fn huge_interval_does_not_overflow() {
        let m = movement(json!({"type": "dolly", "tick_start": 0, "tick_end": 1e18}));
        let cmds = interpolate(&m, &EntityRegistry::new());
        assert_eq!(cmds.len(), 21);
        assert!(cmds.windows(2).all(|w| w[0].tick <= w[1].tick));
        assert_eq!(cmds[20].tick, m.tick_end);

        let frames = orbit_keyframes(u64::MAX - 10, u64::MAX, Vec3::zero(), 1.0, 0.0, 90.0, 0.0);
        assert_eq!(frames.last().map(|f| f.tick), Some(u64::MAX));
    }

    #[test]
    fn inverted_interval_degrades_to_zero_span() {
        let m = movement(json!({"type": "orbit", "tick_start": 50, "tick_end": 10}));
        assert_eq!(m.tick_end, 50);
        let cmds = interpolate(&m, &EntityRegistry::new());
        assert_eq!(cmds.len(), 2);
    }
}
