//! Scene compiler and storyboard decoding tests

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storyboard_compiler::command::{CommandKind, PlaceholderReason};
    use storyboard_compiler::entity::EntityRegistry;
    use storyboard_compiler::scene::{
        compile_scene, particle_name, world_modification_command, world_setup_commands,
        SceneCompiler,
    };
    use storyboard_compiler::storyboard::{Action, LookTarget, Scene, Storyboard};
    use storyboard_compiler::types::{Coords, SetupSettings};

    fn scene(value: serde_json::Value) -> Scene {
        Scene::from_value(&value)
    }

    fn texts(scene: &Scene) -> Vec<String> {
        compile_scene(scene)
            .commands
            .into_iter()
            .map(|c| c.command)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Setting
    // -----------------------------------------------------------------------

    #[test]
    fn setting_commands_lead_at_tick_zero() {
        let seq = compile_scene(&scene(json!({
            "name": "dusk",
            "setting": {"time_of_day": "Sunset", "weather": "storm"}
        })));
        assert_eq!(seq.commands[0].command, "time set 12000");
        assert_eq!(seq.commands[1].command, "weather thunder");
        assert!(seq.commands[..2].iter().all(|c| c.tick == 0));
    }

    #[test]
    fn unknown_setting_labels_fall_back() {
        let seq = compile_scene(&scene(json!({
            "setting": {"time_of_day": "teatime", "weather": "fog"}
        })));
        assert_eq!(seq.commands[0].command, "time set day");
        assert_eq!(seq.commands[1].command, "weather clear");
    }

    #[test]
    fn castle_modification_places_outpost_at_tick_zero() {
        let seq = compile_scene(&scene(json!({
            "setting": {"world_modifications": ["ancient castle", "a small house", "a moat"]}
        })));
        let mods: Vec<_> = seq.commands[2..5].iter().collect();
        assert_eq!(mods[0].tick, 0);
        assert_eq!(
            mods[0].command,
            "execute at @p run place structure minecraft:pillager_outpost ~ ~ ~"
        );
        assert_eq!(mods[1].tick, 5);
        assert!(mods[1].command.contains("plains_village_shepherds_house_1"));
        assert_eq!(mods[2].tick, 10);
        assert_eq!(mods[2].command, "say [Agent] World Mod: a moat");
    }

    #[test]
    fn modification_rules_are_ordered() {
        assert!(world_modification_command("castle village").contains("pillager_outpost"));
        assert!(world_modification_command("Village green").contains("village_plains"));
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    #[test]
    fn named_zombie_spawns_with_custom_name() {
        let seq = compile_scene(&scene(json!({
            "actors": [{
                "id": "z1",
                "name": "Zoro",
                "type": "zombie",
                "actions": [{"tick": 0, "type": "spawn", "position": [10, 64, -5]}]
            }]
        })));
        let spawn = &seq.commands[2];
        assert_eq!(spawn.tick, 0);
        assert_eq!(
            spawn.command,
            r#"execute at @p run summon minecraft:zombie 10 64 -5 {CustomName:'{"text":"Zoro"}'}"#
        );
    }

    #[test]
    fn spawn_without_position_uses_relative_origin() {
        let texts = texts(&scene(json!({
            "actors": [{"name": "cow", "actions": [{"type": "spawn"}]}]
        })));
        assert_eq!(texts[2], "execute at @p run summon minecraft:cow ~ ~ ~");
    }

    #[test]
    fn spawn_registers_actor() {
        let mut registry = EntityRegistry::new();
        let s = scene(json!({
            "actors": [
                {"id": "a", "name": "Zoro", "type": "zombie", "actions": [{"type": "spawn"}]},
                {"id": "b", "name": "Bob", "actions": [{"type": "jump"}]}
            ]
        }));
        SceneCompiler::new(&mut registry).compile(&s);
        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
        assert_eq!(registry.get("a").map(|e| e.name.as_str()), Some("Zoro"));
    }

    #[test]
    fn movement_and_motion_actions() {
        let texts = texts(&scene(json!({
            "actors": [{
                "name": "Zoro",
                "type": "zombie",
                "actions": [
                    {"tick": 1, "type": "walk_to", "target_position": [1, 2, 3]},
                    {"tick": 2, "type": "run_to", "target_position": "~ ~1 ~"},
                    {"tick": 3, "type": "teleport"},
                    {"tick": 4, "type": "jump"},
                    {"tick": 5, "type": "sit"}
                ]
            }]
        })));
        let sel = "@e[name=\"Zoro\",sort=nearest,limit=1]";
        assert_eq!(texts[2], format!("tp {} 1 2 3", sel));
        assert_eq!(texts[3], format!("tp {} ~ ~1 ~", sel));
        assert_eq!(texts[4], format!("tp {} 0 64 0", sel));
        assert_eq!(
            texts[5],
            format!("execute as {} run data merge entity @s {{Motion:[0.0d,0.6d,0.0d]}}", sel)
        );
        assert_eq!(texts[6], format!("data merge entity {} {{Sitting:1b}}", sel));
    }

    #[test]
    fn camels_sit_with_pose() {
        let texts = texts(&scene(json!({
            "actors": [{"name": "camel", "type": "camel", "actions": [{"type": "sit"}]}]
        })));
        assert_eq!(
            texts[2],
            "data merge entity @e[type=minecraft:camel,sort=nearest,limit=1] {Pose:sitting}"
        );
    }

    #[test]
    fn attack_emits_sound_then_lunge() {
        let seq = compile_scene(&scene(json!({
            "actors": [{"name": "zombie", "actions": [{"tick": 8, "type": "swipe"}]}]
        })));
        let attack: Vec<_> = seq.commands.iter().filter(|c| c.tick == 8).collect();
        assert_eq!(attack.len(), 2);
        assert!(attack[0].command.contains("playsound entity.player.attack.strong"));
        assert!(attack[1].command.contains("Motion:[0.0d,0.2d,0.4d]"));
    }

    #[test]
    fn compound_action_names_map_to_kinds() {
        let s = scene(json!({
            "actors": [{"name": "x", "actions": [
                {"type": "action", "action_name": "use"},
                {"type": "action", "action_name": "dance"}
            ]}]
        }));
        assert_eq!(s.actors[0].actions[0].action, Action::Interact);
        assert_eq!(
            s.actors[0].actions[1].action,
            Action::Unhandled {
                kind: "action:dance".into()
            }
        );
        assert_eq!(compile_scene(&s).len(), 3);
    }

    #[test]
    fn look_at_coordinates_or_entity() {
        let s = scene(json!({
            "actors": [
                {"id": "hero", "name": "Zoro", "type": "zombie", "actions": [
                    {"tick": 0, "type": "spawn"},
                    {"tick": 1, "type": "look_at", "target": "1 2 3"}
                ]},
                {"name": "Bob", "actions": [
                    {"tick": 2, "type": "look_at", "target": "hero"}
                ]}
            ]
        }));
        assert_eq!(
            s.actors[0].actions[1].action,
            Action::LookAt {
                target: LookTarget::Position(Coords::absolute(1.0, 2.0, 3.0))
            }
        );

        let seq = compile_scene(&s);
        let at = |tick| {
            seq.commands
                .iter()
                .find(|c| c.tick == tick)
                .map(|c| c.command.clone())
                .unwrap_or_default()
        };
        assert_eq!(
            at(1),
            "execute as @e[name=\"Zoro\",sort=nearest,limit=1] at @s run facing 1 2 3"
        );
        assert_eq!(
            at(2),
            "execute as @e[name=\"Bob\",sort=nearest,limit=1] at @s run facing entity @e[name=\"Zoro\",sort=nearest,limit=1] eyes"
        );
    }

    #[test]
    fn unhandled_actions_emit_nothing() {
        let seq = compile_scene(&scene(json!({
            "actors": [{"name": "x", "actions": [{"type": "morph"}, {"type": "emote"}, {}]}]
        })));
        assert_eq!(seq.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    #[test]
    fn particle_labels_map_or_pass_through() {
        assert_eq!(particle_name("fire"), "flame");
        assert_eq!(particle_name("Magic"), "enchant");
        assert_eq!(particle_name("soul_fire_flame"), "soul_fire_flame");
    }

    #[test]
    fn particle_effect_command() {
        let texts = texts(&scene(json!({
            "effects": [{"tick": 3, "type": "particles", "particle_type": "smoke",
                          "position": [0, 65, 0], "count": 40}]
        })));
        assert_eq!(texts[2], "particle smoke 0 65 0 1 1 1 0 40");
    }

    #[test]
    fn unknown_effect_becomes_placeholder() {
        let seq = compile_scene(&scene(json!({
            "effects": [{"tick": 3, "type": "screen_shake"}]
        })));
        let effect = &seq.commands[2];
        assert!(effect.command.starts_with("# "));
        assert_eq!(
            effect.kind,
            CommandKind::Placeholder(PlaceholderReason::UnknownEffect)
        );
    }

    // -----------------------------------------------------------------------
    // Ordering & duration
    // -----------------------------------------------------------------------

    #[test]
    fn stable_sort_keeps_pipeline_order_within_a_tick() {
        let seq = compile_scene(&scene(json!({
            "setting": {"world_modifications": ["tower"]},
            "actors": [{"name": "cow", "actions": [
                {"tick": 10, "type": "jump"},
                {"tick": 0, "type": "spawn"}
            ]}],
            "camera": {"movements": [{"type": "static", "tick_start": 0}]},
            "effects": [{"tick": 0}]
        })));
        let kinds: Vec<_> = seq
            .commands
            .iter()
            .map(|c| (c.tick, c.description.clone()))
            .collect();
        assert_eq!(kinds[0], (0, "Set time of day".to_string()));
        assert_eq!(kinds[1], (0, "Set weather".to_string()));
        assert_eq!(kinds[2], (0, "Build tower".to_string()));
        assert_eq!(kinds[3], (0, "Spawn cow".to_string()));
        assert_eq!(kinds[4], (0, "Static camera position".to_string()));
        assert_eq!(kinds[5], (0, "cloud effect".to_string()));
        assert_eq!(kinds[6], (10, "cow jumps".to_string()));
        assert!(seq.commands.windows(2).all(|w| w[0].tick <= w[1].tick));
    }

    #[test]
    fn duration_is_declared_seconds_times_tick_rate() {
        let seq = compile_scene(&scene(json!({"duration_seconds": 2.5})));
        assert_eq!(seq.duration_ticks, 50);

        let seq = compile_scene(&scene(json!({})));
        assert_eq!(seq.duration_ticks, 600);

        let seq = compile_scene(&scene(json!({"duration_seconds": -4})));
        assert_eq!(seq.duration_ticks, 0);
    }

    #[test]
    fn overflow_is_reported_not_truncated() {
        let seq = compile_scene(&scene(json!({
            "duration_seconds": 1,
            "actors": [{"name": "cow", "actions": [{"tick": 45, "type": "jump"}]}]
        })));
        assert_eq!(seq.duration_ticks, 20);
        assert_eq!(seq.max_command_tick(), Some(45));
        assert_eq!(seq.overflow_ticks(), 25);
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let s = scene(json!({
            "name": 42,
            "duration_seconds": "abc",
            "actors": [{"actions": [
                {"tick": "soon", "type": "walk_to", "target_position": ["north", 64, null]}
            ]}],
            "camera": "nope",
            "effects": "nope"
        }));
        assert_eq!(s.name, "42");
        assert_eq!(s.duration_seconds, 30.0);
        assert_eq!(s.actors[0].id, "actor_001");
        assert_eq!(s.actors[0].actions[0].tick, 0);
        assert_eq!(
            s.actors[0].actions[0].action,
            Action::WalkTo {
                target: Coords::absolute(0.0, 64.0, 0.0)
            }
        );
        assert!(s.camera.movements.is_empty());
        assert!(s.effects.is_empty());
    }

    #[test]
    fn storyboard_defaults_and_summary() {
        let sb = Storyboard::from_json(
            r#"{"scenes": [{"name": "opening", "duration_seconds": 10,
                            "setting": {"location": "Hilltop"}}, {}]}"#,
        )
        .unwrap();
        assert_eq!(sb.title, Storyboard::UNTITLED);
        assert_eq!(sb.scenes[1].name, Scene::DEFAULT_NAME);
        assert_eq!(sb.total_duration_seconds(), 40.0);

        let summary = sb.summary();
        assert!(summary.contains("Scenes: 2"));
        assert!(summary.contains("Scene 1: opening"));
        assert!(summary.contains("Location: Hilltop"));
        assert!(summary.contains("Location: Unknown location"));
    }

    // -----------------------------------------------------------------------
    // World setup
    // -----------------------------------------------------------------------

    #[test]
    fn world_setup_is_one_command_per_tick() {
        let cmds = world_setup_commands(&SetupSettings::default());
        assert_eq!(cmds.len(), 5);
        assert_eq!(cmds[0].command, "gamemode creative");
        assert_eq!(cmds[1].command, "difficulty peaceful");
        let ticks: Vec<u64> = cmds.iter().map(|c| c.tick).collect();
        assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
    }
}
