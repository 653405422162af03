//! Renderers for downstream replay artifacts.
//!
//! These are pure: each returns relative paths and file contents, and the
//! caller decides where (and whether) to write them.
//!
//! | Renderer             | Layout                                              |
//! |----------------------|-----------------------------------------------------|
//! | [`render_text`]      | one file, commands grouped under `# === Tick N ===` |
//! | [`render_functions`] | `<scene>.mcfunction` per scene + `main.mcfunction`  |
//! | [`render_datapack`]  | `pack.mcmeta` + `data/<pack>/functions/main.mcfunction` |
//!
//! Function files omit placeholders; the text file keeps them for audit.

use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::json;

use crate::script::Script;

/// Datapack format understood by 1.20 worlds.
pub const PACK_FORMAT: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Relative to the export root.
    pub path: PathBuf,
    pub contents: String,
}

impl ExportFile {
    fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// File-system friendly slug: lowercase, spaces → underscores, anything else
/// outside `[a-z0-9_-]` dropped.
pub fn slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// [`slug`] with `_2`, `_3`… appended until it is not in `taken`.
fn unique_slug(name: &str, taken: &mut HashSet<String>) -> String {
    let base = slug(name);
    let mut candidate = base.clone();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    candidate
}

/// Line-oriented listing of the whole timeline.
pub fn render_text(script: &Script) -> ExportFile {
    let mut lines = vec![
        format!("# {} - generated commands", script.title),
        format!(
            "# {} ticks ({}s), fingerprint {}",
            script.total_duration_ticks,
            script.total_duration_seconds,
            script.fingerprint()
        ),
        String::new(),
    ];

    let mut current_tick = None;
    for command in script.timeline() {
        if current_tick != Some(command.tick) {
            lines.push(String::new());
            lines.push(format!("# === Tick {} ===", command.tick));
            current_tick = Some(command.tick);
        }
        if !command.description.is_empty() {
            lines.push(format!("# {}", command.description));
        }
        lines.push(command.command);
    }
    lines.push(String::new());

    ExportFile::new(format!("{}.txt", slug(&script.title)), lines.join("\n"))
}

/// One function file per scene plus a `main` that calls them in order.
/// Scenes whose names slug identically get numbered suffixes.
pub fn render_functions(script: &Script, namespace: &str) -> Vec<ExportFile> {
    let namespace = slug(namespace);
    let mut files = Vec::with_capacity(script.scenes.len() + 1);
    let mut main = vec![
        format!("# {} - generated by storyboard-compiler", script.title),
        String::new(),
    ];

    let mut taken = HashSet::from(["main".to_string()]);
    for scene in &script.scenes {
        let name = unique_slug(&scene.name, &mut taken);
        let mut lines = vec![
            format!("# Scene: {}", scene.name),
            format!("# Duration: {} ticks", scene.duration_ticks),
            String::new(),
        ];
        for command in scene.commands.iter().filter(|c| c.is_executable()) {
            lines.push(format!("# Tick {}: {}", command.tick, command.description));
            lines.push(command.command.clone());
            lines.push(String::new());
        }
        files.push(ExportFile::new(format!("{}.mcfunction", name), lines.join("\n")));

        main.push(format!(
            "# Scene: {} - {} ticks",
            scene.name, scene.duration_ticks
        ));
        main.push(format!("function {}:{}", namespace, name));
        main.push(String::new());
    }

    files.push(ExportFile::new("main.mcfunction", main.join("\n")));
    files
}

/// Datapack with the flattened executable timeline as its `main` function.
pub fn render_datapack(script: &Script, pack_name: &str) -> Vec<ExportFile> {
    let pack = slug(pack_name);
    let root = PathBuf::from(&pack);

    let mcmeta = json!({
        "pack": {
            "pack_format": PACK_FORMAT,
            "description": format!("{} (storyboard-compiler)", script.title),
        }
    });

    let mut main = vec!["# Main animation controller".to_string(), String::new()];
    main.extend(
        script
            .timeline()
            .into_iter()
            .filter(|c| c.is_executable())
            .map(|c| c.command),
    );

    vec![
        ExportFile::new(
            root.join("pack.mcmeta"),
            serde_json::to_string_pretty(&mcmeta).unwrap_or_default(),
        ),
        ExportFile::new(
            root.join("data").join(&pack).join("functions").join("main.mcfunction"),
            main.join("\n"),
        ),
    ]
}
