//! Entity resolution: free-text actor name/type pairs → world entity
//! identifiers and selectors, plus the per-pass [`EntityRegistry`].
//!
//! ## Identifier rules (first match wins)
//!
//! | # | Condition                                             | Identifier                      |
//! |---|-------------------------------------------------------|---------------------------------|
//! | 1 | declared type present, not `unknown`/`actor`, no `titan` | `minecraft:<type>` (or as-is if namespaced) |
//! | 2 | normalised name is a titan table entry                | table value                     |
//! | 2 | normalised name contains `titan`                      | first matching sub-kind, else `titans:zombie_titan` |
//! | 3 | normalised name contains `dragon`                     | `minecraft:ender_dragon`        |
//! | 4 | otherwise                                             | `minecraft:<name>`              |
//!
//! An empty result falls back to [`FALLBACK_ENTITY`].  Resolution never fails.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::Coords;

pub const DEFAULT_NAMESPACE: &str = "minecraft";
pub const DRAGON_ENTITY: &str = "minecraft:ender_dragon";
pub const GENERIC_TITAN: &str = "titans:zombie_titan";
pub const FALLBACK_ENTITY: &str = "minecraft:armor_stand";

/// Declared types that carry no information.
const TYPE_SENTINELS: &[&str] = &["unknown", "actor"];

const TITAN_TABLE: &[(&str, &str)] = &[
    ("titan", "titans:zombie_titan"),
    ("zombie_titan", "titans:zombie_titan"),
    ("creeper_titan", "titans:creeper_titan"),
    ("skeleton_titan", "titans:skeleton_titan"),
    ("spider_titan", "titans:spider_titan"),
    ("blaze_titan", "titans:blaze_titan"),
    ("ghast_titan", "titans:ghast_titan"),
    ("slime_titan", "titans:slime_titan"),
    ("ender_colossus", "titans:ender_colossus"),
    ("witherzilla", "titans:witherzilla"),
    ("ultima_iron_golem", "titans:ultima_iron_golem_titan"),
];

/// Priority order matters: `zombie` wins over `spider` in `zombie_spider_titan`.
const TITAN_PREFIXES: &[(&str, &str)] = &[
    ("zombie", "titans:zombie_titan"),
    ("creeper", "titans:creeper_titan"),
    ("skeleton", "titans:skeleton_titan"),
    ("spider", "titans:spider_titan"),
    ("blaze", "titans:blaze_titan"),
    ("ghast", "titans:ghast_titan"),
    ("slime", "titans:slime_titan"),
];

/// Names that denote a creature kind rather than an individual.
const GENERIC_CREATURES: &[&str] = &[
    "zombie", "skeleton", "creeper", "cow", "sheep", "pig", "chicken", "dragon", "titan",
];

/// Lowercase, trimmed, spaces → underscores.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

fn is_sentinel_type(normalized: &str) -> bool {
    normalized.is_empty() || TYPE_SENTINELS.contains(&normalized)
}

fn namespaced(kind: &str) -> String {
    if kind.contains(':') {
        kind.to_string()
    } else {
        format!("{}:{}", DEFAULT_NAMESPACE, kind)
    }
}

// ---------------------------------------------------------------------------
// Identifier resolution
// ---------------------------------------------------------------------------

/// Map a declared type and display name to a concrete entity identifier.
pub fn resolve_entity(declared_type: Option<&str>, display_name: &str) -> String {
    let kind = declared_type.map(normalize).unwrap_or_default();
    if !is_sentinel_type(&kind) && !kind.contains("titan") {
        return namespaced(&kind);
    }

    let name = normalize(display_name);
    if let Some(id) = titan_identifier(&name) {
        return id.to_string();
    }
    if name.contains("dragon") {
        return DRAGON_ENTITY.to_string();
    }
    if name.is_empty() {
        return FALLBACK_ENTITY.to_string();
    }
    namespaced(&name)
}

/// Titan-family lookup on an already normalised name.
fn titan_identifier(name: &str) -> Option<&'static str> {
    if let Some((_, id)) = TITAN_TABLE.iter().find(|(key, _)| *key == name) {
        return Some(*id);
    }
    if !name.contains("titan") {
        return None;
    }
    let id = TITAN_PREFIXES
        .iter()
        .find(|(prefix, _)| name.contains(prefix))
        .map(|(_, id)| *id)
        .unwrap_or(GENERIC_TITAN);
    Some(id)
}

pub fn is_dragon(entity_id: &str) -> bool {
    entity_id.contains("ender_dragon")
}

// ---------------------------------------------------------------------------
// Spawn attributes
// ---------------------------------------------------------------------------

/// Custom name to attach on spawn, if the display name says something the
/// identifier does not.
pub fn custom_name(
    declared_type: Option<&str>,
    display_name: &str,
    entity_id: &str,
) -> Option<String> {
    let name = display_name.trim();
    if name.is_empty() {
        return None;
    }
    let lowered = name.to_lowercase();
    let normalized = normalize(name);
    let kind = declared_type.map(normalize).unwrap_or_default();

    if normalized == kind || entity_id.contains(&lowered) || entity_id.contains(&normalized) {
        return None;
    }
    Some(name.to_string())
}

/// NBT compound for a spawn command, empty when there is nothing to set.
pub fn spawn_attributes(custom_name: Option<&str>, entity_id: &str) -> String {
    let mut parts = Vec::new();
    if let Some(name) = custom_name {
        parts.push(format!("CustomName:'{}'", text_component(name)));
    }
    if is_dragon(entity_id) {
        // Phase 0 suppresses the default attack behaviour.
        parts.push("DragonPhase:0".to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

/// JSON text component, escaped for a single-quoted NBT string.
fn text_component(name: &str) -> String {
    let quoted = serde_json::Value::String(name.to_string()).to_string();
    format!("{{\"text\":{}}}", quoted).replace('\'', "\\'")
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// How a selector picks its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStrategy {
    /// Nearest entity of a type.
    ByType(String),
    /// Nearest entity with an exact custom name.
    ByName(String),
}

impl SelectorStrategy {
    pub fn render(&self) -> String {
        match self {
            Self::ByType(id) => format!("@e[type={},sort=nearest,limit=1]", id),
            Self::ByName(name) => format!(
                "@e[name=\"{}\",sort=nearest,limit=1]",
                name.replace('"', "\\\"")
            ),
        }
    }
}

/// Decide between type- and name-based selection.
///
/// Generic names (a creature keyword, the declared type itself, anything
/// dragon-like, or no name at all) select by type; everything else by exact
/// custom name.
pub fn selector_strategy(display_name: &str, declared_type: Option<&str>) -> SelectorStrategy {
    let name = normalize(display_name);
    let kind = declared_type.map(normalize).unwrap_or_default();

    let generic = name.is_empty()
        || GENERIC_CREATURES.contains(&name.as_str())
        || name == kind
        || name.contains("dragon");

    if generic {
        SelectorStrategy::ByType(resolve_entity(declared_type, display_name))
    } else {
        SelectorStrategy::ByName(display_name.trim().to_string())
    }
}

pub fn resolve_selector(display_name: &str, declared_type: Option<&str>) -> String {
    selector_strategy(display_name, declared_type).render()
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// What a spawn left behind for later reference.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegistryEntry {
    pub name: String,
    pub position: Coords,
    pub entity_id: String,
}

/// Actors spawned during one compilation pass, keyed by actor id.
///
/// Owned by a single assembler pass; never shared between passes.
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a spawn.  A later spawn of the same id replaces the entry.
    pub fn register(&mut self, actor_id: impl Into<String>, entry: RegistryEntry) {
        self.entries.insert(actor_id.into(), entry);
    }

    pub fn get(&self, actor_id: &str) -> Option<&RegistryEntry> {
        self.entries.get(actor_id)
    }

    pub fn contains(&self, actor_id: &str) -> bool {
        self.entries.contains_key(actor_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selector for a free-text reference: a registered actor id resolves
    /// through its display name, anything else is treated as a name.
    pub fn selector_for_reference(&self, reference: &str) -> String {
        match self.get(reference.trim()) {
            Some(entry) => resolve_selector(&entry.name, Some(&entry.entity_id)),
            None => resolve_selector(reference, None),
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup seam
// ---------------------------------------------------------------------------

/// Read-only access to spawned actors, as needed by camera interpolation.
pub trait ActorLookup {
    /// Display name of a spawned actor, if the id is known.
    fn display_name(&self, actor_id: &str) -> Option<&str>;
}

impl ActorLookup for EntityRegistry {
    fn display_name(&self, actor_id: &str) -> Option<&str> {
        self.get(actor_id).map(|e| e.name.as_str())
    }
}
