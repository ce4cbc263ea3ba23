//! Scene character extraction — which known characters appear in each scene.

use crate::schema::character::CharacterMeta;
use crate::schema::scene::Scene;

/// Lowercase character names in metadata order.
pub fn character_names(characters: &[CharacterMeta]) -> Vec<String> {
    characters.iter().map(|c| c.name.clone()).collect()
}

/// Names present in a single scene, in `names` order.
///
/// Presence is a token membership test; how often a name occurs does not
/// matter.
pub fn scene_characters(scene: &Scene, names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| scene.contains(name))
        .cloned()
        .collect()
}

/// Per-scene presence lists, aligned with `scenes`.
pub fn present_characters(scenes: &[Scene], names: &[String]) -> Vec<Vec<String>> {
    scenes
        .iter()
        .map(|scene| scene_characters(scene, names))
        .collect()
}
