//! Script loading and presence extraction against fixture screenplays.

use screenplay_graph::core::metadata::load_metadata_file;
use screenplay_graph::core::presence::{character_names, present_characters};
use screenplay_graph::core::script::{load_script, marker_count, split_scenes, MarkerMode};
use std::path::Path;

fn lakehouse_presence(mode: MarkerMode) -> Vec<Vec<String>> {
    let scenes = load_script(Path::new("tests/fixtures/scripts/lakehouse.txt"), mode).unwrap();
    let meta = load_metadata_file(Path::new("tests/fixtures/metadata/lakehouse.txt")).unwrap();
    present_characters(&scenes, &character_names(&meta))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn lakehouse_scene_count_matches_headings() {
    let text = std::fs::read_to_string("tests/fixtures/scripts/lakehouse.txt").unwrap();
    assert_eq!(marker_count(&text, MarkerMode::Anywhere), 6);
    let scenes = load_script(
        Path::new("tests/fixtures/scripts/lakehouse.txt"),
        MarkerMode::Anywhere,
    )
    .unwrap();
    assert_eq!(scenes.len(), 7);
}

#[test]
fn lakehouse_presence_per_scene() {
    let presence = lakehouse_presence(MarkerMode::Anywhere);
    assert_eq!(
        presence,
        vec![
            names(&[]),
            names(&["maya", "tommy"]),
            names(&["maya", "stranger"]),
            names(&["maya", "tommy", "stranger", "hollis"]),
            names(&["tommy", "hollis"]),
            names(&["hollis", "dispatch"]),
            names(&["maya", "tommy", "stranger", "hollis"]),
        ]
    );
}

#[test]
fn mayan_does_not_count_as_maya() {
    let presence = lakehouse_presence(MarkerMode::Anywhere);
    assert!(!presence[4].contains(&"maya".to_string()));
}

#[test]
fn line_start_mode_agrees_on_well_formed_script() {
    assert_eq!(
        lakehouse_presence(MarkerMode::Anywhere),
        lakehouse_presence(MarkerMode::LineStart)
    );
}

#[test]
fn two_scene_example_script() {
    let text = "INT. ROOM\nALICE BOB talk.\nEXT. STREET\nBOB CHARLIE walk.";
    let scenes = split_scenes(text, MarkerMode::Anywhere);
    let presence = present_characters(&scenes, &names(&["alice", "bob", "charlie"]));
    assert_eq!(
        presence,
        vec![names(&[]), names(&["alice", "bob"]), names(&["bob", "charlie"])]
    );
}

#[test]
fn script_without_headings_is_one_scene() {
    let scenes = load_script(
        Path::new("tests/fixtures/scripts/quiet_house.txt"),
        MarkerMode::Anywhere,
    )
    .unwrap();
    assert_eq!(scenes.len(), 1);
    assert!(scenes[0].contains("maya"));
}
