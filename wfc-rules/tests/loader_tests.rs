use std::fs;
use tempfile::tempdir;
use wfc_rules::loader::{load_catalogue, load_from_file};
use wfc_rules::{Direction, LoadError};

fn test_data_path(filename: &str) -> std::path::PathBuf {
    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("rules_data");
    path.push(filename);
    path
}

#[test]
fn test_load_circuit_catalogue() {
    let tiles = load_catalogue(&test_data_path("circuit.ron")).unwrap();
    assert_eq!(tiles.len(), 5);
    assert_eq!(tiles[2].id, "corner");
    assert_eq!(tiles[2].sockets, 0b1100);

    let rules = load_from_file(&test_data_path("circuit.ron")).unwrap();
    assert_eq!(rules.len(), 12);

    let blank = rules.id_of("blank_0").unwrap();
    let cross = rules.id_of("cross_0").unwrap();
    assert!(rules.permits(cross, cross, Direction::Left));
    assert!(!rules.permits(blank, cross, Direction::Down));
    assert!(rules.id_of("straight_2").is_none());
}

#[test]
fn test_load_duplicate_ids_is_invalid() {
    let result = load_from_file(&test_data_path("duplicate_ids.ron"));
    assert!(matches!(result, Err(LoadError::InvalidData(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = load_from_file(&dir.path().join("missing.ron"));
    assert!(matches!(result, Err(LoadError::Io(_))));
}

#[test]
fn test_load_empty_tile_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.ron");
    fs::write(&path, "(tiles: [])").unwrap();
    let result = load_from_file(&path);
    assert!(matches!(result, Err(LoadError::InvalidData(_))));
}

#[test]
fn test_load_garbage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.ron");
    fs::write(&path, "this is not ron").unwrap();
    let result = load_from_file(&path);
    assert!(matches!(result, Err(LoadError::ParseError(_))));
}
