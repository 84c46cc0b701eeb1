use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use savefs::{
    decode, CodecRegistry, DirectoryAssets, Format, InMemoryAssets, JsonCodec, LocalStore,
    StoreConfig, XmlCodec,
};

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
struct SaveGame {
    slot: u8,
    player: String,
    gold: u64,
    best_time: Option<u32>,
    inventory: Vec<String>,
}

fn save_game() -> SaveGame {
    SaveGame {
        slot: 1,
        player: "Alice".to_string(),
        gold: 1250,
        best_time: Some(95),
        inventory: vec!["sword".to_string(), "lantern".to_string()],
    }
}

/// A save with the shapes text formats tend to lose.
fn new_game() -> SaveGame {
    SaveGame {
        slot: 2,
        player: "  Alice ".to_string(),
        gold: 0,
        best_time: None,
        inventory: vec![],
    }
}

#[test]
fn test_score_scenario_heals_corrupt_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), Format::JSON).unwrap();

    store.save("score", &42).unwrap();
    assert!(store.exists("score"));

    let file_path = dir.path().join("score.json");
    fs::write(&file_path, "not valid json {").unwrap();

    assert_eq!(store.load("score", 0), 0);

    let contents = fs::read(&file_path).unwrap();
    let healed: serde_json::Value = serde_json::from_slice(&contents).unwrap();
    assert_eq!(healed, serde_json::json!(0));
}

#[test]
fn test_roundtrip_in_every_format() {
    let dir = tempfile::tempdir().unwrap();

    for format in Format::builtin() {
        let store = LocalStore::new(dir.path(), format.clone()).unwrap();
        for (key, game) in [("slot-1", save_game()), ("slot-2", new_game())] {
            store.save(key, &game).unwrap();
            assert_eq!(
                store.load(key, SaveGame::default()),
                game,
                "format {}",
                format
            );
        }
    }

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "slot-1.binary",
            "slot-1.json",
            "slot-1.xml",
            "slot-2.binary",
            "slot-2.json",
            "slot-2.xml",
        ]
    );
}

#[test]
fn test_load_never_rewrites_a_valid_entry() {
    let dir = tempfile::tempdir().unwrap();

    for format in Format::builtin() {
        let store = LocalStore::new(dir.path(), format.clone()).unwrap();
        store.save("slot-2", &new_game()).unwrap();
        let file_path = store.address_of("slot-2").unwrap();
        let before = fs::read(&file_path).unwrap();

        assert_eq!(store.load("slot-2", save_game()), new_game(), "format {}", format);
        assert_eq!(fs::read(&file_path).unwrap(), before, "format {}", format);
    }
}

#[test]
fn test_overwrite_leaves_only_latest_value() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), Format::XML).unwrap();

    store.save("slot-1", &save_game()).unwrap();
    let poorer = SaveGame {
        gold: 3,
        best_time: None,
        inventory: vec![],
        ..save_game()
    };
    store.save("slot-1", &poorer).unwrap();

    assert_eq!(store.load("slot-1", SaveGame::default()), poorer);
}

#[test]
fn test_foreign_format_file_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let json = LocalStore::new(dir.path(), Format::JSON).unwrap();
    let xml = LocalStore::new(dir.path(), Format::XML).unwrap();

    json.save("slot-1", &save_game()).unwrap();
    // Put JSON bytes where the XML store expects its entry.
    fs::copy(
        json.address_of("slot-1").unwrap(),
        xml.address_of("slot-1").unwrap(),
    )
    .unwrap();

    let fallback = SaveGame {
        slot: 9,
        player: "new player".to_string(),
        ..SaveGame::default()
    };
    assert_eq!(xml.load("slot-1", fallback.clone()), fallback);
    assert_eq!(xml.try_load::<SaveGame>("slot-1").unwrap(), fallback);
    assert_eq!(json.load("slot-1", SaveGame::default()), save_game());
}

#[test]
fn test_missing_entry_load_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), Format::JSON).unwrap();
    assert!(!store.exists("settings"));

    let loaded = store.load("settings", save_game());
    assert_eq!(loaded, save_game());
    assert!(store.exists("settings"));

    let bytes = fs::read(store.address_of("settings").unwrap()).unwrap();
    let on_disk: SaveGame = decode(&JsonCodec, &bytes).unwrap();
    assert_eq!(on_disk, save_game());
}

#[test]
fn test_remove_then_load_reseeds() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), Format::BINARY).unwrap();

    store.save("slot-1", &save_game()).unwrap();
    assert_eq!(store.remove("slot-1").unwrap(), 1);
    assert!(!store.exists("slot-1"));

    assert_eq!(
        store.load("slot-1", SaveGame::default()),
        SaveGame::default()
    );
}

#[test]
fn test_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config: StoreConfig = serde_json::from_value(serde_json::json!({
        "root": dir.path(),
        "format": "xml",
    }))
    .unwrap();

    let store = LocalStore::from_config(config).unwrap();
    assert_eq!(store.format(), &Format::XML);

    store.save("slot-1", &save_game()).unwrap();
    assert!(dir.path().join("slot-1.xml").is_file());
}

#[test]
fn test_custom_xml_root_via_registry() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = CodecRegistry::with_builtin();
    registry.register(XmlCodec::with_root("save"));

    let store = LocalStore::with_registry(
        StoreConfig::new(dir.path(), Format::XML),
        Arc::new(registry),
    )
    .unwrap();
    store.save("slot-1", &save_game()).unwrap();

    let raw = fs::read_to_string(dir.path().join("slot-1.xml")).unwrap();
    assert!(raw.starts_with("<save>"));
    assert_eq!(store.load("slot-1", SaveGame::default()), save_game());
}

#[test]
fn test_bundle_defaults_then_persist() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("bundle");
    fs::create_dir(&bundle).unwrap();
    fs::write(
        bundle.join("new-game.json"),
        serde_json::to_vec(&save_game()).unwrap(),
    )
    .unwrap();

    let store = LocalStore::new(dir.path().join("saves"), Format::JSON).unwrap();
    let assets = DirectoryAssets::new(&bundle);

    let template: SaveGame = store.load_from_bundle(&assets, "new-game.json");
    assert_eq!(template, save_game());
    assert!(!store.exists("slot-1"));

    let loaded = store.load("slot-1", template);
    assert_eq!(loaded, save_game());
    assert!(store.exists("slot-1"));
}

#[test]
fn test_bundle_failure_returns_type_default_not_caller_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path(), Format::JSON).unwrap();
    let assets = InMemoryAssets::new().with_asset("broken", "{ truncated");

    let broken: SaveGame = store.load_from_bundle(&assets, "broken");
    let missing: SaveGame = store.load_from_bundle(&assets, "missing");
    assert_eq!(broken, SaveGame::default());
    assert_eq!(missing, SaveGame::default());

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
