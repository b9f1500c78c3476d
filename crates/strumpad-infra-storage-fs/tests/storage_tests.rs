use std::fs;
use std::path::PathBuf;
use strumpad_infra_storage_fs::FsStorage;
use strumpad_ports::storage::{SettingsDto, StoragePort};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("strumpad-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn missing_settings_file_yields_defaults() {
    let storage = FsStorage::new(scratch_dir("missing"));
    let settings = storage.load_settings().unwrap();

    assert_eq!(settings.report_length, 10);
    assert_eq!(
        settings.strumming.initial_notes,
        vec!["C4".to_string(), "E4".to_string(), "G4".to_string()]
    );
}

#[test]
fn saved_settings_round_trip() {
    let dir = scratch_dir("roundtrip");
    let storage = FsStorage::new(dir.clone());

    let mut settings = SettingsDto::default();
    settings.strumming.midi_channel = 5;
    settings.strumming.initial_notes =
        vec!["D3".to_string(), "F#3".to_string(), "A3".to_string()];
    settings.strum_release.active = true;
    storage.save_settings(&settings).unwrap();

    let loaded = storage.load_settings().unwrap();
    assert_eq!(loaded.strumming.midi_channel, 5);
    assert_eq!(
        loaded.strumming.initial_notes,
        settings.strumming.initial_notes
    );
    assert!(loaded.strum_release.active);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_settings_file_is_an_error_not_defaults() {
    let dir = scratch_dir("malformed");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("settings.json"), b"{ not json").unwrap();

    let storage = FsStorage::new(dir.clone());
    assert!(storage.load_settings().is_err());

    let _ = fs::remove_dir_all(&dir);
}
