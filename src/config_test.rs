// Tests for config persistence

use super::*;
use tempfile::tempdir;

#[test]
fn test_default_settings() {
    let settings = AppSettings::default();
    assert!(!settings.run_at_startup);
    assert!(!settings.start_minimized);
    assert_eq!(settings.toggle_key, Key::F12);
    assert!(settings.toggle_ctrl);
    assert!(settings.toggle_alt);
    assert!(!settings.toggle_shift);
    assert!(!settings.toggle_win);
}

#[test]
fn test_default_rules() {
    let rules = default_rules();
    assert_eq!(rules.len(), 2);

    assert_eq!(rules[0].name, "No WinKey");
    assert_eq!(rules[0].key, Key::LWin);
    assert!(rules[0].require_win);
    assert!(rules[0].active);

    assert_eq!(rules[1].name, "No Alt-Tab");
    assert_eq!(rules[1].key, Key::Tab);
    assert!(rules[1].require_alt);
    assert!(rules[1].active);
}

#[test]
fn test_toggle_hotkey_from_settings() {
    let hotkey = AppSettings::default().toggle_hotkey();
    assert_eq!(hotkey.key, Key::F12);
    assert!(hotkey.ctrl);
    assert!(hotkey.alt);
    assert!(!hotkey.shift);
    assert!(!hotkey.win);
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope").join("config.json");
    let data = load_from(&path);
    assert_eq!(data, ConfigData::default());
}

#[test]
fn test_corrupt_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json at all").unwrap();

    let data = load_from(&path);
    assert_eq!(data, ConfigData::default());
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keyfence").join("config.json");

    let mut data = ConfigData::default();
    data.settings.toggle_key = Key::Pause;
    data.settings.toggle_shift = true;
    data.rules.push(BlockRule {
        name: "No Escape".to_string(),
        key: Key::Escape,
        active: false,
        ..Default::default()
    });

    save_to(&path, &data).unwrap();
    let reloaded = load_from(&path);
    assert_eq!(reloaded, data);
}

#[test]
fn test_settings_json_field_names() {
    let json = serde_json::to_value(AppSettings::default()).unwrap();
    assert_eq!(json["runAtStartup"], false);
    assert_eq!(json["startMinimized"], false);
    assert_eq!(json["toggleKey"], "F12");
    assert_eq!(json["toggleCtrl"], true);
    assert_eq!(json["toggleAlt"], true);
}

#[test]
fn test_partial_config_fills_defaults() {
    let data: ConfigData =
        serde_json::from_str(r#"{"settings": {"toggleKey": "F9"}}"#).unwrap();
    assert_eq!(data.settings.toggle_key, Key::F9);
    // Unspecified settings and rules come from the defaults.
    assert!(data.settings.toggle_ctrl);
    assert_eq!(data.rules, default_rules());
}
