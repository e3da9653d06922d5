use super::*;

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("explorer_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("explorer.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn missing_optional_file_yields_defaults() {
    let settings = settings_from(Path::new("does-not-exist.toml"), false, HashMap::new())
        .expect("settings");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.model, "gemini-2.5-flash");
}

#[test]
fn missing_required_file_is_an_error() {
    assert!(settings_from(Path::new("does-not-exist.toml"), true, HashMap::new()).is_err());
}

#[test]
fn file_values_are_overridden_by_app_env() {
    let path = temp_config(
        "model = \"gemini-file\"\ntemperature = 0.4\nplanner_by_default = true\nexport_dir = \"plans\"\n",
    );

    let settings = settings_from(
        &path,
        true,
        env_of(&[("APP__MODEL", "gemini-env"), ("APP__LOG_FILTER", "debug")]),
    )
    .expect("settings");

    assert_eq!(settings.model, "gemini-env");
    assert_eq!(settings.log_filter, "debug");
    assert!((settings.temperature - 0.4).abs() < f32::EPSILON);
    assert!(settings.planner_by_default);
    assert_eq!(settings.export_dir, PathBuf::from("plans"));

    if let Some(dir) = path.parent() {
        fs::remove_dir_all(dir).expect("cleanup");
    }
}

#[test]
fn bare_key_variables_fill_in_a_missing_key() {
    let settings = settings_from(
        Path::new("does-not-exist.toml"),
        false,
        env_of(&[("API_KEY", "from-api-key"), ("GEMINI_API_KEY", "from-gemini")]),
    )
    .expect("settings");
    assert_eq!(settings.api_key.as_deref(), Some("from-gemini"));

    let settings = settings_from(
        Path::new("does-not-exist.toml"),
        false,
        env_of(&[("APP__API_KEY", "from-app"), ("GEMINI_API_KEY", "from-gemini")]),
    )
    .expect("settings");
    assert_eq!(settings.api_key.as_deref(), Some("from-app"));
}

#[test]
fn blank_key_counts_as_missing() {
    let settings = settings_from(
        Path::new("does-not-exist.toml"),
        false,
        env_of(&[("APP__API_KEY", "  "), ("GEMINI_API_KEY", "")]),
    )
    .expect("settings");
    assert_eq!(settings.api_key, None);
}
