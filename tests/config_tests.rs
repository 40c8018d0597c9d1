//! Integration tests for configuration loading
//!
//! File formats, the precedence chain, genuine plugin lists and the
//! settings-to-shield path.

use plugin_shield::config::{load_genuine_plugins, CliArgs, ConfigError, ShieldSettings};
use plugin_shield::stealth::{Addressable, PluginInfo, PluginShield, ProtectionLevel};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const GENUINE_JSON: &str = r#"[
    {
        "name": "Chrome PDF Viewer",
        "description": "Portable Document Format",
        "filename": "internal-pdf-viewer",
        "mimeTypes": [
            { "type": "application/pdf", "description": "Portable Document Format", "suffixes": "pdf" }
        ]
    },
    {
        "name": "Broken Plugin",
        "description": "",
        "filename": "broken.so"
    }
]"#;

// ============================================================================
// File Formats
// ============================================================================

#[test]
fn test_load_toml_settings() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "shield.toml",
        "protection_level = 2\nsession_seed = \"from-file\"\nverify = true\n",
    );

    let settings = ShieldSettings::from_file(&path).unwrap();
    assert_eq!(settings.protection_level, ProtectionLevel::Maximum);
    assert_eq!(settings.session_seed.as_deref(), Some("from-file"));
    assert!(settings.verify);
}

#[test]
fn test_load_json_settings_with_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "shield.json", r#"{"protection_level": 0}"#);

    let settings = ShieldSettings::from_file(&path).unwrap();
    assert_eq!(settings.protection_level, ProtectionLevel::Minimal);
    assert_eq!(settings.session_seed, None);
    assert!(!settings.verify);
}

#[test]
fn test_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "shield.yaml", "protection_level: 1");

    assert!(matches!(
        ShieldSettings::from_file(&path),
        Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
    ));
}

#[test]
fn test_out_of_range_level_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "shield.toml", "protection_level = 3\n");

    assert!(matches!(
        ShieldSettings::from_file(&path),
        Err(ConfigError::TomlParseError(_))
    ));
}

#[test]
fn test_settings_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let settings = ShieldSettings::default()
        .with_protection_level(ProtectionLevel::Minimal)
        .with_session_seed("round-trip");

    for name in ["out.toml", "out.json"] {
        let path = dir.path().join(name);
        settings.to_file(&path).unwrap();
        assert_eq!(ShieldSettings::from_file(&path).unwrap(), settings);
    }
}

// ============================================================================
// Precedence Chain
// ============================================================================

#[test]
fn test_cli_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "shield.toml", "protection_level = 2\nsession_seed = \"file\"\n");

    let args = CliArgs {
        config_file: Some(path),
        protection_level: Some(ProtectionLevel::Balanced),
        ..Default::default()
    };

    let settings = args.load_settings().unwrap();
    assert_eq!(settings.protection_level, ProtectionLevel::Balanced);
    assert_eq!(settings.session_seed.as_deref(), Some("file"));
}

#[test]
fn test_lookup_overrides_file_and_cli_overrides_lookup() {
    let file_settings = ShieldSettings::default().with_protection_level(ProtectionLevel::Maximum);

    let from_env = file_settings.merge_with_lookup(|key| match key {
        "PLUGIN_SHIELD_LEVEL" => Some("1".to_string()),
        "PLUGIN_SHIELD_SEED" => Some("env".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(from_env.protection_level, ProtectionLevel::Balanced);

    let args = CliArgs {
        session_seed: Some("cli".to_string()),
        ..Default::default()
    };
    let final_settings = from_env.merge_with_args(&args);
    assert_eq!(final_settings.protection_level, ProtectionLevel::Balanced);
    assert_eq!(final_settings.session_seed.as_deref(), Some("cli"));
}

#[test]
fn test_missing_genuine_file_fails_validation() {
    let args = CliArgs {
        genuine_plugins_path: Some(PathBuf::from("/definitely/not/here.json")),
        ..Default::default()
    };

    assert!(matches!(
        args.load_settings(),
        Err(ConfigError::ValidationError(_))
    ));
}

// ============================================================================
// Genuine Plugin Lists
// ============================================================================

#[test]
fn test_load_genuine_plugins() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "plugins.json", GENUINE_JSON);

    let plugins = load_genuine_plugins(&path).unwrap();
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0].name, "Chrome PDF Viewer");
    assert_eq!(plugins[0].mime_types.as_ref().unwrap()[0].mime_type, "application/pdf");
    assert_eq!(plugins[1].mime_types, None);
}

#[test]
fn test_invalid_genuine_plugins_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "plugins.json", r#"{"not": "a list"}"#);

    assert!(matches!(
        load_genuine_plugins(&path),
        Err(ConfigError::JsonError(_))
    ));
}

#[test]
fn test_settings_drive_shield_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "plugins.json", GENUINE_JSON);

    let settings = ShieldSettings::default()
        .with_protection_level(ProtectionLevel::Minimal)
        .with_session_seed("end-to-end")
        .with_genuine_plugins_path(&path);
    settings.validate().unwrap();

    let shield = PluginShield::with_random(settings.host().unwrap(), settings.session_random());
    let surface = shield.surface().unwrap();

    // The broken record is skipped; one farbled plugin plus two fakes remain.
    assert_eq!(surface.plugins().len(), 3);
    assert_eq!(surface.mime_types().len(), 1);
    assert!(surface.verify().is_ok());

    let again = PluginShield::with_random(settings.host().unwrap(), settings.session_random());
    assert_eq!(again.surface().unwrap().snapshot(), surface.snapshot());
}

#[test]
fn test_default_host_uses_chrome_plugins() {
    let settings = ShieldSettings::default()
        .with_protection_level(ProtectionLevel::Minimal)
        .with_session_seed("defaults");
    let shield = PluginShield::with_random(settings.host().unwrap(), settings.session_random());

    assert_eq!(
        shield.plugin_surface().unwrap().len(),
        PluginInfo::chrome_defaults().len() + 2
    );
}
