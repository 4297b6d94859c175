use drawing2ai::options::{ArtStyle, DrawingTool, Quality};
use drawing2ai::settings::{Settings, OPENAI_API_KEY_ENV, REPLICATE_API_TOKEN_ENV};
use serial_test::serial;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.debounce(), Duration::from_millis(500));
    assert_eq!(settings.describe_model, "gpt-4o-mini");
    assert!(settings.enable_toasts);
}

#[test]
fn save_then_load_keeps_choices() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let settings = Settings {
        default_tool: DrawingTool::Polygon,
        default_stroke_width: 9,
        default_quality: Quality::Ultra,
        default_style: ArtStyle::Cartoon,
        debounce_ms: 800,
        ..Settings::default()
    };
    settings.save(path).unwrap();

    let raw = std::fs::read_to_string(path).unwrap();
    assert!(raw.contains(r#""default_tool": "polygon""#));

    let loaded = Settings::load(path).unwrap();
    let params = loaded.initial_params();
    assert_eq!(params.tool, DrawingTool::Polygon);
    assert_eq!(params.stroke_width, 9);
    assert_eq!(params.steps(), 20);
    assert_eq!(params.style, ArtStyle::Cartoon);
    assert_eq!(loaded.debounce(), Duration::from_millis(800));
}

#[test]
fn invalid_endpoint_fails_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "replicate_api_base": "not a url" }"#).unwrap();
    let err = Settings::load(path.to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("replicate_api_base"));
}

#[test]
#[serial]
fn credentials_fall_back_to_environment() {
    std::env::set_var(OPENAI_API_KEY_ENV, "sk-from-env");
    std::env::set_var(REPLICATE_API_TOKEN_ENV, " r8-from-env ");
    let settings = Settings::default();
    assert_eq!(settings.openai_api_key().as_deref(), Some("sk-from-env"));
    assert_eq!(settings.replicate_api_token().as_deref(), Some("r8-from-env"));

    let configured = Settings {
        openai_api_key: Some("sk-from-file".into()),
        ..Settings::default()
    };
    assert_eq!(configured.openai_api_key().as_deref(), Some("sk-from-file"));

    std::env::remove_var(OPENAI_API_KEY_ENV);
    std::env::remove_var(REPLICATE_API_TOKEN_ENV);
}

#[test]
#[serial]
fn clients_refuse_to_build_without_credentials() {
    std::env::remove_var(OPENAI_API_KEY_ENV);
    std::env::remove_var(REPLICATE_API_TOKEN_ENV);
    let settings = Settings::default();
    assert!(drawing2ai::remote::DescriptionClient::from_settings(&settings).is_err());
    assert!(drawing2ai::remote::SynthesisClient::from_settings(&settings).is_err());
}
