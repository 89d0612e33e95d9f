use dc_viability::config::{self, Config, ConfigError};
use dc_viability::engine::EngineError;
use dc_viability::scenario::ScenarioConfig;
use tempfile::tempdir;

#[test]
fn default_config_round_trips_through_toml() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    let cfg = config::load_or_default(&path).expect("create");
    assert!(path.exists());
    let loaded = config::load(&path).expect("reload");
    assert_eq!(cfg, loaded);
    assert_eq!(loaded.scenario, ScenarioConfig::default());
}

#[test]
fn default_scenario_is_valid() {
    ScenarioConfig::default().validate().expect("default validates");
}

#[test]
fn tier_ratios_must_sum_to_one() {
    let mut cfg = Config::default();
    cfg.scenario.market.tiers[0].population_ratio = 0.6;
    let text = toml::to_string_pretty(&cfg).expect("serialize");
    let err = config::parse(&text).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(EngineError::Configuration(_))));
}

#[test]
fn duplicate_tier_names_are_rejected() {
    let mut cfg = Config::default();
    cfg.scenario.market.tiers[1].name = "free".into();
    assert!(cfg.scenario.validate().is_err());
}

#[test]
fn unknown_fields_fail_to_parse() {
    let cfg = Config::default();
    let text = toml::to_string_pretty(&cfg).expect("serialize");
    let text = text.replacen("[scenario.facility]", "[scenario.facility]\ncolour = \"blue\"", 1);
    assert!(matches!(config::parse(&text), Err(ConfigError::Parse(_))));
}

#[test]
fn default_power_source_must_exist() {
    let mut cfg = Config::default();
    cfg.scenario.power.default_source = "fusion".into();
    assert!(cfg.scenario.validate().is_err());
}

#[test]
fn zero_research_facility_count_is_rejected() {
    let mut cfg = Config::default();
    cfg.scenario.research.facility_count = 0;
    assert!(cfg.scenario.validate().is_err());
}

#[test]
fn pue_below_one_is_rejected() {
    let mut cfg = Config::default();
    cfg.scenario.facility.pue = 0.9;
    assert!(cfg.scenario.validate().is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn language_is_optional() {
    let mut cfg = Config::default();
    cfg.language = Some("en".into());
    let text = toml::to_string_pretty(&cfg).expect("serialize");
    assert!(text.starts_with("language = \"en\""));
    assert_eq!(config::parse(&text).expect("parse").language.as_deref(), Some("en"));
}

#[test]
fn zero_users_per_mw_is_rejected() {
    let mut cfg = Config::default();
    cfg.scenario.market.users_per_mw = 0.0;
    let err = cfg.scenario.validate().unwrap_err();
    assert!(matches!(err, EngineError::Configuration(msg) if msg.contains("users_per_mw")));
}
