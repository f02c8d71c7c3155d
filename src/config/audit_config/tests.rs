use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_normalize_id() {
    assert_eq!(normalize_id("title_length"), "title-length");
    assert_eq!(normalize_id(" Topical-Relevance "), "topical-relevance");
}

#[test]
fn test_default_config() {
    let config = AuditConfig::default();

    assert!(config.is_phase_enabled("metadata"));
    assert!(config.is_rule_enabled("metadata", "title-length"));
    assert!(config.phase_weight("metadata").is_none());
    assert!(config.severity_override("title-length").is_none());
    assert_eq!(config.scoring.penalties, SeverityPenalties::default());
    assert!(config.scoring.penalties.validate().is_ok());
}

#[test]
fn test_parse_toml_config() {
    let toml_content = r#"
[phases.topical-relevance]
weight = 2.0
disabled_rules = ["entity_coverage"]

[phases.page_experience]
enabled = false

[rules.title-length]
severity = "low"

[rules.cta-overload]
enabled = false

[scoring.penalties]
critical = 50.0

[thresholds]
min_words = 800

[defaults]
format = "json"
workers = 4
fail_under = 70
"#;

    let config: AuditConfig = toml::from_str(toml_content).expect("parse audit config");

    assert_eq!(config.phase_weight("topical-relevance"), Some(2.0));
    assert!(!config.is_rule_enabled("topical-relevance", "entity-coverage"));
    assert!(config.is_rule_enabled("topical-relevance", "keyword-density"));
    // snake_case table names still match
    assert!(!config.is_phase_enabled("page-experience"));
    assert!(!config.is_rule_enabled("calls-to-action", "cta-overload"));

    assert_eq!(config.severity_override("title-length"), Some(Severity::Low));

    let penalties = &config.scoring.penalties;
    assert!((penalties.critical - 50.0).abs() < f64::EPSILON);
    assert!((penalties.high - 20.0).abs() < f64::EPSILON);

    assert_eq!(config.thresholds.min_words, 800);
    assert_eq!(config.thresholds.max_ctas, 8);

    assert_eq!(config.defaults.format.as_deref(), Some("json"));
    assert_eq!(config.defaults.workers, Some(4));
    assert_eq!(config.defaults.fail_under, Some(70));
}

#[test]
fn test_bad_severity_override_is_ignored() {
    let config: AuditConfig = toml::from_str(
        "[rules.title-length]\nseverity = \"catastrophic\"\n[rules.viewport]\nseverity = \"internal-error\"",
    )
    .expect("parse");
    assert!(config.severity_override("title-length").is_none());
    assert!(config.severity_override("viewport").is_none());
}

#[test]
fn test_negative_penalty_rejected() {
    let penalties = SeverityPenalties {
        low: -5.0,
        ..Default::default()
    };
    match penalties.validate() {
        Err(AuditError::ScoringConfiguration(msg)) => assert!(msg.contains("low")),
        other => panic!("expected scoring configuration error, got {:?}", other),
    }

    let nan = SeverityPenalties {
        high: f64::NAN,
        ..Default::default()
    };
    assert!(nan.validate().is_err());
}

#[test]
fn test_cli_defaults_or() {
    let project = CliDefaults {
        format: Some("json".into()),
        workers: None,
        fail_under: Some(60),
    };
    let user = CliDefaults {
        format: Some("markdown".into()),
        workers: Some(2),
        fail_under: None,
    };
    let merged = project.or(&user);
    assert_eq!(merged.format.as_deref(), Some("json"));
    assert_eq!(merged.workers, Some(2));
    assert_eq!(merged.fail_under, Some(60));
}

#[test]
fn test_load_prefers_toml() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("pageaudit.toml"), "[defaults]\nworkers = 3\n").expect("write toml");
    fs::write(
        dir.path().join(".pageauditrc.json"),
        r#"{"defaults": {"workers": 9}}"#,
    )
    .expect("write json");

    let config = load_audit_config(dir.path());
    assert_eq!(config.defaults.workers, Some(3));
}

#[test]
fn test_load_json_config() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join(".pageauditrc.json"),
        r#"{"phases": {"metadata": {"weight": 3.0}}}"#,
    )
    .expect("write json");

    let config = load_audit_config(dir.path());
    assert_eq!(config.phase_weight("metadata"), Some(3.0));
}

#[test]
fn test_load_yaml_json_syntax_only() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(".pageaudit.yaml");
    fs::write(&path, r#"{"defaults": {"fail_under": 50}}"#).expect("write yaml");
    let config = load_config_file(&path).expect("json-syntax yaml loads");
    assert_eq!(config.defaults.fail_under, Some(50));

    fs::write(&path, "defaults:\n  fail_under: 50\n").expect("write yaml");
    assert!(load_config_file(&path).is_err());
}

#[test]
fn test_broken_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("pageaudit.toml"), "[[[ not toml").expect("write");
    let config = load_audit_config(dir.path());
    assert!(config.phases.is_empty());
}

#[test]
fn test_missing_dir_uses_defaults() {
    let config = load_audit_config(Path::new("/nonexistent/pageaudit"));
    assert!(config.rules.is_empty());
}
