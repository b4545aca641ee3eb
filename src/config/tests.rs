use super::*;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Configuration::default();

    assert_eq!(config.min_value_length, 2);
    assert_eq!(config.context_length, 10);
    assert_eq!(config.max_number_of_appearances, 500);
    assert!(config.ignore_boolean_values);
    assert!(config.requested_parameters.is_empty());
    assert!(config.ignored_parameters.contains(&"password".to_string()));
    assert!(config.ignored_headers.contains(&"User-Agent".to_string()));
    assert!(!config.accept_original_orphans);
}

#[test]
fn test_appearance_limit() {
    let mut config = Configuration::default();
    assert_eq!(config.appearance_limit(), Some(500));
    assert!(config.exceeds_appearance_limit(501));
    assert!(!config.exceeds_appearance_limit(500));

    config.set_max_number_of_appearances(UNBOUNDED_APPEARANCES);
    assert_eq!(config.appearance_limit(), None);
    assert!(!config.exceeds_appearance_limit(usize::MAX));
}

#[test]
fn test_ignore_lists_are_case_insensitive() {
    let config = Configuration::default();

    assert!(config.is_ignored_header("user-agent"));
    assert!(config.is_ignored_header(" HOST "));
    assert!(config.is_ignored_parameter("Password"));
    assert!(!config.is_ignored_parameter("csrf"));
}

#[test]
fn test_ignored_domains_and_files() {
    let config = Configuration::default();

    assert!(config.is_ignored_domain("push.services.mozilla.com"));
    assert!(!config.is_ignored_domain("shop.example.com"));
    assert!(config.is_ignored_file("/static/app.min.js?v=3"));
    assert!(config.is_ignored_file("/img/LOGO.PNG"));
    assert!(!config.is_ignored_file("/api/json/items"));
    assert!(!config.is_ignored_file("/.well-known"));
    assert!(config.is_ignored_content_type("image/png"));
    assert!(!config.is_ignored_content_type("application/json; charset=utf-8"));
}

#[test]
fn test_requested_parameters_are_unique() {
    let mut config = Configuration::default();
    config.add_requested_parameters(["token", "token", "nonce"]);

    assert_eq!(config.requested_parameters, vec!["token", "nonce"]);
    assert!(config.is_requested("nonce"));
}

#[test]
fn test_merge_env_overrides() {
    let mut config = Configuration::default();
    config
        .merge_env_from(lookup(&[
            ("AUTOCORRELATE_MIN_VALUE_LENGTH", "4"),
            ("AUTOCORRELATE_MAX_APPEARANCES", "-1"),
            ("AUTOCORRELATE_IGNORE_BOOLEAN_VALUES", "false"),
            ("AUTOCORRELATE_IGNORED_PARAMETERS", " sid , , lang "),
        ]))
        .unwrap();

    assert_eq!(config.min_value_length, 4);
    assert_eq!(config.appearance_limit(), None);
    assert!(!config.ignore_boolean_values);
    assert_eq!(config.ignored_parameters, vec!["sid", "lang"]);
    assert_eq!(config.ignored_files, Configuration::default().ignored_files);
}

#[test]
fn test_merge_env_rejects_bad_numbers() {
    let mut config = Configuration::default();
    let err = config
        .merge_env_from(lookup(&[("AUTOCORRELATE_CONTEXT_LENGTH", "wide")]))
        .unwrap_err();

    assert!(matches!(err, CorrelationError::Config(_)));
    assert!(err.to_string().contains("AUTOCORRELATE_CONTEXT_LENGTH"));
}

#[test]
fn test_parse_toml_keeps_defaults_for_missing_fields() {
    let config = loader::parse_config(
        std::path::Path::new("correlation.toml"),
        r#"
min_value_length = 3
requested_parameters = ["nonce"]
accept_equal_appearances = true
"#,
    )
    .unwrap();

    assert_eq!(config.min_value_length, 3);
    assert_eq!(config.context_length, 10);
    assert_eq!(config.requested_parameters, vec!["nonce"]);
    assert!(config.accept_equal_appearances);
}

#[test]
fn test_parse_rejects_unknown_extension() {
    let err = loader::parse_config(std::path::Path::new("config.ini"), "").unwrap_err();
    assert!(matches!(err, CorrelationError::Config(_)));
}

#[tokio::test]
async fn test_loader_reads_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("correlation.yaml");
    fs::write(
        &path,
        "context_length: 6\nignored_files:\n  - png\nmax_number_of_appearances: 20\n",
    )
    .unwrap();

    let config = ConfigLoader::new().load(Some(&path)).await.unwrap();

    assert_eq!(config.context_length, 6);
    assert_eq!(config.ignored_files, vec!["png"]);
    assert_eq!(config.appearance_limit(), Some(20));
}

#[tokio::test]
async fn test_loader_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let err = ConfigLoader::new().load(Some(&path)).await.unwrap_err();
    assert!(matches!(err, CorrelationError::Io(_)));
}
