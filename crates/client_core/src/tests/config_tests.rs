use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_settings_file(tag: &str, contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("luxew_client_config_{tag}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(SETTINGS_FILE);
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_match_the_documented_constants() {
    let settings = ClientSettings::default();
    assert_eq!(settings.probe_timeout(), Duration::from_secs(5));
    assert_eq!(settings.call_timeout(), Duration::from_secs(10));
    assert_eq!(settings.default_role, "visiteur");
    assert_eq!(
        settings.endpoint().expect("endpoint").query(),
        Some("wsdl")
    );
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/luxew-client.toml"), no_env);
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn file_values_override_defaults_and_keep_unset_fields() {
    let path = temp_settings_file(
        "file",
        "endpoint_url = \"http://soap.example.org/soap.php?wsdl\"\ncall_timeout_secs = 30\n",
    );
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.endpoint_url, "http://soap.example.org/soap.php?wsdl");
    assert_eq!(settings.call_timeout_secs, 30);
    assert_eq!(settings.probe_timeout_secs, 5);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn environment_overrides_file_and_ignores_bad_numbers() {
    let path = temp_settings_file("env", "endpoint_url = \"http://from-file/soap.php?wsdl\"\n");
    let env_values: HashMap<&str, &str> = HashMap::from([
        ("APP__SOAP_URL", "http://from-env/soap.php?wsdl"),
        ("APP__PROBE_TIMEOUT_SECS", "2"),
        ("APP__CALL_TIMEOUT_SECS", "soon"),
    ]);
    let settings = load_settings_from(&path, |name| env_values.get(name).map(|v| v.to_string()));
    assert_eq!(settings.endpoint_url, "http://from-env/soap.php?wsdl");
    assert_eq!(settings.probe_timeout_secs, 2);
    assert_eq!(settings.call_timeout_secs, 10);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn invalid_endpoint_is_reported() {
    let settings = ClientSettings {
        endpoint_url: "not a url".to_string(),
        ..ClientSettings::default()
    };
    assert!(settings.endpoint().is_err());
}
