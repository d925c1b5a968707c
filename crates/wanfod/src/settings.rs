//! Config file loading and environment overrides

use anyhow::{Context, Result};
use std::path::Path;
use wanfo_core::FailoverConfig;

/// Overrides `log_level`
pub const ENV_LOG_LEVEL: &str = "WANFO_LOG_LEVEL";

/// Overrides `api.api_key`, keeping the secret out of the config file
pub const ENV_API_KEY: &str = "WANFO_API_KEY";

/// Read, override and validate the YAML config at `path`
pub fn load(path: &Path) -> Result<FailoverConfig> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Config file not found or unreadable: {}. Create it from config.example.yaml",
            path.display()
        )
    })?;

    let mut config = parse(&raw).with_context(|| format!("Error loading {}", path.display()))?;
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Parse YAML; missing fields take their defaults and an empty file is all defaults
pub fn parse(raw: &str) -> Result<FailoverConfig> {
    if raw.trim().is_empty() {
        return Ok(FailoverConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

/// Apply environment overrides; `lookup` is `std::env::var` outside tests
pub fn apply_overrides<F>(config: &mut FailoverConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        config.log_level = level.trim().to_string();
    }
    if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
        config.api.api_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::net::IpAddr;

    const EXAMPLE: &str = r#"
primary:
  name: primary
  interface: enp1s0
  display_name: Telekom Fiber
secondary:
  name: secondary
  interface: wwan0
  display_name: Vodafone LTE
ping_targets: [8.8.8.8, 1.1.1.1]
ping_timeout: 2
check_interval: 5
failure_threshold: 4
min_secondary_time: 60
gateway_state_dir: /run/wan-failover
api:
  host: 127.0.0.1
  port: 9000
  api_key: s3cret
log_level: debug
"#;

    #[test]
    fn parses_full_example() {
        let config = parse(EXAMPLE).unwrap();

        assert_eq!(config.primary.interface, "enp1s0");
        assert_eq!(config.secondary.display_name.as_deref(), Some("Vodafone LTE"));
        assert_eq!(config.ping_targets, vec![IpAddr::from([8, 8, 8, 8]), IpAddr::from([1, 1, 1, 1])]);
        assert_eq!(config.ping_timeout, 2.0);
        assert_eq!(config.failure_threshold, 4);
        assert_eq!(config.recovery_threshold, 5, "omitted fields take defaults");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, IpAddr::from([127, 0, 0, 1]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = parse("\n").unwrap();
        assert_eq!(config.primary.interface, "eth0");
        assert!(config.validate().is_err(), "placeholder API key must be replaced");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse("primary: [unclosed").is_err());
        assert!(parse("failure_threshold: many").is_err());
    }

    #[test]
    fn environment_overrides_win() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_LOG_LEVEL, "warn"), (ENV_API_KEY, "from-env")]);
        let mut config = parse(EXAMPLE).unwrap();

        apply_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.log_level, "warn");
        assert_eq!(config.api.api_key, "from-env");
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let mut config = parse(EXAMPLE).unwrap();
        apply_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api.api_key, "s3cret");
    }

    #[test]
    fn shipped_example_parses() {
        let mut config = parse(include_str!("../../../config.example.yaml")).unwrap();
        assert_eq!(config.ping_targets.len(), 3);
        assert_eq!(config.api.port, 8780);
        assert_eq!(
            config.log_file.as_deref(),
            Some(Path::new("/var/log/wan-failover.log"))
        );

        apply_overrides(&mut config, |key| (key == ENV_API_KEY).then(|| "k".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn log_file_is_optional() {
        let config = parse("log_file: null\n").unwrap();
        assert_eq!(config.log_file, None);

        let config = parse("log_file: /tmp/wanfo/daemon.log\n").unwrap();
        assert_eq!(config.log_file.as_deref(), Some(Path::new("/tmp/wanfo/daemon.log")));

        let config = parse("log_level: debug\n").unwrap();
        assert!(config.log_file.is_some(), "omitted log_file keeps the default");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("config.example.yaml"));
    }

    #[test]
    fn load_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.replace("wwan0", "enp1s0").as_bytes())
            .unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("interfaces must differ"));
    }
}
