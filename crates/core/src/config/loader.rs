use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Nested keys are separated by a double underscore, e.g.
/// `SEEDMATCH_POLICY__ADD_LIMIT_PERCENT=10`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("SEEDMATCH_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[index]
source_roots = ["/data"]

[linker]
store_path = "/srv/links"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.index.source_roots.len(), 1);
    }

    #[test]
    fn test_load_config_from_str_missing_linker() {
        let toml = r#"
[policy]
add_limit_size = 10
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[index]
source_roots = ["/data/a", "/data/b"]
exact_mode = true

[linker]
store_path = "/srv/links"
link_type = "hard"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.index.source_roots.len(), 2);
        assert!(config.index.exact_mode);
        assert_eq!(config.linker.store_path.to_str().unwrap(), "/srv/links");
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[linker]
store_path = "/srv/links"

[policy]
add_limit_size = 1
"#
        )
        .unwrap();

        std::env::set_var("SEEDMATCH_POLICY__ADD_LIMIT_SIZE", "4096");
        let config = load_config(temp_file.path());
        std::env::remove_var("SEEDMATCH_POLICY__ADD_LIMIT_SIZE");

        let config = config.unwrap();
        assert_eq!(config.policy.add_limit_size, 4096);
        assert_eq!(config.linker.link_type, crate::linker::LinkType::Soft);
    }
}
