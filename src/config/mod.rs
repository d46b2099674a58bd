mod settings;

pub use settings::{ApiSettings, Config, DisplaySettings};

use crate::error::{DashError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.invoice-dash/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "invoice-dash") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.invoice-dash/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        DashError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".invoice-dash"))
}

pub fn config_file(config_dir: &Path) -> PathBuf {
    config_dir.join("config.toml")
}

/// Load config.toml, falling back to defaults when the file is absent
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_file(config_dir);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DashError::ConfigParse { path, source: e })
}

/// Resolve the effective config: file (or defaults) plus command-line overrides
pub fn resolve_config(config_dir: &Path, api_base: Option<&str>) -> Result<Config> {
    let mut config = load_config(config_dir)?;
    if let Some(base) = api_base {
        config.api.base_url = base.to_string();
    }
    config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
    Ok(config)
}

/// Create the config directory and write the template
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(DashError::AlreadyInitialized(config_dir.to_path_buf()));
    }
    fs::create_dir_all(config_dir)?;
    fs::write(config_file(config_dir), CONFIG_TEMPLATE)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:9090"   # invoicing API, without trailing slash
timeout_secs = 10

[display]
currency_symbol = "₹"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9090");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.display.currency_symbol, "₹");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://api\"\n").unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.display.currency_symbol, "₹");
    }

    #[test]
    fn empty_tables_keep_defaults() {
        let config: Config = toml::from_str("[api]\ntimeout_secs = 3\n\n[display]\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9090");
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.display.currency_symbol, "₹");
    }

    #[test]
    fn override_wins_and_trailing_slash_is_dropped() {
        let dir = std::env::temp_dir().join("invoice-dash-missing-config-dir");
        let config = resolve_config(&dir, Some("http://127.0.0.1:5000/")).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
    }
}
