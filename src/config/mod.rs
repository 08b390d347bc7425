mod settings;

pub use settings::{
    BackendSettings, Config, DisplaySettings, OverviewSettings, ReceivablesSettings,
};

use crate::error::{DashboardError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, falling back to ~/.portfolio/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "portfolio") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        DashboardError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".portfolio"))
}

/// Load config.toml from an initialized config directory
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(DashboardError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(DashboardError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| DashboardError::ConfigParse { path, source: e })
}

/// Load config.toml if present, otherwise the built-in defaults
pub fn load_config_or_default(config_dir: &Path) -> Result<Config> {
    if config_dir.join("config.toml").exists() {
        load_config(config_dir)
    } else {
        Ok(Config::default())
    }
}

pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Create the config directory with a template config.toml
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(DashboardError::AlreadyInitialized(config_dir.to_path_buf()));
    }
    fs::create_dir_all(config_dir)?;
    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[backend]
url = "https://your-project.supabase.co"
# api_key = "your-service-key"     # sent as apikey and bearer token
# rpc_path = "/rest/v1/rpc"        # path prefix of the stored procedures
# timeout_secs = 30                # unset = transport default

[display]
base_url = "http://localhost:3000"  # used by 'portfolio link'
color = true

[overview]
top_tenants = 8
expiry_years_ahead = 10
upcoming_expiries = 50

[receivables]
top_debtors = 8
open_items = 100
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_with_expected_defaults() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.backend.url, "https://your-project.supabase.co");
        assert_eq!(config.backend.api_key, None);
        assert_eq!(config.backend.rpc_path, "/rest/v1/rpc");
        assert_eq!(config.overview.top_tenants, 8);
        assert_eq!(config.overview.expiry_years_ahead, 10);
        assert_eq!(config.receivables.open_items, 100);
        assert!(config.display.color);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_config("[backend]\nurl = \"http://db\"\n").unwrap();
        assert_eq!(config.backend.url, "http://db");
        assert_eq!(config.display.base_url, "http://localhost:3000");
        assert_eq!(config.overview.upcoming_expiries, 50);
        assert_eq!(config.receivables.top_debtors, 8);
    }

    #[test]
    fn init_refuses_existing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = init_config_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DashboardError::AlreadyInitialized(_)));
    }
}
