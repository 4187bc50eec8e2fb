use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Width of the initial date range, ending now
    pub lookback_years: u32,
    /// Seed the demo pair when the store starts out empty
    pub seed_demo_pair: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            lookback_years: 5,
            seed_demo_pair: true,
        }
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("database.path", "rates.db")?
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("dashboard.lookback_years", 5)?
        .set_default("dashboard.seed_demo_pair", true)?)
}

/// Loads `config/dashboard.toml` (optional), overridden by
/// `RATE_DASHBOARD__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = with_defaults(Config::builder())?
        .add_source(File::with_name("config/dashboard").required(false))
        .add_source(
            Environment::with_prefix("RATE_DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse_app_config(toml: &str) -> anyhow::Result<AppConfig> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse_app_config("").unwrap();
        assert_eq!(config.database.path, "rates.db");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.dashboard, DashboardSettings::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let toml = r#"
            [database]
            path = "/var/lib/rates/prod.db"

            [dashboard]
            lookback_years = 2
            seed_demo_pair = false
        "#;
        let config = parse_app_config(toml).unwrap();
        assert_eq!(config.database.path, "/var/lib/rates/prod.db");
        assert_eq!(config.dashboard.lookback_years, 2);
        assert!(!config.dashboard.seed_demo_pair);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }
}
