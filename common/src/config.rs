use serde::Deserialize;
use std::sync::LazyLock;

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".into());
    let config_file = std::fs::read_to_string(path).expect("failed to open config file");
    Config::from_yaml(&config_file).expect("failed to parse config file")
});

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    pub postgres: Option<Postgres>,
    pub feed: Feed,
    pub admin: Admin,
    #[serde(default)]
    pub cleanup: Cleanup,
    pub loki: Option<Loki>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Postgres {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db_name: String,
}

/// Credentials the inventory feed provider sends with every webhook call.
#[derive(Deserialize, Clone, Debug)]
pub struct Feed {
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub delete_mode: DeleteMode,
}

/// What a feed `delete` action does to the stored listing.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Keep the listing as `sold` until the sold sweep removes it.
    #[default]
    MarkSold,
    HardDelete,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Admin {
    pub user: String,
    pub password: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Cleanup {
    pub secret: Option<String>,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl Default for Cleanup {
    fn default() -> Self {
        Self {
            secret: None,
            retention_days: default_retention_days(),
            interval_hours: default_interval_hours(),
        }
    }
}

fn default_retention_days() -> u32 {
    7
}

fn default_interval_hours() -> u64 {
    6
}

#[derive(Deserialize, Clone, Debug)]
pub struct Loki {
    pub url: String,
}
