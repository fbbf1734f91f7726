use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tasklane_core::models::{TaskPriority, DEFAULT_CATEGORY};

pub const CONFIG_FILE: &str = "tasklane.toml";
pub const ENV_PREFIX: &str = "TASKLANE_";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite database file, or `:memory:`
    pub database_path: String,
    pub default_category: String,
    pub default_priority: TaskPriority,
    /// Categories offered to the user; others are accepted with a warning
    pub categories: Vec<String>,
    /// Filter used when `TASKLANE_LOG` is unset and no `-v` is given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "tasklane.db".to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            default_priority: TaskPriority::default(),
            categories: ["Personal", "Work", "Shopping", "Health"]
                .into_iter()
                .map(String::from)
                .collect(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            // TASKLANE_LOG belongs to the log filter, not to this struct
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]))
            .extract()
    }

    pub fn is_known_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}
