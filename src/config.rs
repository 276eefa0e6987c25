use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::rate::CurrencyPair;
use crate::surface::{AuthorizationOptions, NotificationBehavior};
use crate::task::{EXCHANGE_RATE_TASK, TaskRegistration};

const LOCAL_CONFIG: &str = "ratewatch.toml";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rate: Option<RateConfig>,
    #[serde(default)]
    pub task: Option<TaskConfig>,
    #[serde(default)]
    pub notifications: Option<NotificationsConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RateConfig {
    pub endpoint: Option<String>,
    pub base: Option<String>,
    pub quote: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TaskConfig {
    pub minimum_interval_secs: Option<u64>,
    pub persist_across_termination: Option<bool>,
    pub start_on_boot: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct NotificationsConfig {
    pub show_alert: Option<bool>,
    pub play_sound: Option<bool>,
    pub set_badge: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl Config {
    /// Reads the user config file, falling back to `ratewatch.toml` in the
    /// working directory, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        for path in candidate_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config from {}", path.display()))
    }

    pub fn rate(&self) -> RateConfig {
        self.rate.clone().unwrap_or_default()
    }

    pub fn task(&self) -> TaskConfig {
        self.task.clone().unwrap_or_default()
    }

    pub fn notifications(&self) -> NotificationsConfig {
        self.notifications.clone().unwrap_or_default()
    }

    pub fn logging_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|logging| logging.level.clone())
            .unwrap_or_else(|| "info".to_string())
    }
}

impl RateConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or("https://api.exchangerate-api.com/v4")
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(
            self.base.as_deref().unwrap_or("CNY"),
            self.quote.as_deref().unwrap_or("JPY"),
        )
    }
}

impl TaskConfig {
    pub fn minimum_interval(&self) -> Duration {
        Duration::from_secs(self.minimum_interval_secs.unwrap_or(10 * 60))
    }

    pub fn registration(&self) -> TaskRegistration {
        TaskRegistration {
            task_id: EXCHANGE_RATE_TASK.to_string(),
            minimum_interval: self.minimum_interval(),
            persist_across_termination: self.persist_across_termination.unwrap_or(true),
            start_on_boot: self.start_on_boot.unwrap_or(true),
        }
    }
}

impl NotificationsConfig {
    pub fn behavior(&self) -> NotificationBehavior {
        let defaults = NotificationBehavior::default();
        NotificationBehavior {
            show_alert: self.show_alert.unwrap_or(defaults.show_alert),
            play_sound: self.play_sound.unwrap_or(defaults.play_sound),
            set_badge: self.set_badge.unwrap_or(defaults.set_badge),
        }
    }

    /// The authorization request asks for exactly the capabilities the
    /// configured presentation behavior will use.
    pub fn authorization_options(&self) -> AuthorizationOptions {
        let behavior = self.behavior();
        AuthorizationOptions {
            allow_alert: behavior.show_alert,
            allow_badge: behavior.set_badge,
            allow_sound: behavior.play_sound,
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ratewatch").join("config.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}
