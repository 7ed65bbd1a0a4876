use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ObservabilityConfig {
    /// Parsed subscriber level; unknown names fall back to `INFO`.
    pub fn level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_known_names() {
        let config = ObservabilityConfig {
            log_level: "debug".into(),
        };
        assert_eq!(config.level(), Level::DEBUG);
    }

    #[test]
    fn level_falls_back_to_info() {
        let config = ObservabilityConfig {
            log_level: "chatty".into(),
        };
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(ObservabilityConfig::default().level(), Level::INFO);
    }
}
