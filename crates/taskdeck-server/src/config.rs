use std::env;
use std::path::PathBuf;

/// Runtime settings, environment-driven with container-friendly defaults:
/// the image contract is "migrate, then listen on 0.0.0.0:8000".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            db_path: PathBuf::from("taskdeck.sqlite"),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_string("TASKDECK_ADDR", &defaults.bind_addr),
            db_path: PathBuf::from(env_string(
                "TASKDECK_DB",
                &defaults.db_path.display().to_string(),
            )),
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_container_contract() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.db_path, PathBuf::from("taskdeck.sqlite"));
    }

    #[test]
    fn blank_env_values_fall_back_to_defaults() {
        assert_eq!(env_string("TASKDECK_TEST_UNSET_VAR", "x"), "x");
    }
}
