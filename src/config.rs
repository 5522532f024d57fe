use std::env;
use std::path::PathBuf;

pub(crate) const LOG_LEVEL_VAR: &str = "TOKENFORGE_LOG";
pub(crate) const LOG_DIR_VAR: &str = "TOKENFORGE_LOG_DIR";
const EDITOR_VAR: &str = "EDITOR";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings resolved from the environment, then overridden by CLI flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) log_level: String,
    /// `None` when no home directory can be located; logging is skipped.
    pub(crate) log_dir: Option<PathBuf>,
    pub(crate) editor: Option<String>,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_level = non_blank(LOG_LEVEL_VAR)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_dir = non_blank(LOG_DIR_VAR).map(PathBuf::from).or_else(|| {
            non_blank("USERPROFILE")
                .or_else(|| non_blank("HOME"))
                .map(|home| {
                    PathBuf::from(home)
                        .join(".config")
                        .join("tokenforge")
                        .join("logs")
                })
        });
        let editor = non_blank(EDITOR_VAR);

        Self {
            log_level,
            log_dir,
            editor,
        }
    }

    pub(crate) fn with_overrides(mut self, log_level: Option<&str>, log_dir: Option<PathBuf>) -> Self {
        if let Some(level) = log_level.map(str::trim).filter(|level| !level.is_empty()) {
            self.log_level = level.to_string();
        }
        if let Some(dir) = log_dir {
            self.log_dir = Some(dir);
        }
        self
    }
}
