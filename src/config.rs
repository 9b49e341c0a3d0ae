use std::path::PathBuf;

use once_cell::sync::OnceCell;

const CACHE_DIR: &str = "tennis_injury";
const DEFAULT_BATCH_THREADS: usize = 4;
const MAX_BATCH_THREADS: usize = 32;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub batch_threads: usize,
    pub log_filter: Option<String>,
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            batch_threads: DEFAULT_BATCH_THREADS,
            log_filter: None,
            export_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let batch_threads = non_empty("INJURY_BATCH_THREADS")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BATCH_THREADS)
            .clamp(1, MAX_BATCH_THREADS);
        Self {
            db_path: non_empty("INJURY_DB_PATH").map(PathBuf::from),
            batch_threads,
            log_filter: non_empty("INJURY_LOG"),
            export_dir: non_empty("INJURY_EXPORT_DIR").map(PathBuf::from),
        }
    }

    /// Configured database path, or the default under the user cache dir.
    pub fn resolved_db_path(&self) -> Option<PathBuf> {
        self.db_path.clone().or_else(crate::store::default_db_path)
    }
}

/// Reads `.env.local` then `.env`; missing files are ignored.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_env_gives_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn batch_threads_are_clamped_and_parsed() {
        let cfg = AppConfig::from_lookup(lookup(&[("INJURY_BATCH_THREADS", "0")]));
        assert_eq!(cfg.batch_threads, 1);
        let cfg = AppConfig::from_lookup(lookup(&[("INJURY_BATCH_THREADS", "500")]));
        assert_eq!(cfg.batch_threads, MAX_BATCH_THREADS);
        let cfg = AppConfig::from_lookup(lookup(&[("INJURY_BATCH_THREADS", "lots")]));
        assert_eq!(cfg.batch_threads, DEFAULT_BATCH_THREADS);
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("INJURY_DB_PATH", "  "),
            ("INJURY_LOG", "debug"),
            ("INJURY_EXPORT_DIR", "/tmp/out"),
        ]));
        assert_eq!(cfg.db_path, None);
        assert_eq!(cfg.log_filter.as_deref(), Some("debug"));
        assert_eq!(cfg.export_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cfg.resolved_db_path(), crate::store::default_db_path());
    }
}
