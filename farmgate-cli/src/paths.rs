//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "market";
const ORGANIZATION: &str = "farmgate";
const APPLICATION: &str = "farmgate";

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the cache directory, where logs go.
///
/// - Linux: `$XDG_CACHE_HOME/farmgate` or `~/.cache/farmgate`
/// - macOS: `~/Library/Caches/market.farmgate.farmgate`
/// - Windows: `C:\Users\<User>\AppData\Local\farmgate\farmgate\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the config directory.
///
/// - Linux: `$XDG_CONFIG_HOME/farmgate` or `~/.config/farmgate`
/// - macOS: `~/Library/Application Support/market.farmgate.farmgate`
/// - Windows: `C:\Users\<User>\AppData\Roaming\farmgate\farmgate\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of `config.toml`.
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the latest log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}

/// Rotate logs: rename latest.log to a timestamped name and prune old logs.
///
/// Call this at startup before creating the new log file.
pub fn rotate_logs() {
    let Some(cache) = cache_dir() else { return };
    rotate_logs_in(&cache);
}

fn rotate_logs_in(cache: &Path) {
    let latest = cache.join("latest.log");
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.3f");
        let archived = cache.join(format!("{}.log", timestamp));
        let _ = fs::rename(&latest, &archived);
    }
    cleanup_old_logs(cache, MAX_OLD_LOGS);
}

/// Remove archived logs, keeping only the `keep` most recent.
fn cleanup_old_logs(cache: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(cache) else { return };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != "latest.log"
        })
        .collect();

    // Oldest first; names are timestamps so they break mtime ties.
    logs.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));

    if logs.len() > keep {
        for entry in logs.iter().take(logs.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("farmgate-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_rotate_archives_latest() {
        let dir = scratch_dir("rotate");
        fs::write(dir.join("latest.log"), "old run").unwrap();

        rotate_logs_in(&dir);

        assert!(!dir.join("latest.log").exists());
        let archived: Vec<_> = fs::read_dir(&dir).unwrap().filter_map(|e| e.ok()).collect();
        assert_eq!(archived.len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = scratch_dir("cleanup");
        for i in 0..5 {
            fs::write(dir.join(format!("2026010{}_000000.log", i)), "").unwrap();
        }
        fs::write(dir.join("latest.log"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        cleanup_old_logs(&dir, 2);

        let mut left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(
            left,
            ["20260103_000000.log", "20260104_000000.log", "latest.log", "notes.txt"]
        );
        let _ = fs::remove_dir_all(&dir);
    }
}
