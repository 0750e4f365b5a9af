use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "OwnBioScan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key under which the result history is stored.
pub const STORAGE_KEY: &str = "ownbioscan_test_results";

/// Key written and removed once at startup to check the medium is usable.
pub const PROBE_KEY: &str = "__storage_test__";

/// Results retained in the history; older insertions are dropped first.
pub const MAX_RESULTS: usize = 50;

/// Overrides the data directory when set.
pub const DATA_DIR_ENV: &str = "OWNBIOSCAN_DATA_DIR";

const HISTORY_DB_FILE: &str = "history.db";

/// Get the application data directory.
/// `$OWNBIOSCAN_DATA_DIR` if set, else ~/OwnBioScan/.
/// `None` when neither is available; callers fall back to memory storage.
pub fn app_data_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// Path of the SQLite history database inside a data directory.
pub fn history_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(HISTORY_DB_FILE)
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "ownbioscan_lib=info,ownbioscan=info,warn"
}
