use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-user UI state persisted across sessions.
/// Stored at ~/.local/share/multitool/state.json.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UserState {
    /// Name of the active color theme (e.g. "nord").  Empty = use config.
    #[serde(default)]
    pub theme_name: String,
}

impl UserState {
    fn path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("multitool").join("state.json"))
    }

    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match serde_json::to_string_pretty(self) {
                Ok(s)  => { let _ = std::fs::write(path, s); }
                Err(e) => tracing::debug!(error = %e, "could not serialise UI state"),
            }
        }
    }
}
