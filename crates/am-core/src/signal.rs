//! Signal-file path contract for the file-polling fallback.
//!
//! The server overwrites `<root>/projects/<project>/agents/<agent>.signal`
//! with one JSON [`NotificationEvent`](crate::NotificationEvent) on each new
//! notification; watchers poll the file's mtime.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Environment variable overriding the signals root directory.
pub const SIGNALS_DIR_ENV: &str = "NOTIFICATIONS_SIGNALS_DIR";

/// Default user-scoped signals root, under the home directory.
pub const DEFAULT_SIGNALS_SUBDIR: &str = ".agent_mail/signals";

/// Resolve the signals root: `NOTIFICATIONS_SIGNALS_DIR` if set, otherwise
/// `~/.agent_mail/signals`.
pub fn signals_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(SIGNALS_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Ok(home.join(DEFAULT_SIGNALS_SUBDIR))
}

/// Path of the signal file for one `(project, agent)` routing key.
pub fn signal_path(project: &str, agent: &str) -> Result<PathBuf> {
    Ok(signal_path_under(&signals_root()?, project, agent))
}

/// Same as [`signal_path`] but with an explicit root, for callers that
/// already resolved one (and for tests).
pub fn signal_path_under(root: &std::path::Path, project: &str, agent: &str) -> PathBuf {
    root.join("projects")
        .join(project)
        .join("agents")
        .join(format!("{agent}.signal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_layout() {
        let p = signal_path_under(std::path::Path::new("/tmp/signals"), "proj", "AgentA");
        assert_eq!(
            p,
            PathBuf::from("/tmp/signals/projects/proj/agents/AgentA.signal")
        );
    }
}
