//! CLI command implementations

pub mod config;
pub mod endpoints;
pub mod graph;
pub mod packages;

pub use config::execute as config;
pub use endpoints::execute as endpoints;
pub use graph::execute as graph;
pub use packages::execute as packages;

use crate::config::Config;
use crate::error::LockscopeError;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Accept either an assets file or a project directory
pub(crate) fn resolve_assets_path(path: &Path, config: &Config) -> PathBuf {
    if path.is_dir() {
        path.join(&config.assets.obj_dir)
            .join(&config.assets.file_name)
    } else {
        path.to_path_buf()
    }
}

/// Token cancelled when the user hits Ctrl-C
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling");
            trigger.cancel();
        }
    });
    token
}

/// Explain why no graph could be produced for `path`
pub(crate) fn missing_graph_error(path: &Path) -> LockscopeError {
    if path.exists() {
        LockscopeError::assets_parse(path, "file could not be read as an assets file")
    } else {
        LockscopeError::AssetsNotFound(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directory_resolves_to_obj_assets() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_assets_path(dir.path(), &Config::default());
        assert_eq!(resolved, dir.path().join("obj").join("project.assets.json"));
    }

    #[test]
    fn file_path_is_kept() {
        let path = Path::new("/nonexistent/custom.assets.json");
        assert_eq!(resolve_assets_path(path, &Config::default()), path);
    }

    #[test]
    fn missing_graph_error_kinds() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            missing_graph_error(&missing),
            LockscopeError::AssetsNotFound(_)
        ));

        let present = dir.path().join("broken.json");
        std::fs::write(&present, "{").unwrap();
        assert!(matches!(
            missing_graph_error(&present),
            LockscopeError::AssetsParse { .. }
        ));
    }
}
