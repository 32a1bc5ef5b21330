//! Restore graph cache
//!
//! Holds the last parsed assets file together with the modification time the
//! file had when it was parsed (the watermark). The slot always keeps a weak
//! reference to the graph; with [`Retention::Pinned`] (the default) it also
//! keeps the last graph alive, an LRU of one. Under [`Retention::Weak`] the
//! graph is freed as soon as the last caller drops it, and a reclaimed entry
//! is indistinguishable from a miss.

use crate::error::{LockscopeError, LockscopeResult};
use crate::model::{LockFileReader, ResolvedGraph};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Instant, SystemTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How strongly the cache holds on to a parsed graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    /// Only a weak reference; the graph lives as long as some caller holds it
    Weak,
    /// Additionally keep the most recent graph alive (an LRU of one)
    #[default]
    Pinned,
}

/// Result of a graph lookup
#[derive(Debug, Clone)]
pub struct GraphLookup {
    /// Parsed graph, `None` when the file is missing or unreadable
    pub graph: Option<Arc<ResolvedGraph>>,

    /// Whether the graph came from the cache without touching the file contents
    pub from_cache: bool,
}

impl GraphLookup {
    fn none() -> Self {
        Self {
            graph: None,
            from_cache: false,
        }
    }
}

/// Cached parse of one file at one watermark. Replaced as a whole.
struct CacheSlot {
    path: PathBuf,
    watermark: SystemTime,
    graph: Weak<ResolvedGraph>,
    pinned: Option<Arc<ResolvedGraph>>,
    /// False when the parse at this watermark failed
    parsed: bool,
}

enum SlotState {
    Hit(Arc<ResolvedGraph>),
    KnownBroken,
    Miss,
}

/// Cache of the parsed restore graph for a single project
pub struct RestoreGraphCache {
    reader: Arc<dyn LockFileReader>,
    retention: Retention,
    slot: Mutex<Option<CacheSlot>>,
}

impl RestoreGraphCache {
    pub fn new(reader: Arc<dyn LockFileReader>, retention: Retention) -> Self {
        Self {
            reader,
            retention,
            slot: Mutex::new(None),
        }
    }

    /// Get the graph for `path`, re-parsing only when the file changed
    ///
    /// A missing file yields no graph and drops any cached entry. A file that
    /// fails to parse also yields no graph, but its modification time is still
    /// recorded so it is not parsed again until it changes. Cancellation
    /// leaves the cached entry untouched.
    pub async fn get_graph(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> LockscopeResult<GraphLookup> {
        if cancel.is_cancelled() {
            return Err(LockscopeError::Cancelled);
        }

        let modified = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LockscopeError::Cancelled),
            modified = modified_time(path) => modified?,
        };

        let Some(modified) = modified else {
            debug!("Assets file {} not found", path.display());
            self.invalidate();
            return Ok(GraphLookup::none());
        };

        match self.lookup(path, modified) {
            SlotState::Hit(graph) => {
                debug!("Restore graph cache hit for {}", path.display());
                return Ok(GraphLookup {
                    graph: Some(graph),
                    from_cache: true,
                });
            }
            SlotState::KnownBroken => {
                debug!("Assets file {} unchanged since failed parse", path.display());
                return Ok(GraphLookup::none());
            }
            SlotState::Miss => {}
        }

        let graph = self.refresh(path, cancel).await?;
        self.store(path, modified, graph.as_ref());

        Ok(GraphLookup {
            graph,
            from_cache: false,
        })
    }

    /// Drop the cached entry
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    /// Modification time recorded at the last parse
    pub fn watermark(&self) -> Option<SystemTime> {
        self.lock().as_ref().map(|slot| slot.watermark)
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Parse on a blocking worker
    async fn refresh(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> LockscopeResult<Option<Arc<ResolvedGraph>>> {
        let reader = Arc::clone(&self.reader);
        let owned = path.to_path_buf();
        let started = Instant::now();
        let task = tokio::task::spawn_blocking(move || reader.read(&owned));

        // A cancelled parse keeps running to completion on the worker, its
        // result is discarded
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LockscopeError::Cancelled),
            joined = task => joined.map_err(|e| LockscopeError::Task(e.to_string()))?,
        };

        match result {
            Ok(graph) => {
                debug!(
                    "Parsed {} ({} targets, {} libraries) in {:?}",
                    path.display(),
                    graph.targets.len(),
                    graph.library_count(),
                    started.elapsed()
                );
                Ok(Some(Arc::new(graph)))
            }
            Err(e) => {
                warn!("Ignoring unreadable assets file: {}", e);
                Ok(None)
            }
        }
    }

    fn lookup(&self, path: &Path, modified: SystemTime) -> SlotState {
        let guard = self.lock();
        let Some(slot) = guard.as_ref() else {
            return SlotState::Miss;
        };

        if slot.path != path || modified > slot.watermark {
            return SlotState::Miss;
        }

        match slot.graph.upgrade() {
            Some(graph) => SlotState::Hit(graph),
            None if !slot.parsed => SlotState::KnownBroken,
            None => {
                debug!("Cached restore graph for {} was reclaimed", path.display());
                SlotState::Miss
            }
        }
    }

    fn store(&self, path: &Path, modified: SystemTime, graph: Option<&Arc<ResolvedGraph>>) {
        let slot = CacheSlot {
            path: path.to_path_buf(),
            watermark: modified,
            graph: graph.map(Arc::downgrade).unwrap_or_default(),
            pinned: match self.retention {
                Retention::Pinned => graph.cloned(),
                Retention::Weak => None,
            },
            parsed: graph.is_some(),
        };
        *self.lock() = Some(slot);
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheSlot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Modification time of a regular file, `None` if there is no such file
async fn modified_time(path: &Path) -> LockscopeResult<Option<SystemTime>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta
            .modified()
            .map(Some)
            .map_err(|e| LockscopeError::io(format!("reading mtime of {}", path.display()), e)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LockscopeError::io(
            format!("reading metadata of {}", path.display()),
            e,
        )),
    }
}
