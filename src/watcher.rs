// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Rebuild-on-change support for recordings.
//!
//! Editors and exporters replace files in different ways (truncate and
//! write, write a temp file and rename, ...). The watcher therefore watches
//! the parent directory and filters events by file name.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use log::debug;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

/// Changes arriving within this window are collapsed into one rebuild.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// Errors while watching recordings.
#[derive(Debug, Error)]
pub enum WatchError {
    /// A path could not be resolved.
    #[error("Cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file system watcher failed.
    #[error("File watch error: {0}")]
    Notify(#[from] notify::Error),

    /// The event channel was closed.
    #[error("Watch channel closed")]
    Closed,
}

/// Watches recording files for changes.
pub struct RecordingWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    paths: Vec<PathBuf>,
}

impl RecordingWatcher {
    /// Start watching `paths`.
    pub fn new(paths: &[PathBuf]) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;

        let mut canonical_paths = Vec::new();
        let mut watched_dirs = std::collections::HashSet::new();

        for path in paths {
            let canonical = path.canonicalize().map_err(|source| WatchError::Resolve {
                path: path.clone(),
                source,
            })?;

            if let Some(parent) = canonical.parent() {
                if watched_dirs.insert(parent.to_path_buf()) {
                    watcher.watch(parent, RecursiveMode::NonRecursive)?;
                }
            }

            canonical_paths.push(canonical);
        }

        Ok(Self {
            _watcher: watcher,
            rx,
            paths: canonical_paths,
        })
    }

    /// The watched files.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Block until a watched file changed.
    pub fn wait_for_change(&self) -> Result<(), WatchError> {
        loop {
            let event = self.rx.recv().map_err(|_| WatchError::Closed)??;

            if !self.is_relevant(&event) {
                continue;
            }
            debug!("Change detected: {:?}", event.paths);

            std::thread::sleep(DEBOUNCE_DURATION);
            while self.rx.try_recv().is_ok() {}

            return Ok(());
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return false;
        }
        event
            .paths
            .iter()
            .any(|path| path_matches(path, &self.paths))
    }
}

/// Whether `path` refers to one of `watched`, comparing parent directory and
/// file name when the path cannot be resolved (mid-rename).
pub fn path_matches(path: &Path, watched: &[PathBuf]) -> bool {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    watched.iter().any(|watched| {
        canonical == *watched
            || (canonical.file_name() == watched.file_name()
                && canonical.parent() == watched.parent())
    })
}
