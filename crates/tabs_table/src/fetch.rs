//! The fetch state machine: read the cache, or compute and persist.
//!
//! ```text
//! Unresolved ──rebuild──────────────────────┐
//!     │                                     ▼
//!     ├──artifact present──▶ CacheHit     Computed ──cache──▶ Persisted
//!     └──artifact absent───▶ CacheMiss ─────▲
//! ```
//!
//! An unreadable artifact is an error, not a miss. A failed write leaves the
//! fetch in `Computed` and is reported on the [`Fetched`] value alongside the
//! computed data.

use std::path::PathBuf;

use tabs_cache::CacheError;
use tracing::{debug, info, warn};

use crate::error::TableError;
use crate::frame::Frame;
use crate::table::Table;

/// How a fetch should treat the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip the cache lookup and always recompute.
    pub rebuild: bool,
    /// Persist freshly computed data.
    pub cache: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            rebuild: false,
            cache: true,
        }
    }
}

impl FetchOptions {
    /// Options that force recomputation.
    pub fn rebuild() -> Self {
        Self {
            rebuild: true,
            ..Self::default()
        }
    }

    /// Returns these options with persistence disabled.
    pub fn without_cache(self) -> Self {
        Self {
            cache: false,
            ..self
        }
    }
}

/// States a fetch moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Nothing decided yet.
    Unresolved,
    /// A cached artifact was read.
    CacheHit,
    /// No cached artifact exists.
    CacheMiss,
    /// The source and post-processors ran.
    Computed,
    /// The computed data was written to the cache.
    Persisted,
}

/// The outcome of a fetch.
#[derive(Debug)]
pub struct Fetched {
    /// The table's data.
    pub data: Frame,
    /// Where the artifact lives (or would live).
    pub location: PathBuf,
    /// Every state visited, starting with [`FetchState::Unresolved`].
    pub trail: Vec<FetchState>,
    /// Why persisting the computed data failed, if it did.
    pub persist_error: Option<CacheError>,
}

impl Fetched {
    /// The terminal state.
    pub fn state(&self) -> FetchState {
        self.trail
            .last()
            .copied()
            .unwrap_or(FetchState::Unresolved)
    }

    /// Returns `true` if the data came from the cache.
    pub fn from_cache(&self) -> bool {
        self.state() == FetchState::CacheHit
    }

    /// Returns the data, discarding fetch metadata.
    pub fn into_data(self) -> Frame {
        self.data
    }
}

/// Runs the fetch state machine for `table`.
pub fn fetch<T: Table + ?Sized>(table: &T, options: FetchOptions) -> Result<Fetched, TableError> {
    let location = table.output()?;
    let mut trail = vec![FetchState::Unresolved];

    if !options.rebuild {
        match table.read_cache(&location)? {
            Some(data) => {
                debug!(table = table.name(), path = %location.display(), "cache hit");
                trail.push(FetchState::CacheHit);
                return Ok(Fetched {
                    data,
                    location,
                    trail,
                    persist_error: None,
                });
            }
            None => {
                debug!(table = table.name(), path = %location.display(), "cache miss");
                trail.push(FetchState::CacheMiss);
            }
        }
    }

    let data = compute(table)?;
    trail.push(FetchState::Computed);

    let mut persist_error = None;
    if options.cache {
        match table.to_cache(&data, &location) {
            Ok(()) => {
                info!(table = table.name(), path = %location.display(), "persisted table");
                trail.push(FetchState::Persisted);
            }
            Err(e) => {
                warn!(table = table.name(), error = %e, "failed to persist table");
                persist_error = Some(e);
            }
        }
    }

    Ok(Fetched {
        data,
        location,
        trail,
        persist_error,
    })
}

/// Runs the source, then each post-processor in order on the previous result.
pub fn compute<T: Table + ?Sized>(table: &T) -> Result<Frame, TableError> {
    let name = table.name();
    info!(table = name, "computing table");

    let mut data = table
        .source()
        .map_err(|source| TableError::Source { table: name, source })?;

    for processor in table.post_processors() {
        debug!(table = name, processor = processor.name(), "applying post processor");
        data = processor
            .apply(data)
            .map_err(|source| TableError::PostProcessor {
                table: name,
                processor: processor.name(),
                source,
            })?;
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_read_and_write_cache() {
        let opts = FetchOptions::default();
        assert!(!opts.rebuild);
        assert!(opts.cache);
    }

    #[test]
    fn rebuild_without_cache() {
        let opts = FetchOptions::rebuild().without_cache();
        assert!(opts.rebuild);
        assert!(!opts.cache);
    }

    #[test]
    fn terminal_state_is_last_in_trail() {
        let fetched = Fetched {
            data: Frame::default(),
            location: PathBuf::from("x.tab"),
            trail: vec![
                FetchState::Unresolved,
                FetchState::CacheMiss,
                FetchState::Computed,
            ],
            persist_error: None,
        };
        assert_eq!(fetched.state(), FetchState::Computed);
        assert!(!fetched.from_cache());
    }
}
