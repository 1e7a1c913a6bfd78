//! On-disk bazaar snapshot with an age-based refresh policy.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, warn};

use crate::domain::PriceSnapshot;
use crate::infra::bazaar::{parse_snapshot, SnapshotError, SnapshotSource};

const SNAPSHOT_FILENAME: &str = "products.json";

/// Bazaar data older than this is refreshed before use.
pub const SNAPSHOT_MAX_AGE: Duration = Duration::from_secs(600);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Served from the file on disk.
    Cached,
    /// Downloaded during this run.
    Downloaded,
}

/// Default snapshot location in the app data directory.
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|base| base.join("forge-profit-scanner"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SNAPSHOT_FILENAME)
}

/// Load the stored snapshot. A missing file is reported as `SnapshotError::Missing`.
pub fn load_snapshot(path: &Path) -> Result<PriceSnapshot, SnapshotError> {
    let raw = fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::Missing(path.to_path_buf())
        } else {
            SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_snapshot(&raw)
}

/// Write raw bazaar bytes, creating the parent directory when needed.
pub fn write_snapshot_bytes(path: &Path, raw: &[u8]) -> Result<(), SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, raw).map_err(io_err)
}

/// Returns a snapshot no older than `max_age`, downloading a new one when the stored
/// file is missing, unreadable or stale.
pub async fn ensure_fresh_snapshot<S: SnapshotSource>(
    source: &S,
    path: &Path,
    max_age: Duration,
    now: SystemTime,
) -> Result<(PriceSnapshot, SnapshotOrigin), SnapshotError> {
    match load_snapshot(path) {
        Ok(snapshot) if !snapshot.is_stale(max_age, now) => {
            info!(
                "Using cached bazaar prices ({} products, updated {}, age: {})",
                snapshot.len(),
                format_timestamp(snapshot.as_of),
                age_string(snapshot.age(now))
            );
            return Ok((snapshot, SnapshotOrigin::Cached));
        }
        Ok(snapshot) => {
            info!(
                "Bazaar prices are {} old (limit {}), refreshing...",
                age_string(snapshot.age(now)),
                age_string(max_age)
            );
        }
        Err(SnapshotError::Missing(path)) => {
            info!("No bazaar prices at {}, downloading...", path.display());
        }
        Err(err) => {
            warn!("Error loading bazaar prices ({err}), downloading a new copy");
        }
    }

    source.download(path).await?;
    let snapshot = load_snapshot(path)?;
    Ok((snapshot, SnapshotOrigin::Downloaded))
}

/// Human-readable age string.
pub fn age_string(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

fn format_timestamp(at: SystemTime) -> String {
    let secs = at
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown".to_string())
}
