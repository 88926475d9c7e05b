//! Per-run artifact export.
//!
//! Each run gets its own directory under the output root, named by a
//! prefix of its run id, holding:
//! - `manifest.json` — run id, config, timing
//! - `trades.json`   — the ledger as one JSON array
//! - `equity.json`   — the equity/drawdown point sequence
//! - `analytics.json` — summary plus the year/month/side tables
//!
//! Chart-oriented exports (candles, markers) belong to the presentation
//! collaborators, not here.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::runner::BacktestResult;

/// Short directory name derived from a run id.
const RUN_DIR_PREFIX_LEN: usize = 12;

/// Where each artifact of a run was written.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub trades: PathBuf,
    pub equity: PathBuf,
    pub analytics: PathBuf,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    run_id: &'a str,
    config: &'a crate::config::RunConfig,
    bars_processed: usize,
    started_at: chrono::DateTime<chrono::Utc>,
    duration_secs: f64,
}

/// Write all artifacts for one run, creating the directory as needed.
pub fn save_artifacts(output_dir: impl AsRef<Path>, result: &BacktestResult) -> Result<ArtifactPaths> {
    let prefix = &result.run_id[..RUN_DIR_PREFIX_LEN.min(result.run_id.len())];
    let dir = output_dir.as_ref().join(prefix);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating artifact directory {}", dir.display()))?;

    let manifest = Manifest {
        run_id: &result.run_id,
        config: &result.config,
        bars_processed: result.bars_processed,
        started_at: result.started_at,
        duration_secs: result.duration_secs,
    };

    let paths = ArtifactPaths {
        manifest: dir.join("manifest.json"),
        trades: dir.join("trades.json"),
        equity: dir.join("equity.json"),
        analytics: dir.join("analytics.json"),
        dir,
    };

    write_json(&paths.manifest, &manifest)?;
    write_json(&paths.trades, &result.ledger)?;
    write_json(&paths.equity, &result.analytics.equity_curve)?;
    write_json(&paths.analytics, &result.analytics)?;

    tracing::info!(dir = %paths.dir.display(), "artifacts written");
    Ok(paths)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
