//! Export executor
//!
//! Runs count → plan → (submit → poll)* → write for one resource.

use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::{SharedClock, TokioClock};
use crate::config::ExportConfig;
use crate::downloader::config::ExportTiming;
use crate::downloader::planner::{page_count, OffsetPlanner};
use crate::downloader::poller::BatchPoller;
use crate::downloader::rate_limit::RateLimiter;
use crate::downloader::{DownloadError, DownloadResult};
use crate::fetcher::{EcwidFetcher, EcwidHttpClient, StoreApi};
use crate::output::{output_path, JsonResultWriter};
use crate::BatchResult;

/// Outcome of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Item total reported by the store
    pub total: u64,
    /// Batches submitted, one per thousand-block
    pub blocks: usize,
    /// Page requests across all batches
    pub pages: u64,
    /// File the results were written to
    pub output_path: PathBuf,
    /// Size of the written file
    pub bytes: u64,
    /// Time spent downloading (count excluded)
    pub elapsed: Duration,
}

/// Orchestrates one export run
pub struct ExportExecutor {
    api: Arc<dyn StoreApi>,
    clock: SharedClock,
    store_id: String,
    resource: String,
    output_dir: PathBuf,
    timing: ExportTiming,
}

impl ExportExecutor {
    /// Create an executor over any [`StoreApi`]
    pub fn new(api: Arc<dyn StoreApi>, clock: SharedClock, config: &ExportConfig) -> Self {
        Self {
            api,
            clock,
            store_id: config.store_id.clone(),
            resource: config.resource.clone(),
            output_dir: config.output_dir.clone(),
            timing: config.timing,
        }
    }

    /// Create an executor talking to the Ecwid API described by `config`
    pub fn from_config(config: &ExportConfig) -> DownloadResult<Self> {
        let clock = TokioClock::shared();
        let rate_limiter = Arc::new(RateLimiter::from_mode(
            config.throttle,
            config.timing.request_delay,
            clock.clone(),
        ));
        let http_client = Arc::new(EcwidHttpClient::from_config(config, rate_limiter)?);
        let api = Arc::new(EcwidFetcher::new(http_client));
        Ok(Self::new(api, clock, config))
    }

    /// Ask the store how many items the resource holds
    pub async fn count_total(&self) -> DownloadResult<u64> {
        Ok(self.api.total(&self.resource).await?)
    }

    /// Run the export without a progress bar
    pub async fn execute(&self) -> DownloadResult<ExportSummary> {
        self.execute_with_progress(None).await
    }

    /// Run the export, advancing `progress` once per completed block
    pub async fn execute_with_progress(
        &self,
        progress: Option<ProgressBar>,
    ) -> DownloadResult<ExportSummary> {
        let total = self.count_total().await?;
        let pages = page_count(total).ok_or(DownloadError::TotalOutOfRange { total })?;
        info!(
            "The amount of requested data is {} items. Downloading... Please wait.",
            total
        );

        let started = self.clock.now();
        let results = self.download(total, progress.as_ref()).await?;
        let elapsed = self.clock.now().saturating_duration_since(started);
        info!(
            "Total downloading time: {:.2} minutes",
            elapsed.as_secs_f64() / 60.0
        );

        let path = output_path(&self.output_dir, &self.resource);
        let bytes = JsonResultWriter::new(&path).write(&results)?;

        Ok(ExportSummary {
            total,
            blocks: results.len(),
            pages,
            output_path: path,
            bytes,
            elapsed,
        })
    }

    /// Fetch every thousand-block covering `total` items
    ///
    /// Results are returned in submission order, i.e. descending offsets.
    ///
    /// # Errors
    /// `TotalOutOfRange` when `total` is too large to plan, before any request.
    pub async fn download(
        &self,
        total: u64,
        progress: Option<&ProgressBar>,
    ) -> DownloadResult<Vec<BatchResult>> {
        let mut planner = OffsetPlanner::from_total(&self.store_id, &self.resource, total)
            .ok_or(DownloadError::TotalOutOfRange { total })?;
        let poller = BatchPoller::new(
            self.api.clone(),
            self.clock.clone(),
            self.timing.poll_delay,
            self.timing.poll_time_limit,
        );

        if let Some(pb) = progress {
            pb.set_length(planner.remaining_blocks());
        }

        let mut results = Vec::new();
        while let Some(block) = planner.next_block() {
            debug!(
                "Block {}: {} pages, next offset {:?}",
                results.len() + 1,
                block.len(),
                planner.current_offset()
            );

            let ticket = self.api.submit_batch(&block).await?;
            let result = poller.poll_until_complete(&ticket).await?;
            results.push(result);

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        Ok(results)
    }
}
