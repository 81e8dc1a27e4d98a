use crate::accounts::AccountSource;
use crate::dedup::SeenAddresses;
use crate::error::{Result, SyncError};
use crate::relayer::Relayer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// One fetch window in the chunk plan, 1-indexed for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Fetch windows covering [0, total) in batch-size steps. The final window's
/// limit is clamped to the remaining records.
pub fn chunk_plan(total: u64, batch_size: u64) -> Vec<Chunk> {
    if total == 0 || batch_size == 0 {
        return Vec::new();
    }

    let count = (total + batch_size - 1) / batch_size;
    (1..=count)
        .map(|index| {
            let offset = (index - 1) * batch_size;
            Chunk {
                index,
                offset,
                limit: batch_size.min(total - offset),
            }
        })
        .collect()
}

/// Counters accumulated across one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_records: u64,
    pub chunks_planned: usize,
    pub chunks_failed: usize,
    pub empty_chunks: usize,
    /// Unique addresses successfully registered with the relayer.
    pub added: usize,
    /// Addresses submitted in batches the relayer did not accept.
    pub failed_addresses: usize,
}

impl RunSummary {
    /// Unique addresses handed to the relayer, whether or not they succeeded.
    pub fn attempted_addresses(&self) -> usize {
        self.added + self.failed_addresses
    }

    /// Unique addresses processed, where processed means successfully
    /// relayed. A failed chunk's addresses are never counted here.
    pub fn processed(&self) -> usize {
        self.added
    }
}

/// How a run ended. Fatal conditions surface as `Err` from [`Driver::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Done(RunSummary),
    Interrupted(RunSummary),
}

enum ChunkStatus {
    /// The relayer accepted these new addresses.
    Submitted(Vec<String>),
    /// The relayer refused or errored; this many addresses were affected.
    Rejected(usize),
    FetchFailed,
    NothingNew,
    Empty,
}

/// Registers a single ctrl-c handler and exposes it as a latched flag. One
/// watcher serves the whole run, so a signal delivered while no select is
/// pending still flips the flag and is picked up at the next checkpoint.
fn interrupt_watcher() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
        // Hold the sender open either way; a closed channel must not read
        // as an interrupt.
        std::future::pending::<()>().await;
    });
    rx
}

/// Sequential orchestration: probe for the total, walk the chunk plan, filter
/// each page against the dedup set, submit what is new, pause between chunks.
pub struct Driver {
    source: Arc<dyn AccountSource>,
    relayer: Arc<dyn Relayer>,
    batch_size: u64,
    delay: Duration,
}

impl Driver {
    pub fn new(
        source: Arc<dyn AccountSource>,
        relayer: Arc<dyn Relayer>,
        batch_size: u64,
        delay: Duration,
    ) -> Self {
        Self {
            source,
            relayer,
            batch_size,
            delay,
        }
    }

    /// Runs the whole sync. A probe failure is fatal; per-chunk failures are
    /// counted and the run moves on. Ctrl-c between or during chunks stops
    /// further processing without undoing completed submissions.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_until(interrupt_watcher()).await
    }

    /// Like [`Driver::run`] with an explicit interrupt channel. The flag is
    /// latched, so a signal landing between awaits is seen before the next
    /// chunk rather than dropped.
    #[instrument(skip(self, interrupt))]
    pub async fn run_until(&self, mut interrupt: watch::Receiver<bool>) -> Result<RunOutcome> {
        let mut summary = RunSummary::default();
        let mut seen = SeenAddresses::new();

        info!("probing for total record count");
        println!("Fetching initial request to determine total records...");
        let probe = self.source.fetch_page(0, 1).await.map_err(|e| {
            SyncError::Fatal(format!("could not determine total record count: {e}"))
        })?;

        summary.total_records = probe.total;
        info!(total = probe.total, "total records available");
        println!("Total records available: {}", probe.total);

        if probe.total == 0 {
            println!("No accounts found.");
            return Ok(RunOutcome::Done(summary));
        }

        let plan = chunk_plan(probe.total, self.batch_size);
        summary.chunks_planned = plan.len();
        println!(
            "\nProcessing {} records in chunks of {}...",
            probe.total, self.batch_size
        );

        for chunk in &plan {
            if *interrupt.borrow_and_update() {
                warn!(chunk = chunk.index, "interrupt received; stopping");
                return Ok(RunOutcome::Interrupted(summary));
            }

            let status = tokio::select! {
                _ = interrupt.changed() => {
                    warn!(chunk = chunk.index, "interrupt received; stopping");
                    return Ok(RunOutcome::Interrupted(summary));
                }
                status = self.process_chunk(*chunk, plan.len(), &seen) => status,
            };

            match status {
                ChunkStatus::Submitted(batch) => {
                    seen.mark_processed(&batch);
                    summary.added += batch.len();
                }
                ChunkStatus::Rejected(count) => {
                    summary.chunks_failed += 1;
                    summary.failed_addresses += count;
                }
                ChunkStatus::FetchFailed => summary.chunks_failed += 1,
                ChunkStatus::NothingNew | ChunkStatus::Empty => summary.empty_chunks += 1,
            }

            // Throttle before every chunk except the last
            if chunk.index < plan.len() as u64 && !self.delay.is_zero() {
                tokio::select! {
                    _ = interrupt.changed() => {
                        warn!("interrupt received during delay; stopping");
                        return Ok(RunOutcome::Interrupted(summary));
                    }
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }

        Ok(RunOutcome::Done(summary))
    }

    async fn process_chunk(
        &self,
        chunk: Chunk,
        chunk_count: usize,
        seen: &SeenAddresses,
    ) -> ChunkStatus {
        info!(
            chunk = chunk.index,
            offset = chunk.offset,
            limit = chunk.limit,
            "fetching chunk"
        );
        println!(
            "Fetching chunk {}/{} (offset: {}, limit: {})...",
            chunk.index, chunk_count, chunk.offset, chunk.limit
        );

        let page = match self.source.fetch_page(chunk.offset, chunk.limit).await {
            Ok(page) => page,
            Err(e) => {
                error!(chunk = chunk.index, "chunk fetch failed: {e}");
                println!("Error fetching chunk {}: {}", chunk.index, e);
                return ChunkStatus::FetchFailed;
            }
        };

        if page.addresses.is_empty() {
            println!("No addresses found in chunk {}", chunk.index);
            return ChunkStatus::Empty;
        }

        let new_addresses = seen.filter_new(&page.addresses);
        if new_addresses.is_empty() {
            println!(
                "All addresses in chunk {} already processed (duplicates)",
                chunk.index
            );
            return ChunkStatus::NothingNew;
        }
        println!(
            "Found {} new addresses in chunk {}",
            new_addresses.len(),
            chunk.index
        );

        match self.relayer.submit(&new_addresses).await {
            Ok(result) if result.success => {
                println!(
                    "Successfully added {} addresses to relayer",
                    result.submitted.len()
                );
                if let Some(body) = &result.response_body {
                    info!(chunk = chunk.index, "relayer response: {body}");
                    println!("Response: {body}");
                }
                println!("Successfully processed chunk {}", chunk.index);
                ChunkStatus::Submitted(new_addresses)
            }
            Ok(result) => {
                if let Some(body) = &result.response_body {
                    warn!(chunk = chunk.index, "relayer error response: {body}");
                    println!("Response text: {body}");
                }
                println!("Failed to process chunk {}", chunk.index);
                ChunkStatus::Rejected(new_addresses.len())
            }
            Err(e) => {
                error!(chunk = chunk.index, "relay submission failed: {e}");
                println!("Error adding users to relayer: {e}");
                println!("Failed to process chunk {}", chunk.index);
                ChunkStatus::Rejected(new_addresses.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_partitions_total_without_gaps_or_overlaps() {
        for (total, batch_size) in [(120, 50), (50, 50), (51, 50), (1, 50), (500, 7)] {
            let plan = chunk_plan(total, batch_size);
            let mut covered = 0;
            for (i, chunk) in plan.iter().enumerate() {
                assert_eq!(chunk.index, i as u64 + 1);
                assert_eq!(chunk.offset, covered);
                assert!(chunk.limit >= 1 && chunk.limit <= batch_size);
                covered += chunk.limit;
            }
            assert_eq!(covered, total, "total={total} batch={batch_size}");
        }
    }

    #[test]
    fn plan_for_120_records_in_batches_of_50() {
        let plan = chunk_plan(120, 50);
        let windows: Vec<(u64, u64)> = plan.iter().map(|c| (c.offset, c.limit)).collect();
        assert_eq!(windows, vec![(0, 50), (50, 50), (100, 20)]);
    }

    #[test]
    fn plan_is_empty_for_zero_total_or_zero_batch() {
        assert!(chunk_plan(0, 50).is_empty());
        assert!(chunk_plan(100, 0).is_empty());
    }

    #[test]
    fn exact_multiple_has_full_final_window() {
        let plan = chunk_plan(100, 50);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].offset, 50);
        assert_eq!(plan[1].limit, 50);
    }
}
