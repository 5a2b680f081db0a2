use std::net::IpAddr;
use std::time::{Duration, Instant};

use synscan_common::{ProbeOutcome, ScanResult};

/// Builds a [`ScanResult`] while batches complete.
pub struct ResultAggregator {
    result: ScanResult,
    started: Instant,
    last_window_close: Option<Duration>,
}

impl ResultAggregator {
    /// `started` is taken before the liveness probe so the reported duration
    /// covers the whole scan.
    pub fn new(host: IpAddr, started: Instant) -> Self {
        Self {
            result: ScanResult::new(host),
            started,
            last_window_close: None,
        }
    }

    pub fn record(&mut self, port: u16, outcome: ProbeOutcome) {
        self.result.record(port, outcome);
    }

    /// Marks the end of a batch's collection window.
    pub fn batch_closed(&mut self) {
        self.result.batches += 1;
        self.last_window_close = Some(self.started.elapsed());
    }

    pub fn responses(&self) -> usize {
        self.result.responses
    }

    pub fn finish(mut self) -> ScanResult {
        self.result.elapsed = self
            .last_window_close
            .unwrap_or_else(|| self.started.elapsed());
        self.result
    }
}
