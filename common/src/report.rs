//! Scan results handed from the engine to the reporter.

use std::net::IpAddr;
use std::time::Duration;

use crate::outcome::ProbeOutcome;

/// Final word on a scanned host.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanReport {
    /// The liveness probe went unanswered; no port was probed.
    HostDown { host: IpAddr, elapsed: Duration },
    Completed(ScanResult),
}

impl ScanReport {
    pub fn host(&self) -> IpAddr {
        match self {
            ScanReport::HostDown { host, .. } => *host,
            ScanReport::Completed(result) => result.host,
        }
    }
}

/// Per-category port lists and counters for one completed scan.
///
/// Lists keep probe order. Each probed port appears in exactly one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub host: IpAddr,
    pub elapsed: Duration,
    pub open: Vec<u16>,
    pub closed: Vec<u16>,
    pub filtered: Vec<u16>,
    pub dropped: Vec<u16>,
    pub unknown: Vec<u16>,
    /// Probes that got any reply at all.
    pub responses: usize,
    pub total: usize,
    pub batches: usize,
}

impl ScanResult {
    pub fn new(host: IpAddr) -> Self {
        Self {
            host,
            elapsed: Duration::ZERO,
            open: Vec::new(),
            closed: Vec::new(),
            filtered: Vec::new(),
            dropped: Vec::new(),
            unknown: Vec::new(),
            responses: 0,
            total: 0,
            batches: 0,
        }
    }

    pub fn ports(&self, outcome: ProbeOutcome) -> &[u16] {
        match outcome {
            ProbeOutcome::Open => &self.open,
            ProbeOutcome::Closed => &self.closed,
            ProbeOutcome::Filtered => &self.filtered,
            ProbeOutcome::Dropped => &self.dropped,
            ProbeOutcome::Unknown => &self.unknown,
        }
    }

    pub(crate) fn ports_mut(&mut self, outcome: ProbeOutcome) -> &mut Vec<u16> {
        match outcome {
            ProbeOutcome::Open => &mut self.open,
            ProbeOutcome::Closed => &mut self.closed,
            ProbeOutcome::Filtered => &mut self.filtered,
            ProbeOutcome::Dropped => &mut self.dropped,
            ProbeOutcome::Unknown => &mut self.unknown,
        }
    }

    /// Files `port` under `outcome` and bumps the counters.
    pub fn record(&mut self, port: u16, outcome: ProbeOutcome) {
        self.ports_mut(outcome).push(port);
        self.total += 1;
        if outcome.is_response() {
            self.responses += 1;
        }
    }

    /// Number of ports filed under any category.
    pub fn classified(&self) -> usize {
        ProbeOutcome::ALL.iter().map(|o| self.ports(*o).len()).sum()
    }

    /// Share of probes that got a reply, in percent, rounded to one decimal.
    pub fn hit_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rate = self.responses as f64 / self.total as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

/// Emitted after every batch so callers can display progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Zero-based index of the batch that just finished.
    pub index: usize,
    pub total_batches: usize,
    pub probes: usize,
    pub replies: usize,
}
