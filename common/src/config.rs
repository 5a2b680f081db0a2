use std::time::Duration;

use crate::error::ScanError;

pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COLLECTION_WINDOW: Duration = Duration::from_millis(200);
pub const DEFAULT_BATCH_CAPACITY: usize = 100;

/// How probes are grouped before they hit the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Send at most `batch_capacity` probes, wait for the collection window,
    /// then move on to the next batch.
    #[default]
    Batched,
    /// Send every probe at once and collect replies in a single window.
    Unbounded,
}

/// How TCP source ports are picked for the probes of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourcePortPolicy {
    /// One random ephemeral port shared by every probe in the batch.
    #[default]
    Shared,
    /// A distinct source port for each probe in the batch.
    Unique,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// How long the ICMP echo probe waits for a reply before the host is
    /// declared down.
    pub liveness_timeout: Duration,
    /// Time budget for collecting replies after a batch has been sent.
    ///
    /// Collection ends early once every probe of the batch has been answered.
    pub collection_window: Duration,
    pub batch_capacity: usize,
    pub dispatch: DispatchPolicy,
    pub source_ports: SourcePortPolicy,
    /// Skips the liveness probe and treats the host as up.
    pub skip_liveness: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            collection_window: DEFAULT_COLLECTION_WINDOW,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            dispatch: DispatchPolicy::default(),
            source_ports: SourcePortPolicy::default(),
            skip_liveness: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.batch_capacity == 0 {
            return Err(ScanError::InvalidConfig(
                "batch capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of probes placed in one batch for a scan of `total` ports.
    pub fn effective_capacity(&self, total: usize) -> usize {
        match self.dispatch {
            DispatchPolicy::Batched => self.batch_capacity,
            DispatchPolicy::Unbounded => total.max(1),
        }
    }
}
