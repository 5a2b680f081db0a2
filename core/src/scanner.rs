//! The scan-orchestration engine.
//!
//! A scan runs in four steps:
//! 1. **Validation**: the port set is narrowed to TCP ports (1-65535) before
//!    anything is sent.
//! 2. **Liveness**: one ICMP echo; an unanswered echo ends the scan with
//!    [`ScanReport::HostDown`].
//! 3. **Dispatch**: ports go out in batches, each followed by a collection
//!    window (see [`dispatch`]).
//! 4. **Aggregation**: every reply (or silence) is classified and filed
//!    under its port.
//!
//! The engine is generic over [`ProbeTransport`]; [`perform_scan`] wires it to
//! the raw socket implementation.

use std::net::IpAddr;
use std::time::Instant;

use tracing::{debug, info};

use synscan_common::config::Config;
use synscan_common::ports::PortSet;
use synscan_common::report::BatchProgress;
use synscan_common::transport::ProbeTransport;
use synscan_common::{ScanError, ScanReport};

use crate::network::RawTransport;

mod aggregate;
pub mod classify;
mod dispatch;
mod liveness;
mod probe;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::ResultAggregator;

use dispatch::BatchDispatcher;

pub type ProgressCallback = dyn Fn(&BatchProgress) + Send + Sync;

pub struct Scanner<T> {
    transport: T,
    cfg: Config,
    on_batch: Option<Box<ProgressCallback>>,
}

impl<T: ProbeTransport> Scanner<T> {
    pub fn new(transport: T, cfg: Config) -> Self {
        Self {
            transport,
            cfg,
            on_batch: None,
        }
    }

    /// Registers a callback invoked after every batch's window closes.
    pub fn on_batch<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BatchProgress) + Send + Sync + 'static,
    {
        self.on_batch = Some(Box::new(callback));
        self
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Scans `ports` on `host`.
    ///
    /// A host that does not answer the liveness probe is not an error: the
    /// report says so and no batch is sent. Transport failures abort the scan.
    pub async fn scan(&mut self, host: IpAddr, ports: &PortSet) -> Result<ScanReport, ScanError> {
        self.cfg.validate()?;
        let ports: Vec<u16> = probe::validate_ports(ports)?;
        let started = Instant::now();

        if self.cfg.skip_liveness {
            info!("Skipping liveness probe, treating {host} as up");
        } else if !liveness::is_up(&mut self.transport, host, self.cfg.liveness_timeout).await? {
            return Ok(ScanReport::HostDown {
                host,
                elapsed: started.elapsed(),
            });
        }

        let mut aggregator = ResultAggregator::new(host, started);
        let mut dispatcher = BatchDispatcher {
            transport: &mut self.transport,
            cfg: &self.cfg,
            on_batch: self.on_batch.as_deref(),
        };
        dispatcher.run(host, &ports, &mut aggregator).await?;

        let result = aggregator.finish();
        debug!(
            "Scan of {host} finished: {} ports in {} batches, {} replies",
            result.total, result.batches, result.responses
        );
        Ok(ScanReport::Completed(result))
    }
}

/// Scans `host` over raw sockets.
pub async fn perform_scan(
    host: IpAddr,
    ports: &PortSet,
    cfg: Config,
    on_batch: Option<Box<ProgressCallback>>,
) -> Result<ScanReport, ScanError> {
    let transport = RawTransport::open()?;
    let mut scanner = Scanner {
        transport,
        cfg,
        on_batch,
    };
    scanner.scan(host, ports).await
}
