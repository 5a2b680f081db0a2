//! Batched send/collect cycles.
//!
//! Batches run strictly one after another: the next batch is not sent until
//! the current batch's collection window has closed, so at most one batch of
//! probes is ever outstanding.

use std::collections::HashMap;
use std::net::IpAddr;

use tokio::time::Instant;
use tracing::{debug, trace};

use synscan_common::ScanError;
use synscan_common::TransportError;
use synscan_common::config::Config;
use synscan_common::report::BatchProgress;
use synscan_common::transport::{ProbeKey, ProbeTransport, ReplyPayload, SynProbe};

use super::aggregate::ResultAggregator;
use super::{ProgressCallback, classify, probe};

pub(super) struct BatchDispatcher<'a, T> {
    pub transport: &'a mut T,
    pub cfg: &'a Config,
    pub on_batch: Option<&'a ProgressCallback>,
}

impl<T: ProbeTransport> BatchDispatcher<'_, T> {
    pub async fn run(
        &mut self,
        host: IpAddr,
        ports: &[u16],
        aggregator: &mut ResultAggregator,
    ) -> Result<(), ScanError> {
        let capacity: usize = self.cfg.effective_capacity(ports.len());
        let total_batches: usize = ports.len().div_ceil(capacity);

        for (index, batch) in ports.chunks(capacity).enumerate() {
            let probes: Vec<SynProbe> =
                probe::build_batch(batch, index * capacity, self.cfg.source_ports);

            self.transport.send_batch(host, &probes).await?;
            let window_closes = Instant::now() + self.cfg.collection_window;
            let replies = self.collect(&probes, window_closes).await?;

            let before: usize = aggregator.responses();
            for (probe, reply) in probes.iter().zip(replies) {
                aggregator.record(probe.key.destination_port, classify::classify(reply));
            }
            aggregator.batch_closed();

            let progress = BatchProgress {
                index,
                total_batches,
                probes: probes.len(),
                replies: aggregator.responses() - before,
            };
            debug!(
                "Batch {}/{}: {} probes, {} replies",
                index + 1,
                total_batches,
                progress.probes,
                progress.replies
            );
            if let Some(callback) = self.on_batch {
                callback(&progress);
            }
        }

        Ok(())
    }

    /// Gathers replies until every probe is answered or `deadline` passes.
    ///
    /// The returned vector lines up with `probes`. Only the first reply per
    /// probe is kept.
    async fn collect(
        &mut self,
        probes: &[SynProbe],
        deadline: Instant,
    ) -> Result<Vec<Option<ReplyPayload>>, TransportError> {
        let slots: HashMap<ProbeKey, usize> = probes
            .iter()
            .enumerate()
            .map(|(slot, probe)| (probe.key, slot))
            .collect();
        let mut replies: Vec<Option<ReplyPayload>> = vec![None; probes.len()];
        let mut pending: usize = probes.len();

        let window = tokio::time::sleep_until(deadline);
        tokio::pin!(window);

        while pending > 0 {
            tokio::select! {
                reply = self.transport.next_reply() => {
                    let reply = reply?;
                    match slots.get(&reply.key) {
                        Some(&slot) if replies[slot].is_none() => {
                            replies[slot] = Some(reply.payload);
                            pending -= 1;
                        }
                        Some(&slot) => trace!("Duplicate reply for {}", probes[slot].id),
                        None => trace!("Uncorrelated reply {:?}", reply.key),
                    }
                }
                _ = &mut window => break,
            }
        }

        Ok(replies)
    }
}
