//! In-memory transport for exercising the scanner without raw sockets.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use synscan_common::TransportError;
use synscan_common::transport::{ProbeKey, ProbeTransport, Reply, ReplyPayload, SynProbe};

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    host_up: bool,
    responses: HashMap<u16, ReplyPayload>,
    queue: VecDeque<Reply>,
    stray_replies: bool,
    fail_after: Option<usize>,
    pub echo_calls: usize,
    pub batches: Vec<Vec<SynProbe>>,
}

impl ScriptedTransport {
    pub fn up() -> Self {
        Self {
            host_up: true,
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self::default()
    }

    /// Answers probes to `port` with `payload`.
    pub fn reply(mut self, port: u16, payload: ReplyPayload) -> Self {
        self.responses.insert(port, payload);
        self
    }

    /// Precedes every real reply with one carrying a foreign source port.
    pub fn with_stray_replies(mut self) -> Self {
        self.stray_replies = true;
        self
    }

    /// Fails every send after the first `batches` succeed.
    pub fn failing_after(mut self, batches: usize) -> Self {
        self.fail_after = Some(batches);
        self
    }
}

#[async_trait]
impl ProbeTransport for ScriptedTransport {
    async fn echo(&mut self, _target: IpAddr, _timeout: Duration) -> Result<bool, TransportError> {
        self.echo_calls += 1;
        Ok(self.host_up)
    }

    async fn send_batch(
        &mut self,
        _target: IpAddr,
        probes: &[SynProbe],
    ) -> Result<(), TransportError> {
        if self.fail_after.is_some_and(|n| self.batches.len() >= n) {
            return Err(TransportError::Closed);
        }
        self.batches.push(probes.to_vec());

        // Replies arrive in reverse send order.
        for probe in probes.iter().rev() {
            let Some(payload) = self.responses.get(&probe.key.destination_port) else {
                continue;
            };
            if self.stray_replies {
                self.queue.push_back(Reply {
                    key: ProbeKey {
                        source_port: probe.key.source_port.wrapping_add(1),
                        destination_port: probe.key.destination_port,
                    },
                    payload: *payload,
                });
            }
            self.queue.push_back(Reply {
                key: probe.key,
                payload: *payload,
            });
        }
        Ok(())
    }

    async fn next_reply(&mut self) -> Result<Reply, TransportError> {
        match self.queue.pop_front() {
            Some(reply) => Ok(reply),
            None => std::future::pending().await,
        }
    }
}
