//! A fake target host that answers SYN probes the way a real stack would.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use pnet::packet::tcp::TcpFlags;

use synscan_common::TransportError;
use synscan_common::transport::{ProbeTransport, Reply, ReplyPayload, SynProbe};

#[derive(Clone, Copy)]
pub enum PortState {
    Listening,
    Refusing,
    /// A firewall answers with ICMP destination unreachable and this code.
    Rejected(u8),
    /// A reply with flags that make no sense for a SYN.
    Garbled,
}

#[derive(Default)]
pub struct SimulatedHost {
    pub up: bool,
    ports: HashMap<u16, PortState>,
    in_flight: VecDeque<Reply>,
    pub sent: Vec<SynProbe>,
    pub batch_sizes: Vec<usize>,
}

impl SimulatedHost {
    pub fn up() -> Self {
        Self {
            up: true,
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self::default()
    }

    pub fn with(mut self, state: PortState, ports: impl IntoIterator<Item = u16>) -> Self {
        for port in ports {
            self.ports.insert(port, state);
        }
        self
    }

    fn answer(state: PortState) -> ReplyPayload {
        match state {
            PortState::Listening => ReplyPayload::Tcp {
                flags: TcpFlags::SYN | TcpFlags::ACK,
            },
            PortState::Refusing => ReplyPayload::Tcp {
                flags: TcpFlags::RST | TcpFlags::ACK,
            },
            PortState::Rejected(code) => ReplyPayload::Icmp {
                icmp_type: 3,
                code,
            },
            PortState::Garbled => ReplyPayload::Tcp {
                flags: TcpFlags::FIN | TcpFlags::URG,
            },
        }
    }
}

#[async_trait]
impl ProbeTransport for SimulatedHost {
    async fn echo(&mut self, _target: IpAddr, _timeout: Duration) -> Result<bool, TransportError> {
        Ok(self.up)
    }

    async fn send_batch(
        &mut self,
        _target: IpAddr,
        probes: &[SynProbe],
    ) -> Result<(), TransportError> {
        self.batch_sizes.push(probes.len());
        self.sent.extend_from_slice(probes);

        // Even-indexed replies overtake odd ones on the way back.
        let (even, odd): (Vec<_>, Vec<_>) = probes
            .iter()
            .enumerate()
            .partition(|(i, _)| i % 2 == 0);
        for (_, probe) in even.into_iter().chain(odd) {
            if let Some(state) = self.ports.get(&probe.key.destination_port) {
                self.in_flight.push_back(Reply {
                    key: probe.key,
                    payload: Self::answer(*state),
                });
            }
        }
        Ok(())
    }

    async fn next_reply(&mut self) -> Result<Reply, TransportError> {
        match self.in_flight.pop_front() {
            Some(reply) => Ok(reply),
            None => std::future::pending().await,
        }
    }
}
