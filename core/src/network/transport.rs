//! Layer 4 raw sockets for SYN probing.
//!
//! Two IPv4 channels are opened: one for TCP (probes out, SYN+ACK / RST+ACK
//! in) and one for ICMP (echo for liveness, unreachable errors in). Each
//! receiver runs on its own thread and forwards copies of the packets into a
//! single queue that the async side drains.
//!
//! Opening the channels requires **root privileges**.

use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::{
    packet::{Packet, icmp::IcmpPacket, ip::IpNextHeaderProtocols, tcp::TcpPacket},
    transport::{
        self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
    },
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

use synscan_common::TransportError;
use synscan_common::transport::{ProbeKey, ProbeTransport, Reply, ReplyPayload, SynProbe};
use synscan_protocols::{
    icmp::{self, IcmpMessage},
    tcp,
};

use super::route;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_TCP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Tcp));
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

/// A packet copied off one of the capture threads.
#[derive(Debug)]
enum Captured {
    Tcp(Vec<u8>, IpAddr),
    Icmp(Vec<u8>, IpAddr),
    Failed(&'static str, io::Error),
}

macro_rules! spawn_listener {
    ($tx:expr, $rx:expr, $iter_func:path, $wrap:path, $kind:expr) => {
        std::thread::spawn(move || {
            let mut iterator = $iter_func(&mut $rx);
            loop {
                match iterator.next() {
                    Ok((packet, source_ip)) => {
                        if $tx.send($wrap(packet.packet().to_vec(), source_ip)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = $tx.send(Captured::Failed($kind, e));
                        break;
                    }
                }
            }
        })
    };
}

pub struct RawTransport {
    tcp_tx: TransportSender,
    icmp_tx: TransportSender,
    rx: mpsc::UnboundedReceiver<Captured>,
    /// Target of the current scan and the local address routing to it.
    route: Option<(Ipv4Addr, Ipv4Addr)>,
    echo_sequence: u16,
}

impl RawTransport {
    /// Opens the TCP and ICMP channels and starts their capture threads.
    pub fn open() -> Result<Self, TransportError> {
        let (tcp_tx, mut tcp_rx) = open_channel(CHANNEL_TYPE_TCP, "tcp")?;
        let (icmp_tx, mut icmp_rx) = open_channel(CHANNEL_TYPE_ICMP, "icmp")?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        let tcp_queue = queue_tx.clone();
        spawn_listener!(tcp_queue, tcp_rx, transport::tcp_packet_iter, Captured::Tcp, "tcp");
        spawn_listener!(queue_tx, icmp_rx, transport::icmp_packet_iter, Captured::Icmp, "icmp");

        Ok(Self {
            tcp_tx,
            icmp_tx,
            rx: queue_rx,
            route: None,
            echo_sequence: 0,
        })
    }

    /// Resolves (and caches) the local source address for `target`.
    fn route_to(&mut self, target: IpAddr) -> Result<(Ipv4Addr, Ipv4Addr), TransportError> {
        let IpAddr::V4(target_v4) = target else {
            return Err(TransportError::Unsupported(target));
        };
        if let Some(route) = self.route
            && route.0 == target_v4
        {
            return Ok(route);
        }

        let local = route::local_ipv4_for(target_v4)?;
        debug!("Probing {target_v4} from {local}");
        self.route = Some((target_v4, local));
        Ok((target_v4, local))
    }

    async fn recv(&mut self) -> Result<Captured, TransportError> {
        match self.rx.recv().await {
            Some(Captured::Failed(kind, source)) => Err(TransportError::Channel { kind, source }),
            Some(captured) => Ok(captured),
            None => Err(TransportError::Closed),
        }
    }

    /// Matches a captured packet against the current target.
    fn correlate(&self, captured: Captured) -> Option<Reply> {
        let (target, _) = self.route?;

        match captured {
            Captured::Tcp(bytes, source) if source == IpAddr::V4(target) => {
                let segment = tcp::summarize_segment(&bytes)
                    .inspect_err(|e| trace!("Ignoring TCP packet: {e}"))
                    .ok()?;
                Some(Reply {
                    key: ProbeKey {
                        source_port: segment.destination_port,
                        destination_port: segment.source_port,
                    },
                    payload: ReplyPayload::Tcp {
                        flags: segment.flags,
                    },
                })
            }
            Captured::Icmp(bytes, _source) => match icmp::parse_message(&bytes) {
                Ok(IcmpMessage::TcpError {
                    icmp_type,
                    code,
                    quoted,
                }) if quoted.destination == target => Some(Reply {
                    key: ProbeKey {
                        source_port: quoted.source_port,
                        destination_port: quoted.destination_port,
                    },
                    payload: ReplyPayload::Icmp { icmp_type, code },
                }),
                Ok(_) => None,
                Err(e) => {
                    trace!("Ignoring ICMP packet: {e}");
                    None
                }
            },
            _ => None,
        }
    }
}

#[async_trait]
impl ProbeTransport for RawTransport {
    async fn echo(&mut self, target: IpAddr, timeout: Duration) -> Result<bool, TransportError> {
        self.route_to(target)?;
        let identifier: u16 = rand::random();
        self.echo_sequence = self.echo_sequence.wrapping_add(1);

        let bytes: Vec<u8> = icmp::create_echo_request(identifier, self.echo_sequence)?;
        let packet = IcmpPacket::new(&bytes).context("wrapping echo request")?;
        self.icmp_tx
            .send_to(packet, target)
            .map_err(|source| TransportError::Send { target, source })?;

        let deadline = Instant::now() + timeout;
        loop {
            let captured = match tokio::time::timeout_at(deadline, self.recv()).await {
                Ok(captured) => captured?,
                Err(_elapsed) => return Ok(false),
            };

            if let Captured::Icmp(bytes, source) = captured
                && source == target
                && let Ok(IcmpMessage::EchoReply { identifier: id, .. }) =
                    icmp::parse_message(&bytes)
                && id == identifier
            {
                return Ok(true);
            }
        }
    }

    async fn send_batch(
        &mut self,
        target: IpAddr,
        probes: &[SynProbe],
    ) -> Result<(), TransportError> {
        let (target_v4, local) = self.route_to(target)?;

        for probe in probes {
            let bytes: Vec<u8> = tcp::create_syn_packet(
                local,
                target_v4,
                probe.key.source_port,
                probe.key.destination_port,
                probe.sequence,
            )?;
            let packet = TcpPacket::new(&bytes).context("wrapping syn segment")?;
            self.tcp_tx
                .send_to(packet, target)
                .map_err(|source| TransportError::Send { target, source })?;
        }
        Ok(())
    }

    async fn next_reply(&mut self) -> Result<Reply, TransportError> {
        loop {
            let captured = self.recv().await?;
            if let Some(reply) = self.correlate(captured) {
                return Ok(reply);
            }
        }
    }
}

fn open_channel(
    channel_type: TransportChannelType,
    kind: &'static str,
) -> Result<(TransportSender, TransportReceiver), TransportError> {
    transport::transport_channel(TRANSPORT_BUFFER_SIZE, channel_type)
        .map_err(|e| TransportError::channel(kind, e))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
