//! The packet boundary of the scanner.
//!
//! The engine never touches sockets; it talks to a [`ProbeTransport`], which
//! may be a raw socket implementation or a scripted one in tests.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;

/// Position of a probe within the port set being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeId(pub usize);

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Port pair identifying a probe on the wire, seen from our side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeKey {
    pub source_port: u16,
    pub destination_port: u16,
}

/// A single SYN segment to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynProbe {
    pub id: ProbeId,
    pub key: ProbeKey,
    pub sequence: u32,
}

/// What a reply carried, as far as classification is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPayload {
    Tcp { flags: u8 },
    Icmp { icmp_type: u8, code: u8 },
    /// A reply was correlated but carries no TCP or ICMP layer.
    Unrecognized,
}

/// A reply correlated to the probe with the same [`ProbeKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub key: ProbeKey,
    pub payload: ReplyPayload,
}

/// Raw send/receive capability used by the scanner.
#[async_trait]
pub trait ProbeTransport: Send {
    /// Sends one ICMP echo request and waits up to `timeout` for the reply.
    async fn echo(&mut self, target: IpAddr, timeout: Duration) -> Result<bool, TransportError>;

    /// Puts every probe of a batch on the wire.
    async fn send_batch(
        &mut self,
        target: IpAddr,
        probes: &[SynProbe],
    ) -> Result<(), TransportError>;

    /// Waits for the next reply from the target.
    ///
    /// Must be cancel safe: the scanner drops this future when a collection
    /// window closes.
    async fn next_reply(&mut self) -> Result<Reply, TransportError>;
}
