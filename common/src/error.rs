use std::io;
use std::net::IpAddr;

use thiserror::Error;

/// Rejection of a port specification, with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortSpecError {
    #[error("port specification is empty")]
    Empty,
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("expected a port number at position {position}")]
    MissingNumber { position: usize },
    #[error("number starting at position {position} is too large")]
    Overflow { position: usize },
}

impl PortSpecError {
    pub fn position(&self) -> usize {
        match self {
            PortSpecError::Empty => 0,
            PortSpecError::UnexpectedChar { position, .. }
            | PortSpecError::MissingNumber { position }
            | PortSpecError::Overflow { position } => *position,
        }
    }
}

/// Failures at the packet send/receive boundary.
///
/// These are never folded into "no reply": a scan that hits one aborts.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("raw sockets require root privileges ({0})")]
    PermissionDenied(#[source] io::Error),
    #[error("failed to open {kind} channel: {source}")]
    Channel {
        kind: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to send to {target}: {source}")]
    Send {
        target: IpAddr,
        #[source]
        source: io::Error,
    },
    #[error("could not determine a local address routing to {target}: {source}")]
    NoRoute {
        target: IpAddr,
        #[source]
        source: io::Error,
    },
    #[error("only IPv4 targets are supported, got {0}")]
    Unsupported(IpAddr),
    #[error("packet construction failed: {0}")]
    Packet(#[from] anyhow::Error),
    #[error("capture channel closed unexpectedly")]
    Closed,
}

impl TransportError {
    /// Maps socket creation failures, singling out missing privileges.
    pub fn channel(kind: &'static str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => TransportError::PermissionDenied(source),
            _ => TransportError::Channel { kind, source },
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("port {0} is outside the valid range 1-65535")]
    PortOutOfRange(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
