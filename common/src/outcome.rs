use std::fmt;

/// Verdict for a single probed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    /// The target answered SYN+ACK.
    Open,
    /// The target answered RST+ACK.
    Closed,
    /// A network-level rejection was observed (ICMP unreachable, or a reply
    /// without a transport payload).
    Filtered,
    /// Nothing came back before the collection window closed.
    Dropped,
    /// Something came back, but it fits none of the categories above.
    Unknown,
}

impl ProbeOutcome {
    pub const ALL: [ProbeOutcome; 5] = [
        ProbeOutcome::Open,
        ProbeOutcome::Closed,
        ProbeOutcome::Filtered,
        ProbeOutcome::Dropped,
        ProbeOutcome::Unknown,
    ];

    /// Whether a reply was observed for the probe.
    pub fn is_response(self) -> bool {
        !matches!(self, ProbeOutcome::Dropped)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbeOutcome::Open => "open",
            ProbeOutcome::Closed => "closed",
            ProbeOutcome::Filtered => "filtered",
            ProbeOutcome::Dropped => "dropped",
            ProbeOutcome::Unknown => "unknown",
        };
        f.write_str(label)
    }
}
