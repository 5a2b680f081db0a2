//! Maps a probe's reply (or lack of one) to a [`ProbeOutcome`].
//!
//! | reply                                   | outcome  |
//! |-----------------------------------------|----------|
//! | none before the window closed           | Dropped  |
//! | no TCP or ICMP layer                    | Filtered |
//! | TCP, flags exactly SYN+ACK              | Open     |
//! | TCP, flags exactly RST+ACK              | Closed   |
//! | ICMP type 3, code 1/2/3/9/10/13         | Filtered |
//! | anything else                           | Unknown  |

use pnet::packet::tcp::TcpFlags;
use tracing::debug;

use synscan_common::ProbeOutcome;
use synscan_common::transport::ReplyPayload;
use synscan_protocols::icmp::DESTINATION_UNREACHABLE;

const SYN_ACK: u8 = TcpFlags::SYN | TcpFlags::ACK;
const RST_ACK: u8 = TcpFlags::RST | TcpFlags::ACK;

/// Unreachable codes treated as a deliberate rejection: host, protocol and
/// port unreachable plus the administratively prohibited family.
const REJECTION_CODES: [u8; 6] = [1, 2, 3, 9, 10, 13];

pub fn classify(reply: Option<ReplyPayload>) -> ProbeOutcome {
    let Some(payload) = reply else {
        return ProbeOutcome::Dropped;
    };

    match payload {
        ReplyPayload::Unrecognized => ProbeOutcome::Filtered,
        ReplyPayload::Tcp { flags: SYN_ACK } => ProbeOutcome::Open,
        ReplyPayload::Tcp { flags: RST_ACK } => ProbeOutcome::Closed,
        ReplyPayload::Icmp {
            icmp_type: DESTINATION_UNREACHABLE,
            code,
        } if REJECTION_CODES.contains(&code) => ProbeOutcome::Filtered,
        other => {
            debug!("Reply fits no category: {other:?}");
            ProbeOutcome::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp(flags: u8) -> Option<ReplyPayload> {
        Some(ReplyPayload::Tcp { flags })
    }

    fn icmp(icmp_type: u8, code: u8) -> Option<ReplyPayload> {
        Some(ReplyPayload::Icmp { icmp_type, code })
    }

    #[test]
    fn silence_is_dropped() {
        assert_eq!(classify(None), ProbeOutcome::Dropped);
    }

    #[test]
    fn tcp_handshake_replies() {
        assert_eq!(classify(tcp(TcpFlags::SYN | TcpFlags::ACK)), ProbeOutcome::Open);
        assert_eq!(classify(tcp(TcpFlags::RST | TcpFlags::ACK)), ProbeOutcome::Closed);
    }

    #[test]
    fn flags_must_match_exactly() {
        assert_eq!(classify(tcp(TcpFlags::RST)), ProbeOutcome::Unknown);
        assert_eq!(
            classify(tcp(TcpFlags::SYN | TcpFlags::ACK | TcpFlags::ECE)),
            ProbeOutcome::Unknown
        );
        assert_eq!(classify(tcp(TcpFlags::SYN)), ProbeOutcome::Unknown);
    }

    #[test]
    fn unreachable_rejections_are_filtered() {
        for code in REJECTION_CODES {
            assert_eq!(classify(icmp(3, code)), ProbeOutcome::Filtered);
        }
    }

    #[test]
    fn other_icmp_is_unknown() {
        assert_eq!(classify(icmp(3, 0)), ProbeOutcome::Unknown);
        assert_eq!(classify(icmp(3, 4)), ProbeOutcome::Unknown);
        assert_eq!(classify(icmp(11, 0)), ProbeOutcome::Unknown);
    }

    #[test]
    fn bare_reply_is_filtered() {
        assert_eq!(
            classify(Some(ReplyPayload::Unrecognized)),
            ProbeOutcome::Filtered
        );
    }
}
