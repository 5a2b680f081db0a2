use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::packet::tcp::{self, MutableTcpPacket, TcpFlags, TcpPacket};

pub const TCP_HDR_LEN: usize = 20;
const SYN_WINDOW_SIZE: u16 = 1024;

/// Fields of an incoming segment needed to correlate and classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSummary {
    pub source_port: u16,
    pub destination_port: u16,
    pub flags: u8,
}

/// Builds a bare SYN segment (no options) with a valid checksum.
///
/// The IP header is left to the kernel, but the pseudo-header checksum still
/// needs both addresses.
pub fn create_syn_packet(
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    sequence: u32,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; TCP_HDR_LEN];
    {
        let mut tcp: MutableTcpPacket =
            MutableTcpPacket::new(&mut buffer).context("creating tcp packet")?;
        tcp.set_source(src_port);
        tcp.set_destination(dst_port);
        tcp.set_sequence(sequence);
        tcp.set_acknowledgement(0);
        tcp.set_data_offset((TCP_HDR_LEN / 4) as u8);
        tcp.set_flags(TcpFlags::SYN);
        tcp.set_window(SYN_WINDOW_SIZE);
        tcp.set_urgent_ptr(0);
        tcp.set_checksum(0);

        let checksum: u16 = tcp::ipv4_checksum(&tcp.to_immutable(), &src_addr, &dst_addr);
        tcp.set_checksum(checksum);
    }
    Ok(buffer)
}

pub fn summarize_segment(bytes: &[u8]) -> anyhow::Result<SegmentSummary> {
    let tcp: TcpPacket = TcpPacket::new(bytes).context("truncated or invalid TCP segment")?;
    Ok(SegmentSummary {
        source_port: tcp.get_source(),
        destination_port: tcp.get_destination(),
        flags: tcp.get_flags(),
    })
}
