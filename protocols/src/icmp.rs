use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;

pub const ICMP_HDR_LEN: usize = 8;
pub const DESTINATION_UNREACHABLE: u8 = 3;

/// Leading bytes of the quoted transport header needed to recover both ports.
const QUOTED_PORTS_LEN: usize = 4;

/// A TCP header quoted back to us inside an ICMP error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedTcp {
    /// Destination of the datagram that triggered the error.
    pub destination: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpMessage {
    EchoReply {
        identifier: u16,
        sequence: u16,
    },
    /// An error message quoting one of our TCP segments.
    TcpError {
        icmp_type: u8,
        code: u8,
        quoted: QuotedTcp,
    },
    Other {
        icmp_type: u8,
        code: u8,
    },
}

pub fn create_echo_request(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_HDR_LEN];
    {
        let mut echo: MutableEchoRequestPacket =
            MutableEchoRequestPacket::new(&mut buffer).context("creating echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_checksum(0);
    }

    let checksum: u16 = {
        let packet = IcmpPacket::new(&buffer).context("reading echo request")?;
        icmp::checksum(&packet)
    };
    buffer[2..4].copy_from_slice(&checksum.to_be_bytes());
    Ok(buffer)
}

/// Decodes an ICMP message received without its IP header.
pub fn parse_message(bytes: &[u8]) -> anyhow::Result<IcmpMessage> {
    let packet: IcmpPacket = IcmpPacket::new(bytes).context("truncated ICMP message")?;
    let icmp_type: u8 = packet.get_icmp_type().0;
    let code: u8 = packet.get_icmp_code().0;

    if packet.get_icmp_type() == IcmpTypes::EchoReply {
        let echo = EchoReplyPacket::new(bytes).context("truncated echo reply")?;
        return Ok(IcmpMessage::EchoReply {
            identifier: echo.get_identifier(),
            sequence: echo.get_sequence_number(),
        });
    }

    match quoted_tcp(bytes) {
        Some(quoted) => Ok(IcmpMessage::TcpError {
            icmp_type,
            code,
            quoted,
        }),
        None => Ok(IcmpMessage::Other { icmp_type, code }),
    }
}

/// Extracts the offending TCP header from an error message, if there is one.
fn quoted_tcp(bytes: &[u8]) -> Option<QuotedTcp> {
    let quoted: &[u8] = bytes.get(ICMP_HDR_LEN..)?;
    let ip: Ipv4Packet = Ipv4Packet::new(quoted)?;
    if ip.get_version() != 4 || ip.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
        return None;
    }

    let header_len: usize = usize::from(ip.get_header_length()) * 4;
    let ports: &[u8] = quoted.get(header_len..header_len + QUOTED_PORTS_LEN)?;

    Some(QuotedTcp {
        destination: ip.get_destination(),
        source_port: u16::from_be_bytes([ports[0], ports[1]]),
        destination_port: u16::from_be_bytes([ports[2], ports[3]]),
    })
}
