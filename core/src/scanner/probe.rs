use std::ops::RangeInclusive;

use synscan_common::ScanError;
use synscan_common::config::SourcePortPolicy;
use synscan_common::ports::PortSet;
use synscan_common::transport::{ProbeId, ProbeKey, SynProbe};

/// IANA dynamic/private port range.
const EPHEMERAL_PORTS: RangeInclusive<u16> = 49_152..=65_535;
const EPHEMERAL_COUNT: u32 = 16_384;

/// Narrows a parsed port set to TCP ports, refusing anything outside 1-65535.
pub(super) fn validate_ports(ports: &PortSet) -> Result<Vec<u16>, ScanError> {
    ports
        .iter()
        .map(|port| match u16::try_from(port) {
            Ok(p) if p != 0 => Ok(p),
            _ => Err(ScanError::PortOutOfRange(port)),
        })
        .collect()
}

/// Builds the SYN probes for one batch.
///
/// `first_id` is the position of the batch's first port in the whole scan.
/// Keys stay unique within a batch under either policy because destination
/// ports are unique.
pub(super) fn build_batch(ports: &[u16], first_id: usize, policy: SourcePortPolicy) -> Vec<SynProbe> {
    let base: u16 = rand::random_range(EPHEMERAL_PORTS);

    ports
        .iter()
        .enumerate()
        .map(|(offset, &destination_port)| SynProbe {
            id: ProbeId(first_id + offset),
            key: ProbeKey {
                source_port: source_port(policy, base, offset),
                destination_port,
            },
            sequence: rand::random(),
        })
        .collect()
}

fn source_port(policy: SourcePortPolicy, base: u16, offset: usize) -> u16 {
    match policy {
        SourcePortPolicy::Shared => base,
        SourcePortPolicy::Unique => {
            let start: u32 = u32::from(*EPHEMERAL_PORTS.start());
            let shifted: u32 = (u32::from(base) - start + offset as u32) % EPHEMERAL_COUNT;
            (start + shifted) as u16
        }
    }
}
