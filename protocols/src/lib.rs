//! Wire formats used by the scanner: TCP SYN segments and ICMP messages.

pub mod icmp;
pub mod tcp;
