use std::sync::OnceLock;

use super::{PortSet, parse};

/// Nmap's 1,000 most common TCP ports, in specification form.
const TOP_1000_SPEC: &str = include_str!("top1000.txt");

static TOP_1000: OnceLock<PortSet> = OnceLock::new();

/// Default port set used when no specification is given.
pub fn top_1000() -> &'static PortSet {
    TOP_1000.get_or_init(|| {
        parse(TOP_1000_SPEC.trim()).expect("embedded top-1000 port table is malformed")
    })
}
