//! # Port Specifications
//!
//! Turns user input such as `80,443,1000-1002` into a [`PortSet`].
//!
//! Parsing happens in two passes: the whole string is first run through a
//! small state machine ([`spec`]) which either yields tokens or rejects the
//! input with a position, and only then are ranges expanded. A malformed
//! specification therefore never produces a partial set.
//!
//! Values are not checked against the TCP port range here; `99999` is a
//! valid specification. The scanner rejects such ports before sending.
//! A range running past 65535 is cut short after its first value above it,
//! so `1-4294967295` stays small and still fails the scanner's check on the
//! same port.

use std::collections::HashSet;
use std::str::FromStr;

use tracing::trace;

use crate::error::PortSpecError;

mod spec;
mod top;

pub use top::top_1000;

use spec::Token;

/// First value past the TCP port range.
const PAST_TCP_RANGE: u32 = u16::MAX as u32 + 1;

/// Unique port numbers in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<u32>,
    seen: HashSet<u32>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `port` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, port: u32) -> bool {
        let is_new = self.seen.insert(port);
        if is_new {
            self.ports.push(port);
        }
        is_new
    }

    pub fn contains(&self, port: u32) -> bool {
        self.seen.contains(&port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.ports
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ports.iter().copied()
    }

    /// Splits the set into consecutive batches of at most `capacity` ports.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn batches(&self, capacity: usize) -> std::slice::Chunks<'_, u32> {
        self.ports.chunks(capacity)
    }
}

impl FromIterator<u32> for PortSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = PortSet::new();
        for port in iter {
            set.insert(port);
        }
        set
    }
}

impl FromStr for PortSet {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses a port specification.
///
/// Ranges are direction-agnostic (`1002-1000` equals `1000-1002`) and duplicates
/// keep their first position.
pub fn parse(spec: &str) -> Result<PortSet, PortSpecError> {
    let tokens: Vec<Token> = spec::tokenize(spec)?;
    let mut set = PortSet::new();

    for token in tokens {
        match token {
            Token::Single(port) => {
                set.insert(port);
            }
            Token::Range(a, b) => {
                let (low, high) = (a.min(b), a.max(b));
                for port in low..=high.min(low.max(PAST_TCP_RANGE)) {
                    set.insert(port);
                }
            }
        }
    }

    trace!("Port specification expanded to {} ports", set.len());
    Ok(set)
}
