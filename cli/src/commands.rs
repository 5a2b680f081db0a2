pub mod scan;

use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use synscan_common::config::{
    Config, DEFAULT_BATCH_CAPACITY, DispatchPolicy, SourcePortPolicy,
};

#[derive(Parser)]
#[command(name = "synscan")]
#[command(about = "TCP half-open (SYN) port scanner.")]
pub struct CommandLine {
    /// Target host IPv4 address (e.g. --host 192.168.1.1)
    #[arg(long)]
    pub host: Ipv4Addr,

    /// List/range of ports to scan (e.g. -p 80,443,1000-1337). Defaults to the top 1,000 TCP ports
    #[arg(short, long)]
    pub port: Option<String>,

    /// Milliseconds to wait for the liveness echo reply
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub timeout: u64,

    /// Milliseconds to collect replies after each batch is sent
    #[arg(long, value_name = "MS", default_value_t = 200)]
    pub window: u64,

    /// Maximum number of probes in flight per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_CAPACITY)]
    pub batch_size: usize,

    /// How probes are grouped on the wire
    #[arg(long, value_enum, default_value_t = Policy::Batched)]
    pub policy: Policy,

    /// Source port allocation within a batch
    #[arg(long, value_enum, default_value_t = SourcePorts::Shared)]
    pub source_port: SourcePorts,

    /// Treat the host as up and skip the ICMP liveness probe
    #[arg(short = 'P', long = "skip-ping")]
    pub skip_ping: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Policy {
    /// One batch at a time, each followed by its collection window
    Batched,
    /// Every probe at once, one collection window
    Unbounded,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SourcePorts {
    /// One random ephemeral port per batch
    Shared,
    /// A distinct port per probe
    Unique,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse_from(std::env::args_os().map(expand_nmap_style))
    }

    pub fn to_config(&self) -> Config {
        Config {
            liveness_timeout: Duration::from_millis(self.timeout),
            collection_window: Duration::from_millis(self.window),
            batch_capacity: self.batch_size,
            dispatch: match self.policy {
                Policy::Batched => DispatchPolicy::Batched,
                Policy::Unbounded => DispatchPolicy::Unbounded,
            },
            source_ports: match self.source_port {
                SourcePorts::Shared => SourcePortPolicy::Shared,
                SourcePorts::Unique => SourcePortPolicy::Unique,
            },
            skip_liveness: self.skip_ping,
        }
    }
}

/// `-Pn` is one flag to nmap users; clap would read it as `-P -n`.
fn expand_nmap_style(arg: OsString) -> OsString {
    if arg == "-Pn" {
        OsString::from("--skip-ping")
    } else {
        arg
    }
}
