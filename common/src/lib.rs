pub mod config;
pub mod error;
pub mod outcome;
pub mod ports;
pub mod report;
pub mod transport;

pub use error::{PortSpecError, ScanError, TransportError};
pub use outcome::ProbeOutcome;
pub use ports::PortSet;
pub use report::{ScanReport, ScanResult};
