//! Raw-socket implementation of the scanner's packet boundary.

mod route;
pub mod transport;

pub use transport::RawTransport;
