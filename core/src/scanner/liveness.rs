use std::net::IpAddr;
use std::time::Duration;

use synscan_common::TransportError;
use synscan_common::transport::ProbeTransport;
use tracing::{info, warn};

/// Single best-effort reachability check; no retries.
pub(super) async fn is_up<T: ProbeTransport>(
    transport: &mut T,
    host: IpAddr,
    timeout: Duration,
) -> Result<bool, TransportError> {
    let up = transport.echo(host, timeout).await?;
    if up {
        info!("Host {host} is up, starting scan");
    } else {
        warn!("Host {host} did not answer within {:.1}s", timeout.as_secs_f64());
    }
    Ok(up)
}
