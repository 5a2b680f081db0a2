use std::net::IpAddr;

use indicatif::ProgressStyle;
use synscan_common::ports::{self, PortSet};
use synscan_common::report::{BatchProgress, ScanReport};
use synscan_core::scanner;
use tracing::{Instrument, debug, info_span, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::commands::CommandLine;
use crate::terminal::print;

const PROGRESS_TEMPLATE: &str = "{spinner:.blue} batch {pos}/{len} {wide_bar:.green/black}";

pub async fn scan(commands: &CommandLine) -> anyhow::Result<()> {
    let ports: PortSet = match &commands.port {
        Some(spec) => match ports::parse(spec) {
            Ok(ports) => ports,
            Err(e) => {
                print::invalid_spec(spec, &e);
                return Ok(());
            }
        },
        None => ports::top_1000().clone(),
    };

    if !is_root::is_root() {
        warn!("Raw sockets usually need root privileges; the scan may fail to start");
    }

    let cfg = commands.to_config();
    let host = IpAddr::V4(commands.host);
    debug!("Scanning {} ports on {host}", ports.len());
    print::header("starting scanner");

    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(&ProgressStyle::with_template(PROGRESS_TEMPLATE)?);
    span.pb_set_length(batch_count(ports.len(), cfg.effective_capacity(ports.len())));

    let progress = span.clone();
    let on_batch: Box<scanner::ProgressCallback> =
        Box::new(move |_: &BatchProgress| progress.pb_inc(1));

    let report = scanner::perform_scan(host, &ports, cfg, Some(on_batch))
        .instrument(span)
        .await?;

    match report {
        ScanReport::HostDown { host, .. } => print::host_down(host),
        ScanReport::Completed(result) => print::report(&result),
    }
    Ok(())
}

fn batch_count(ports: usize, capacity: usize) -> u64 {
    ports.div_ceil(capacity.max(1)) as u64
}
