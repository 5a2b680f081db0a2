use std::fmt::Display;
use std::net::IpAddr;

use colored::*;
use synscan_common::{PortSpecError, ProbeOutcome, ScanResult};
use tracing::info;

use crate::terminal::{colors, format};

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "synscan::print";
pub const PRINT_FIELD: &str = "raw_msg";

/// Order in which categories are listed in a report.
const REPORT_ORDER: [ProbeOutcome; 5] = [
    ProbeOutcome::Open,
    ProbeOutcome::Filtered,
    ProbeOutcome::Closed,
    ProbeOutcome::Dropped,
    ProbeOutcome::Unknown,
];

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = console::measure_text_width(&formatted);

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: String = format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).color(colors::SEPARATOR)
    );

    print(&line);
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR);
    print(&format!("{}", sep));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}

fn outcome_color(outcome: ProbeOutcome) -> Color {
    match outcome {
        ProbeOutcome::Open => colors::OPEN,
        ProbeOutcome::Closed => colors::CLOSED,
        ProbeOutcome::Filtered => colors::FILTERED,
        ProbeOutcome::Dropped => colors::DROPPED,
        ProbeOutcome::Unknown => colors::UNKNOWN,
    }
}

fn category_title(outcome: ProbeOutcome, count: usize) -> String {
    format!("{} ports ({})", outcome, count)
}

fn category(outcome: ProbeOutcome, ports: &[u16]) {
    header(&category_title(outcome, ports.len()));
    for row in format::port_rows(ports) {
        print_status(format!("{}", row.color(outcome_color(outcome))));
    }
}

fn summary_line(result: &ScanResult) -> String {
    format!(
        "{} packets sent, {} packets received. {} hits",
        result.total,
        result.responses,
        format::hit_rate(result.hit_rate())
    )
}

fn completion_line(host: impl Display, seconds: &str) -> String {
    format!("{} scan complete in {} seconds", host, seconds)
}

pub fn report(result: &ScanResult) {
    for outcome in REPORT_ORDER {
        let ports = result.ports(outcome);
        if outcome == ProbeOutcome::Unknown && ports.is_empty() {
            continue;
        }
        category(outcome, ports);
    }

    fat_separator();
    centerln(&summary_line(result).color(colors::PRIMARY).to_string());
    centerln(
        &completion_line(
            result.host.to_string().color(colors::ACCENT),
            &format::seconds(result.elapsed),
        ),
    );
    fat_separator();
}

pub fn host_down(host: IpAddr) {
    print(&format!(
        "{} {} {}",
        "Host".color(colors::TEXT_DEFAULT),
        host.to_string().color(colors::ACCENT),
        "is down, scan complete.".color(colors::TEXT_DEFAULT)
    ));
}

/// Points a caret at the offending byte of `spec`.
fn spec_hint(spec: &str, err: &PortSpecError) -> [String; 2] {
    let position: usize = err.position();
    let column: usize = spec
        .get(..position)
        .map_or(position, |prefix| prefix.chars().count());
    [spec.to_string(), format!("{}^", " ".repeat(column))]
}

pub fn invalid_spec(spec: &str, err: &PortSpecError) {
    print(&format!("{} {}", "Invalid port specification:".red().bold(), err));
    for line in spec_hint(spec, err) {
        print_status(line);
    }
    print_status("Expected comma-separated ports or ranges, e.g. -p 22,80,1000-2000");
}
