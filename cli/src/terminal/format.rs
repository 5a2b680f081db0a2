use std::time::Duration;

pub const PORTS_PER_ROW: usize = 10;

/// Splits `ports` into display rows of ten, joined by ` , `.
pub fn port_rows(ports: &[u16]) -> Vec<String> {
    ports
        .chunks(PORTS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(" , ")
        })
        .collect()
}

pub fn seconds(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64())
}

pub fn hit_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}
