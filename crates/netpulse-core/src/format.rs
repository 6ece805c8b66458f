//! Human-readable byte, rate, and duration formatting helpers.
//!
//! Shared by the TUI and the CLI so both frontends print identical numbers.

const BINARY_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary units (e.g., "512 B", "1.5 MB").
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", BINARY_UNITS[unit])
}

/// Format bytes into a compact string for narrow columns (e.g., "245M", "1.2G").
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_bytes_short(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}G", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{}M", bytes / 1_000_000)
    } else if bytes >= 1_000 {
        format!("{}K", bytes / 1_000)
    } else {
        format!("{bytes}B")
    }
}

/// Format a rate in bytes/sec as bits: "245.0 Mbps".
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_rate(bytes_per_sec: u64) -> String {
    let bits = bytes_per_sec.saturating_mul(8);
    if bits >= 1_000_000_000 {
        format!("{:.1} Gbps", bits as f64 / 1_000_000_000.0)
    } else if bits >= 1_000_000 {
        format!("{:.1} Mbps", bits as f64 / 1_000_000.0)
    } else if bits >= 1_000 {
        format!("{:.1} Kbps", bits as f64 / 1_000.0)
    } else {
        format!("{bits} bps")
    }
}

/// Compact rate for chart axis labels: "50M", "1.2G", "500K".
/// Input is bytes/sec, shown as bits.
pub fn fmt_rate_axis(bytes_per_sec: f64) -> String {
    let bits = bytes_per_sec * 8.0;
    if bits >= 1_000_000_000.0 {
        format!("{:.1}G", bits / 1_000_000_000.0)
    } else if bits >= 1_000_000.0 {
        format!("{:.0}M", bits / 1_000_000.0)
    } else if bits >= 1_000.0 {
        format!("{:.0}K", bits / 1_000.0)
    } else {
        format!("{bits:.0}")
    }
}

/// Format a limit ceiling given in kbps: "512 kbps", "2.0 Mbps".
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_kbps(kbps: u64) -> String {
    if kbps >= 1_000_000 {
        format!("{:.1} Gbps", kbps as f64 / 1_000_000.0)
    } else if kbps >= 1_000 {
        format!("{:.1} Mbps", kbps as f64 / 1_000.0)
    } else {
        format!("{kbps} kbps")
    }
}

/// Format seconds into a two-unit duration: "3d 4h", "4h 23m", "12m 5s".
pub fn fmt_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// Render a proportional traffic bar using fractional block characters.
///
/// Uses ▏▎▍▌▋▊▉█ for sub-character precision across `max_chars` positions.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
pub fn fmt_traffic_bar(value: u64, max_value: u64, max_chars: u16) -> String {
    const FRACTIONAL: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

    if max_value == 0 || max_chars == 0 {
        return " ".repeat(usize::from(max_chars));
    }
    let fraction = (value as f64 / max_value as f64).min(1.0);
    let total_eighths = (fraction * f64::from(max_chars) * 8.0).round() as usize;
    let full_blocks = total_eighths / 8;
    let remainder = total_eighths % 8;

    let mut bar = "█".repeat(full_blocks);
    if remainder > 0 {
        bar.push(FRACTIONAL[remainder]);
    }
    let bar_len = full_blocks + usize::from(remainder > 0);
    bar.push_str(&" ".repeat(usize::from(max_chars).saturating_sub(bar_len)));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(fmt_bytes(0), "0 B");
        assert_eq!(fmt_bytes(1023), "1023 B");
        assert_eq!(fmt_bytes(1536), "1.5 KB");
        assert_eq!(fmt_bytes(1_048_576), "1.0 MB");
        assert_eq!(fmt_bytes(u64::MAX), "16777216.0 TB");
    }

    #[test]
    fn short_bytes() {
        assert_eq!(fmt_bytes_short(999), "999B");
        assert_eq!(fmt_bytes_short(245_000_000), "245M");
        assert_eq!(fmt_bytes_short(1_200_000_000), "1.2G");
    }

    #[test]
    fn rates_are_shown_in_bits() {
        assert_eq!(fmt_rate(0), "0 bps");
        assert_eq!(fmt_rate(125_000), "1.0 Mbps");
        assert_eq!(fmt_rate(200), "1.6 Kbps");
        assert_eq!(fmt_rate_axis(6_250_000.0), "50M");
    }

    #[test]
    fn kbps_ceilings() {
        assert_eq!(fmt_kbps(512), "512 kbps");
        assert_eq!(fmt_kbps(2048), "2.0 Mbps");
    }

    #[test]
    fn uptime_uses_two_units() {
        assert_eq!(fmt_uptime(0), "0m 0s");
        assert_eq!(fmt_uptime(725), "12m 5s");
        assert_eq!(fmt_uptime(4 * 3600 + 23 * 60), "4h 23m");
        assert_eq!(fmt_uptime(3 * 86400 + 4 * 3600 + 59), "3d 4h");
    }

    #[test]
    fn traffic_bar_spans_width() {
        assert_eq!(fmt_traffic_bar(0, 0, 4), "    ");
        assert_eq!(fmt_traffic_bar(10, 10, 4), "████");
        assert_eq!(fmt_traffic_bar(1, 2, 4).chars().count(), 4);
        assert!(fmt_traffic_bar(1, 2, 4).starts_with("██"));
    }
}
