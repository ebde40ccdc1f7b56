/// Format a count with thousands separators (1234567 -> "1,234,567").
pub fn format_count(val: u64) -> String {
    let digits = val.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact magnitude display for tiles where full precision is noise.
pub fn format_compact(val: f64) -> String {
    if val >= 1_000_000_000.0 {
        format!("{:.1}B", val / 1_000_000_000.0)
    } else if val >= 1_000_000.0 {
        format!("{:.1}M", val / 1_000_000.0)
    } else if val >= 1_000.0 {
        format!("{:.1}k", val / 1_000.0)
    } else {
        format!("{val:.0}")
    }
}

/// Format an averaged duration in seconds. Short windows read in seconds,
/// anything longer in minutes.
pub fn format_duration_secs(secs: f64) -> String {
    if secs < 90.0 {
        format!("{secs:.1} sec")
    } else {
        format!("{:.1} min", secs / 60.0)
    }
}
