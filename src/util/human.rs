/// Format a raw byte count into a human-readable string: "12.5 MB"
pub fn fmt_bytes(bytes: u64) -> String {
    fmt_bytes_f(bytes as f64)
}

fn fmt_bytes_f(b: f64) -> String {
    const TB: f64 = 1_099_511_627_776.0;
    const GB: f64 = 1_073_741_824.0;
    const MB: f64 = 1_048_576.0;
    const KB: f64 = 1_024.0;
    if b >= TB      { format!("{:.1} TB", b / TB) }
    else if b >= GB { format!("{:.1} GB", b / GB) }
    else if b >= MB { format!("{:.1} MB", b / MB) }
    else if b >= KB { format!("{:.1} KB", b / KB) }
    else            { format!("{:.0} B",  b) }
}

/// Format a `[0, 1]` fraction as a whole percentage: "42%"
pub fn fmt_fraction(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Parse "4G", "512M", "1.5T", "2048" (bytes) into a byte count.
/// Suffixes are binary and case-insensitive; a trailing "B"/"iB" is allowed.
pub fn parse_size(input: &str) -> Option<u64> {
    let s = input.trim();
    let s = s.strip_suffix("iB").or_else(|| s.strip_suffix("ib")).unwrap_or(s);
    let s = s.strip_suffix(['B', 'b']).unwrap_or(s);
    let (number, shift) = match s.chars().last()?.to_ascii_uppercase() {
        'K' => (&s[..s.len() - 1], 10),
        'M' => (&s[..s.len() - 1], 20),
        'G' => (&s[..s.len() - 1], 30),
        'T' => (&s[..s.len() - 1], 40),
        _   => (s, 0),
    };
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 { return None; }
    let bytes = value * (1u64 << shift) as f64;
    if bytes >= u64::MAX as f64 { return None; }
    Some(bytes.round() as u64)
}
