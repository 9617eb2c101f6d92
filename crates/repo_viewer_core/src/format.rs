#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Renders a byte count with a binary unit, e.g. `1536` as `"1.5 KB"`.
///
/// Values keep at most two decimals with trailing zeros removed. Anything past
/// gigabytes stays in gigabytes.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[unit])
}
