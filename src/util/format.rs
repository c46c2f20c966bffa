/// Unit prefix family used when humanizing a value
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Prefixes {
    /// k, M, G, ... (powers of 1000)
    Metric,
    /// Ki, Mi, Gi, ... (powers of 1024)
    Binary,
}

impl Prefixes {
    pub fn as_str(self) -> &'static str {
        match self {
            Prefixes::Metric => "metric",
            Prefixes::Binary => "binary",
        }
    }

    fn scale(self) -> (f64, &'static [&'static str]) {
        match self {
            Prefixes::Metric => (1000.0, &["", "k", "M", "G", "T", "P", "E"]),
            Prefixes::Binary => (1024.0, &["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"]),
        }
    }
}

/// Split `value` into a number and a prefixed unit, e.g. `("1.50", "KiB")`
pub fn humanize(value: u64, unit: &str, prefixes: Prefixes) -> (String, String) {
    let (step, names) = prefixes.scale();
    if (value as f64) < step {
        return (value.to_string(), unit.to_string());
    }

    let mut scaled = value as f64;
    let mut idx = 0;
    while scaled >= step && idx + 1 < names.len() {
        scaled /= step;
        idx += 1;
    }
    // Three significant digits keep the number within five columns.
    let number = if scaled < 10.0 {
        format!("{scaled:.2}")
    } else if scaled < 100.0 {
        format!("{scaled:.1}")
    } else {
        format!("{scaled:.0}")
    };
    (number, format!("{}{unit}", names[idx]))
}

/// Format a byte count as a human-readable string (B, KiB, MiB, GiB)
pub fn format_size(bytes: u64) -> String {
    let (number, unit) = humanize(bytes, "B", Prefixes::Binary);
    format!("{number} {unit}")
}

/// Format a plain count with metric prefixes (k, M, G)
pub fn format_count(count: u64) -> String {
    match humanize(count, "", Prefixes::Metric) {
        (number, unit) if unit.is_empty() => number,
        (number, unit) => format!("{number} {unit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KiB");
        assert_eq!(format_size(1536), "1.50 KiB");
        assert_eq!(format_size(1024 * 1024), "1.00 MiB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.00 GiB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.00 k");
        assert_eq!(format_count(2_500_000), "2.50 M");
        assert_eq!(format_count(42_000), "42.0 k");
        assert_eq!(format_count(999_999), "1000 k");
    }

    #[test]
    fn test_humanize_keeps_unit() {
        assert_eq!(humanize(42, "B", Prefixes::Binary), ("42".into(), "B".into()));
        assert_eq!(humanize(4096, "B", Prefixes::Binary), ("4.00".into(), "KiB".into()));
        assert_eq!(humanize(u64::MAX, "", Prefixes::Metric).1, "E");
    }
}
