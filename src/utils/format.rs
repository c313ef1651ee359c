use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

/// Weights are shown with two decimals, as the record screen stores them.
pub fn format_weight(kg: f64) -> String {
    format!("{:.2}", kg)
}

/// One decimal, trailing ".0" dropped ("72", "72.5").
pub fn format_short(kg: f64) -> String {
    if kg == kg.floor() {
        format!("{}", kg as i64)
    } else {
        format!("{:.1}", kg)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Expected a date like 2024-01-31, got '{}'", s))
}

/// Create a simple ASCII progress bar for a ratio in [0, 1]
pub fn progress_bar(ratio: f64, width: usize) -> String {
    if !ratio.is_finite() || ratio <= 0.0 {
        return "░".repeat(width);
    }
    let filled_count = (ratio.min(1.0) * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Right-pad to a display width. CJK labels count two columns per glyph.
pub fn pad_display(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_and_short_forms() {
        assert_eq!(format_weight(78.0), "78.00");
        assert_eq!(format_weight(78.456), "78.46");
        assert_eq!(format_short(72.0), "72");
        assert_eq!(format_short(72.5), "72.5");
    }

    #[test]
    fn dates_parse_and_print() {
        let d = parse_date(" 2024-02-29 ").unwrap();
        assert_eq!(format_date(d), "2024-02-29");
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn progress_bar_fills_by_ratio() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(2.0, 3), "███");
        assert_eq!(progress_bar(f64::NAN, 2), "░░");
    }

    #[test]
    fn padding_counts_wide_glyphs() {
        assert_eq!(pad_display("Mon", 5), "Mon  ");
        assert_eq!(pad_display("周一", 5), "周一 ");
        assert_eq!(pad_display("toolong", 3), "toolong");
    }
}
