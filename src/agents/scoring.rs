//! Helpers shared by the LLM judge agents.

use std::sync::LazyLock;

use regex::Regex;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d+(?:\.\d+)?|-?\.\d+").expect("Invalid regex for decimal scores")
});

/// Extracts the first decimal-looking number from a judge reply, keeping a
/// leading minus sign.
///
/// Judges are told to answer with a single number but often wrap it in prose
/// ("Score: 0.7") or markdown.
pub fn parse_first_decimal(reply: &str) -> Option<f64> {
    DECIMAL
        .find(reply)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parses a judge reply into a score clamped to [0, 1].
pub fn parse_unit_score(reply: &str) -> Option<f64> {
    parse_first_decimal(reply).map(|v| v.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_decimal() {
        assert_eq!(parse_first_decimal("0.75"), Some(0.75));
        assert_eq!(parse_first_decimal("Score: 0.4\nbecause..."), Some(0.4));
        assert_eq!(parse_first_decimal("**.9**"), Some(0.9));
        assert_eq!(parse_first_decimal("1"), Some(1.0));
        assert_eq!(parse_first_decimal("0.3 or maybe 0.8"), Some(0.3));
        assert_eq!(parse_first_decimal("-0.8"), Some(-0.8));
        assert_eq!(parse_first_decimal("Score: -.5"), Some(-0.5));
        assert_eq!(parse_first_decimal("no idea"), None);
        assert_eq!(parse_first_decimal(""), None);
    }

    #[test]
    fn test_parse_unit_score_clamps() {
        assert_eq!(parse_unit_score("7"), Some(1.0));
        assert_eq!(parse_unit_score("1.5"), Some(1.0));
        assert_eq!(parse_unit_score("0.25"), Some(0.25));
        assert_eq!(parse_unit_score("-0.8"), Some(0.0));
        assert_eq!(parse_unit_score("-1"), Some(0.0));
        assert_eq!(parse_unit_score("-"), None);
    }
}
