//! Ordinate formatting for text output

/// Format an ordinate in plain decimal notation
///
/// Uses the shortest representation that parses back to the same `f64`,
/// never scientific notation. Integral values carry no fractional part and
/// negative zero prints as `0`.
pub fn format_ordinate(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Format a coordinate pair as `x y`
pub fn format_pair(x: f64, y: f64) -> String {
    format!("{} {}", format_ordinate(x), format_ordinate(y))
}
