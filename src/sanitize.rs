//! Numeric guards for values that cross the engine boundary.

/// Elapsed time in seconds; non-finite or negative input becomes 0.
pub fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Sampling weight; non-finite or non-positive weights count as 0.
pub fn sampling_weight(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Percentage of `part` over `whole`, 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 && whole.is_finite() {
        part / whole * 100.0
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Category label; blank or control-character labels collapse to `unknown`.
pub fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
