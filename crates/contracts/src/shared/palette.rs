//! Colour palette for dashboards.
//!
//! Core colours follow the Okabe–Ito set (colour-blind safe); every colour
//! role is paired with a marker shape, dash style or pattern in the charts
//! so that no information is carried by hue alone.

/// Main series (current year).
pub const PRIMARY: &str = "#0072B2";
/// Comparison series (prior year).
pub const SECONDARY: &str = "#D55E00";
/// Growth / success.
pub const POSITIVE: &str = "#009E73";
/// Decline / warning, always paired with a pattern.
pub const CRITICAL: &str = "#CC79A7";
/// Secondary highlight (cumulative line).
pub const SKY: &str = "#56B4E9";

pub const BRAND_PRIMARY: &str = "#173A6D";
pub const NEUTRAL_TEXT: &str = "#2B2B2B";
pub const GRID: &str = "#C7CED6";
pub const CANVAS: &str = "#FFFFFF";

/// Annual goal rule on the cumulative chart.
pub const GOAL_RULE: &str = "#7A7C88";

/// Low end of the single-hue heatmap scale (high end is [`PRIMARY`]).
pub const HEATMAP_LOW: &str = "#E8F3FC";

/// Parses `#RRGGBB` into its components.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Linear interpolation between two `#RRGGBB` colours, `t` clamped to `0..=1`.
///
/// Falls back to `high` when either colour cannot be parsed.
pub fn interpolate(low: &str, high: &str, t: f64) -> String {
    let (Some(a), Some(b)) = (parse_hex(low), parse_hex(high)) else {
        return high.to_string();
    };
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |x: u8, y: u8| -> u8 { (x as f64 + (y as f64 - x as f64) * t).round() as u8 };
    format!("#{:02X}{:02X}{:02X}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex(PRIMARY), Some((0x00, 0x72, 0xB2)));
        assert_eq!(parse_hex("0072B2"), None);
        assert_eq!(parse_hex("#12"), None);
    }

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate(HEATMAP_LOW, PRIMARY, 0.0), "#E8F3FC");
        assert_eq!(interpolate(HEATMAP_LOW, PRIMARY, 1.0), "#0072B2");
        assert_eq!(interpolate(HEATMAP_LOW, PRIMARY, 7.0), "#0072B2");
        assert_eq!(interpolate("#000000", "#FFFFFF", 0.5), "#808080");
    }
}
