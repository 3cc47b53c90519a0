/// `50.0` -> `"80"`.
pub fn alpha_percentage_to_hex(value: f64) -> String {
    format!("{:02X}", (value * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8)
}

/// `0.5` -> `"80"`.
pub fn alpha_decimal_to_hex(value: f64) -> String {
    format!("{:02X}", (value * 255.0).round().clamp(0.0, 255.0) as u8)
}

pub fn hex_to_alpha_percentage(value: &str) -> Option<f64> {
    u8::from_str_radix(value, 16).ok().map(|d| d as f64 * 100.0 / 255.0)
}

/// Channels in 0..=255, alpha in 0..=1. Opaque colors drop the alpha pair.
pub fn rgba_to_hex(r: f64, g: f64, b: f64, a: f64) -> String {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    let rgb = format!("#{:02X}{:02X}{:02X}", channel(r), channel(g), channel(b));
    if a >= 1.0 { rgb } else { format!("{}{}", rgb, alpha_decimal_to_hex(a)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_conversions() {
        assert_eq!(alpha_percentage_to_hex(100.0), "FF");
        assert_eq!(alpha_percentage_to_hex(0.0), "00");
        assert_eq!(alpha_decimal_to_hex(0.5), "80");
        let pct = hex_to_alpha_percentage("80").unwrap();
        assert!((pct - 50.196).abs() < 0.001);
        assert_eq!(hex_to_alpha_percentage("zz"), None);
    }

    #[test]
    fn rgba_hex() {
        assert_eq!(rgba_to_hex(255.0, 255.0, 255.0, 1.0), "#FFFFFF");
        assert_eq!(rgba_to_hex(255.0, 0.0, 16.0, 0.0), "#FF001000");
    }
}
