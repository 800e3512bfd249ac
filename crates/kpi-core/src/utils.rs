//! 通用工具函数

/// 验证 `#RRGGBB` 六位十六进制颜色格式
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// 解析填报文本中的数值
///
/// 空白、非数字以及 NaN/无穷大都视为无法解析。
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_hex_color() {
        assert!(is_valid_hex_color("#1f77b4"));
        assert!(is_valid_hex_color("#ABCDEF"));
        assert!(!is_valid_hex_color("1f77b4"));
        assert!(!is_valid_hex_color("#fff"));
        assert!(!is_valid_hex_color("#12345g"));
        assert!(!is_valid_hex_color(""));
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("5"), Some(5.0));
        assert_eq!(parse_numeric(" 2.5 "), Some(2.5));
        assert_eq!(parse_numeric("-3"), Some(-3.0));
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
    }
}
