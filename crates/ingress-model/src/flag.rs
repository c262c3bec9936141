//! Boolean flag parsing shared by settings and transform options.

/// Parse a boolean written as `true/false`, `yes/no`, `y/n`, `1/0` or `on/off`,
/// ignoring case and surrounding whitespace.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_spellings() {
        for value in ["true", "YES", " y ", "1", "On"] {
            assert_eq!(parse_flag(value), Some(true), "{value}");
        }
        for value in ["false", "No", "n", "0", "OFF"] {
            assert_eq!(parse_flag(value), Some(false), "{value}");
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }
}
