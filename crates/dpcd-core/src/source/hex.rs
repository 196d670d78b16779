use super::SourceError;

/// Parses hex bytes separated by whitespace or commas, with or without a
/// `0x` prefix.
///
/// # Examples
/// ```
/// use dpcd_core::source::parse_hex_bytes;
///
/// assert_eq!(parse_hex_bytes("11 14 0xc4").unwrap(), vec![0x11, 0x14, 0xc4]);
/// assert_eq!(parse_hex_bytes("11,14").unwrap(), vec![0x11, 0x14]);
/// ```
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, SourceError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_hex_byte)
        .collect()
}

fn parse_hex_byte(token: &str) -> Result<u8, SourceError> {
    let digits = strip_hex_prefix(token);
    if digits.is_empty() || digits.len() > 2 {
        return Err(SourceError::InvalidHex {
            token: token.to_string(),
        });
    }
    u8::from_str_radix(digits, 16).map_err(|_| SourceError::InvalidHex {
        token: token.to_string(),
    })
}

/// Parses an address given as `0x`-prefixed hex or plain decimal.
pub fn parse_address(text: &str) -> Result<u32, SourceError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|_| SourceError::InvalidAddress {
        text: text.to_string(),
    })
}

fn strip_hex_prefix(token: &str) -> &str {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators() {
        assert_eq!(parse_hex_bytes(" 0a,\n0B  ff\t").unwrap(), vec![0x0a, 0x0b, 0xff]);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(parse_hex_bytes("  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_wide_token() {
        let err = parse_hex_bytes("11 123").unwrap_err();
        assert!(matches!(err, SourceError::InvalidHex { ref token } if token == "123"));
    }

    #[test]
    fn rejects_non_hex() {
        assert!(parse_hex_bytes("zz").is_err());
        assert!(parse_hex_bytes("0x").is_err());
    }

    #[test]
    fn addresses_in_hex_or_decimal() {
        assert_eq!(parse_address("0x1400").unwrap(), 0x1400);
        assert_eq!(parse_address("273").unwrap(), 273);
        assert!(parse_address("0xzz").is_err());
    }
}
