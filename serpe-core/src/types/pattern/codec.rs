//! Numeric codecs between patterns and hex / octal / decimal strings.
//!
//! All three use the same left-to-right significance: the leftmost step is the
//! least significant bit. Hex and octal split the pattern into groups of 4 and
//! 3 steps and emit one digit per group in reading order, so `1000` is `0x1`
//! and `0x94:8` reads as `1001` `0010`. A short trailing group is zero-padded.

use super::core::{clamp_steps, Pattern, PatternError, MAX_STEPS};

/// Numeric base of an encoded pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Radix {
    Hex,
    Octal,
    Decimal,
}

impl Radix {
    /// Notation prefix: `0x`, `0o`, `d`
    pub fn prefix(self) -> &'static str {
        match self {
            Radix::Hex => "0x",
            Radix::Octal => "0o",
            Radix::Decimal => "d",
        }
    }

    /// Steps covered by one digit (decimal is not grouped)
    pub fn group_size(self) -> Option<usize> {
        match self {
            Radix::Hex => Some(4),
            Radix::Octal => Some(3),
            Radix::Decimal => None,
        }
    }

    fn digit_value(self, c: char) -> Option<u32> {
        match self {
            Radix::Hex => c.to_digit(16),
            Radix::Octal => c.to_digit(8),
            Radix::Decimal => c.to_digit(10),
        }
    }
}

/// Decode `digits` (without prefix) into a pattern of `steps` steps.
///
/// Without an explicit step count hex and octal cover every digit
/// (`4 * digits`, `3 * digits`) and decimal uses `max(bit length, 8)`.
/// An explicit count pads with rests or drops the high-order steps.
pub fn decode(radix: Radix, digits: &str, steps: Option<usize>) -> Result<Pattern, PatternError> {
    if digits.is_empty() {
        return Err(PatternError::NoDigits);
    }
    let values = digits
        .chars()
        .map(|c| radix.digit_value(c).ok_or(PatternError::InvalidDigit(c)))
        .collect::<Result<Vec<u32>, _>>()?;

    let bits = match radix.group_size() {
        Some(group) => grouped_bits(&values, group),
        None => decimal_bits(digits)?,
    };

    let len = match (steps, radix.group_size()) {
        (Some(steps), _) => clamp_steps(steps),
        (None, Some(group)) => clamp_steps(group * values.len()),
        (None, None) => clamp_steps(bits.len().max(8)),
    };
    let mut steps = bits;
    steps.resize(len, false);
    Pattern::new(steps)
}

fn grouped_bits(values: &[u32], group: usize) -> Vec<bool> {
    values
        .iter()
        .flat_map(|&value| (0..group).map(move |bit| value & (1 << bit) != 0))
        .collect()
}

/// Bits of a decimal number, least significant first, trimmed to its bit length
fn decimal_bits(digits: &str) -> Result<Vec<bool>, PatternError> {
    let value: u128 = digits
        .parse()
        .map_err(|_| PatternError::Overflow(digits.to_string()))?;
    let bit_len = (u128::BITS - value.leading_zeros()) as usize;
    if bit_len > MAX_STEPS {
        return Err(PatternError::Overflow(digits.to_string()));
    }
    Ok((0..bit_len).map(|bit| value & (1 << bit) != 0).collect())
}

impl Pattern {
    /// Hex form, e.g. `0x94` for `10010010`
    pub fn to_hex(&self) -> String {
        self.encode_grouped(Radix::Hex)
    }

    /// Octal form, e.g. `0o443` for `001001110`
    pub fn to_octal(&self) -> String {
        self.encode_grouped(Radix::Octal)
    }

    /// Decimal form, e.g. `d73` for `10010010`
    pub fn to_decimal(&self) -> String {
        let value = self
            .iter()
            .enumerate()
            .filter(|&(_, onset)| onset)
            .fold(0u128, |acc, (i, _)| acc | 1 << i);
        format!("{}{}", Radix::Decimal.prefix(), value)
    }

    /// Binary literal that parses back to this pattern
    pub fn to_notation(&self) -> String {
        self.to_string()
    }

    /// Encode in `radix`
    pub fn encode(&self, radix: Radix) -> String {
        match radix {
            Radix::Decimal => self.to_decimal(),
            grouped => self.encode_grouped(grouped),
        }
    }

    fn encode_grouped(&self, radix: Radix) -> String {
        let group = radix.group_size().unwrap_or(4);
        let digits: String = self
            .steps()
            .chunks(group)
            .map(|chunk| {
                let value = chunk
                    .iter()
                    .enumerate()
                    .filter(|&(_, &onset)| onset)
                    .fold(0u32, |acc, (bit, _)| acc | 1 << bit);
                std::char::from_digit(value, 16)
                    .unwrap_or('0')
                    .to_ascii_uppercase()
            })
            .collect();
        format!("{}{}", radix.prefix(), digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bit_order() {
        assert_eq!(decode(Radix::Hex, "1", None).unwrap().to_string(), "1000");
        assert_eq!(decode(Radix::Hex, "2", None).unwrap().to_string(), "0100");
        assert_eq!(decode(Radix::Hex, "8", None).unwrap().to_string(), "0001");
        assert_eq!(decode(Radix::Hex, "94", Some(8)).unwrap().to_string(), "10010010");
    }

    #[test]
    fn test_hex_lowercase_digits() {
        assert_eq!(
            decode(Radix::Hex, "ff", None).unwrap(),
            decode(Radix::Hex, "FF", None).unwrap()
        );
    }

    #[test]
    fn test_hex_explicit_steps_pad_and_truncate() {
        assert_eq!(decode(Radix::Hex, "1", Some(8)).unwrap().to_string(), "10000000");
        assert_eq!(decode(Radix::Hex, "F1", Some(6)).unwrap().to_string(), "111110");
    }

    #[test]
    fn test_octal_groups_of_three() {
        assert_eq!(decode(Radix::Octal, "1", None).unwrap().to_string(), "100");
        assert_eq!(decode(Radix::Octal, "4", None).unwrap().to_string(), "001");
        assert_eq!(decode(Radix::Octal, "44", Some(6)).unwrap().to_string(), "001001");
    }

    #[test]
    fn test_decimal_lsb_first() {
        assert_eq!(decode(Radix::Decimal, "73", None).unwrap().to_string(), "10010010");
        assert_eq!(decode(Radix::Decimal, "1", Some(4)).unwrap().to_string(), "1000");
        assert_eq!(decode(Radix::Decimal, "0", None).unwrap().to_string(), "00000000");
    }

    #[test]
    fn test_decimal_wide_values() {
        let p = decode(Radix::Decimal, "1267650600228229401496703205376", None).unwrap();
        // 2^100
        assert_eq!(p.len(), 101);
        assert_eq!(p.onset_positions(), vec![100]);
    }

    #[test]
    fn test_invalid_digits() {
        assert_eq!(
            decode(Radix::Octal, "18", None),
            Err(PatternError::InvalidDigit('8'))
        );
        assert_eq!(decode(Radix::Hex, "", None), Err(PatternError::NoDigits));
        assert!(matches!(
            decode(Radix::Decimal, "999999999999999999999999999999999999999999", None),
            Err(PatternError::Overflow(_))
        ));
    }

    #[test]
    fn test_encode_matches_convention() {
        let p: Pattern = "10010010".parse().unwrap();
        assert_eq!(p.to_hex(), "0x94");
        assert_eq!(p.to_octal(), "0o111");
        assert_eq!(p.to_decimal(), "d73");
        assert_eq!(p.encode(Radix::Hex), "0x94");
    }

    #[test]
    fn test_encode_uppercase() {
        let p: Pattern = "11111101".parse().unwrap();
        assert_eq!(p.to_hex(), "0xFB");
    }

    #[test]
    fn test_round_trip_on_group_multiples() {
        let p: Pattern = "101100111000".parse().unwrap();
        let hex = p.to_hex();
        assert_eq!(decode(Radix::Hex, &hex[2..], None).unwrap(), p);
        let octal = p.to_octal();
        assert_eq!(decode(Radix::Octal, &octal[2..], None).unwrap(), p);
    }
}
