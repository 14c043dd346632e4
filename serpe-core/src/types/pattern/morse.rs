//! Morse rhythms: `.` is a single onset, `-` an onset followed by a rest.

use super::core::{Pattern, PatternError};

fn letter_code(letter: char) -> Option<&'static str> {
    let code = match letter {
        'a' => ".-",
        'b' => "-...",
        'c' => "-.-.",
        'd' => "-..",
        'e' => ".",
        'f' => "..-.",
        'g' => "--.",
        'h' => "....",
        'i' => "..",
        'j' => ".---",
        'k' => "-.-",
        'l' => ".-..",
        'm' => "--",
        'n' => "-.",
        'o' => "---",
        'p' => ".--.",
        'q' => "--.-",
        'r' => ".-.",
        's' => "...",
        't' => "-",
        'u' => "..-",
        'v' => "...-",
        'w' => ".--",
        'x' => "-..-",
        'y' => "-.--",
        'z' => "--..",
        _ => return None,
    };
    Some(code)
}

/// Dots and dashes for `text`. Letters are spelled out with no gap between
/// them; `.` and `-` pass through, anything else is dropped.
pub fn morse_code(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .filter_map(|c| match c {
            '.' => Some("."),
            '-' => Some("-"),
            other => letter_code(other),
        })
        .collect()
}

/// `M:SOS` style pattern
pub fn morse(text: &str) -> Result<Pattern, PatternError> {
    let mut steps = Vec::new();
    for symbol in morse_code(text).chars() {
        match symbol {
            '.' => steps.push(true),
            _ => steps.extend([true, false]),
        }
    }
    if steps.is_empty() {
        return Err(PatternError::NoDigits);
    }
    Pattern::new(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sos() {
        assert_eq!(morse_code("SOS"), "...---...");
        assert_eq!(morse("sos").unwrap().to_string(), "111101010111");
    }

    #[test]
    fn test_letters_join_without_gap() {
        // a = .-  l = .-..
        assert_eq!(morse("AL").unwrap().to_string(), "11011011");
    }

    #[test]
    fn test_raw_dots_and_dashes() {
        assert_eq!(morse("-.").unwrap().to_string(), "101");
    }

    #[test]
    fn test_nothing_to_play() {
        assert_eq!(morse("123"), Err(PatternError::NoDigits));
    }
}
