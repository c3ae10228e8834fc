//! Synthetic chunking of a whole reply

/// Split `text` into word fragments that rejoin to exactly `text`
///
/// The first fragment is the first word, including any whitespace that leads
/// the text. Every later fragment is the whitespace run that preceded its word
/// followed by the word, so normally spaced text yields `" word"`. Trailing
/// whitespace stays on the last fragment. Blank text yields no fragments.
pub fn synthetic_chunks(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut prev_whitespace = true;

    for c in text.chars() {
        let whitespace = c.is_whitespace();
        // a word just ended; its trailing whitespace belongs to the next word
        if whitespace && !prev_whitespace {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev_whitespace = whitespace;
    }

    if !current.is_empty() {
        match chunks.last_mut() {
            Some(last) if current.trim().is_empty() => last.push_str(&current),
            _ => chunks.push(current),
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_spaced_text() {
        assert_eq!(
            synthetic_chunks("Hello there, friend"),
            vec!["Hello", " there,", " friend"]
        );
    }

    #[test]
    fn test_rejoin_is_lossless() {
        for text in [
            "one",
            "two  spaces",
            "  leading and trailing  ",
            "line\nbreak\n\nparagraph",
            "tabs\tand unicode ümlaut",
        ] {
            assert_eq!(synthetic_chunks(text).concat(), text);
        }
    }

    #[test]
    fn test_leading_whitespace_stays_on_first_word() {
        assert_eq!(synthetic_chunks("  Hi you"), vec!["  Hi", " you"]);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        assert!(synthetic_chunks("").is_empty());
        assert!(synthetic_chunks("   ").is_empty());
    }
}
