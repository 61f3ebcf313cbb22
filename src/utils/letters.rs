use once_cell::sync::Lazy;
use rand::Rng;

/// Default filler alphabet for generated grids
pub static ALPHABET: Lazy<Vec<char>> = Lazy::new(|| ('A'..='Z').collect());

/// Parse a letter set such as "ABCDEFG" into an uppercase, de-duplicated list.
/// Whitespace is ignored.
pub fn parse_alphabet(raw: &str) -> Vec<char> {
    let mut letters: Vec<char> = Vec::new();
    for ch in raw.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_uppercase) {
        if !letters.contains(&ch) {
            letters.push(ch);
        }
    }
    letters
}

/// Canonical form of a word: trimmed and uppercased.
/// Returns None for blank input or anything other than letters.
pub fn normalize_word(raw: &str) -> Option<String> {
    let word = raw.trim().to_uppercase();
    if word.is_empty() || !word.chars().all(char::is_alphabetic) {
        None
    } else {
        Some(word)
    }
}

/// Uppercase letters of `raw` with spaces, hyphens and other symbols removed.
/// Returns None when no letters are left.
pub fn strip_to_letters(raw: &str) -> Option<String> {
    let word: String = raw
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect();
    normalize_word(&word)
}

/// Pick a letter uniformly from `alphabet`, using A-Z when it is empty
pub fn random_letter<R: Rng + ?Sized>(alphabet: &[char], rng: &mut R) -> char {
    let letters = if alphabet.is_empty() {
        ALPHABET.as_slice()
    } else {
        alphabet
    };
    letters[rng.random_range(0..letters.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_alphabet_is_a_to_z() {
        assert_eq!(ALPHABET.len(), 26);
        assert_eq!(ALPHABET.first(), Some(&'A'));
        assert_eq!(ALPHABET.last(), Some(&'Z'));
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  melon "), Some("MELON".to_string()));
        assert_eq!(normalize_word("Trout"), Some("TROUT".to_string()));
        assert_eq!(normalize_word("   "), None);
        assert_eq!(normalize_word(""), None);
        assert_eq!(normalize_word("hot-dog"), None);
        assert_eq!(normalize_word("ice cream"), None);
    }

    #[test]
    fn test_strip_to_letters() {
        assert_eq!(strip_to_letters(" ice cream "), Some("ICECREAM".to_string()));
        assert_eq!(strip_to_letters("hot-dog"), Some("HOTDOG".to_string()));
        assert_eq!(strip_to_letters("R2D2"), Some("RD".to_string()));
        assert_eq!(strip_to_letters("42 - !"), None);
    }

    #[test]
    fn test_parse_alphabet_dedupes_and_uppercases() {
        assert_eq!(parse_alphabet("abcA b"), vec!['A', 'B', 'C']);
        assert!(parse_alphabet("  ").is_empty());
    }

    #[test]
    fn test_random_letter_stays_in_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let letters = ['X', 'Y'];
        for _ in 0..100 {
            assert!(letters.contains(&random_letter(&letters, &mut rng)));
        }
    }

    #[test]
    fn test_random_letter_empty_alphabet_falls_back() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(random_letter(&[], &mut rng).is_ascii_uppercase());
        }
    }
}
