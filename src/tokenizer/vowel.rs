//! Vowel-class encoder.

use serde::{Deserialize, Serialize};

use super::traits::{TokenId, WordEncoder};

/// Maps each character to its vowel class.
///
/// | token | characters |
/// |---|---|
/// | 0 | consonants, `ü`, anything else |
/// | 1 | open vowels `a e o` |
/// | 2 | closed vowels `i u` |
/// | 3 | accented open vowels `á é ó` |
/// | 4 | accented closed vowels `í ú` |
///
/// Input is lower-cased and ASCII punctuation is dropped before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VowelClassEncoder;

impl VowelClassEncoder {
    pub fn new() -> Self {
        Self
    }

    fn class_of(c: char) -> TokenId {
        match c {
            'a' | 'e' | 'o' => 1,
            'i' | 'u' => 2,
            'á' | 'é' | 'ó' => 3,
            'í' | 'ú' => 4,
            _ => 0,
        }
    }
}

impl WordEncoder for VowelClassEncoder {
    fn encode(&self, word: &str) -> Vec<TokenId> {
        word.trim()
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| !c.is_ascii_punctuation())
            .map(Self::class_of)
            .collect()
    }

    fn vocab_size(&self) -> usize {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vowel_classes() {
        let enc = VowelClassEncoder::new();
        assert_eq!(enc.encode("aeiou"), vec![1, 1, 2, 1, 2]);
        assert_eq!(enc.encode("áéíóú"), vec![3, 3, 4, 3, 4]);
    }

    #[test]
    fn test_consonants_and_diaeresis_are_zero() {
        let enc = VowelClassEncoder::new();
        assert_eq!(enc.encode("pingüino"), vec![0, 2, 0, 0, 0, 2, 0, 1]);
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let enc = VowelClassEncoder::new();
        assert_eq!(enc.encode("Pedro!"), enc.encode("pedro"));
        assert_eq!(enc.encode("MÍO"), vec![0, 4, 1]);
    }

    #[test]
    fn test_diphthong_vs_hiatus_encodings_differ() {
        let enc = VowelClassEncoder::new();
        // "hueso" (diphthong) vs "frío" (hiatus)
        assert_eq!(enc.encode("hueso"), vec![0, 2, 1, 0, 1]);
        assert_eq!(enc.encode("frío"), vec![0, 0, 4, 1]);
    }

    #[test]
    fn test_vocab_size_covers_all_ids() {
        let enc = VowelClassEncoder::new();
        let max = enc.encode("aíúób").into_iter().max().unwrap();
        assert!((max as usize) < enc.vocab_size());
    }
}
