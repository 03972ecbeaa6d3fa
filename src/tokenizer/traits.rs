//! Encoder trait and padding helpers.

use ndarray::Array2;

use crate::{Error, Result};

/// Token ID type
pub type TokenId = u32;

/// Encodes a word into a variable-length token sequence.
pub trait WordEncoder: Send + Sync {
    /// Encode a word to token IDs
    fn encode(&self, word: &str) -> Vec<TokenId>;

    /// Number of distinct token IDs this encoder emits (IDs are `0..vocab_size`)
    fn vocab_size(&self) -> usize;
}

/// Pad or truncate to exactly `len` tokens.
///
/// Follows Keras `pad_sequences` defaults: zeros are prepended, and long
/// sequences keep their trailing `len` tokens.
pub fn pad_sequence(ids: &[TokenId], len: usize) -> Vec<TokenId> {
    if ids.len() >= len {
        return ids[ids.len() - len..].to_vec();
    }
    let mut out = vec![0; len - ids.len()];
    out.extend_from_slice(ids);
    out
}

/// Encode and pad a batch of words into a feature matrix.
///
/// Fails if a word is longer than `len`: silently truncating it would
/// change its class.
pub fn encode_words<E, S>(encoder: &E, words: &[S], len: usize) -> Result<Array2<f32>>
where
    E: WordEncoder + ?Sized,
    S: AsRef<str>,
{
    let mut features = Array2::zeros((words.len(), len));
    for (i, word) in words.iter().enumerate() {
        let ids = encoder.encode(word.as_ref());
        if ids.len() > len {
            return Err(Error::Tokenizer(format!(
                "word '{}' encodes to {} tokens, longer than the input length {len}",
                word.as_ref(),
                ids.len()
            )));
        }
        for (j, id) in pad_sequence(&ids, len).into_iter().enumerate() {
            features[[i, j]] = id as f32;
        }
    }
    Ok(features)
}
