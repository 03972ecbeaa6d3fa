//! Character-level word encoding
//!
//! Words are encoded one character at a time into a small vowel-class
//! alphabet and padded to a shared fixed length, so every example has the
//! same input shape.
//!
//! # Example
//!
//! ```
//! use ensenar::tokenizer::{pad_sequence, VowelClassEncoder, WordEncoder};
//!
//! let encoder = VowelClassEncoder::new();
//! let ids = encoder.encode("baúl");
//! assert_eq!(ids, vec![0, 1, 4, 0]);
//! assert_eq!(pad_sequence(&ids, 6), vec![0, 0, 0, 1, 4, 0]);
//! ```

mod traits;
mod vowel;

pub use traits::{encode_words, pad_sequence, TokenId, WordEncoder};
pub use vowel::VowelClassEncoder;
