//! Delimited corpus loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::example::{DifficultyTier, Example};
use super::label::WordClass;
use crate::{Error, Result};

/// One delimited source file and the columns to read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSource {
    pub path: PathBuf,
    #[serde(default)]
    pub word_column: usize,
    #[serde(default = "default_difficulty_column")]
    pub difficulty_column: usize,
    pub label_column: usize,
}

fn default_difficulty_column() -> usize {
    1
}

impl CorpusSource {
    pub fn new(path: impl Into<PathBuf>, label_column: usize) -> Self {
        Self {
            path: path.into(),
            word_column: 0,
            difficulty_column: default_difficulty_column(),
            label_column,
        }
    }
}

/// Reads `;`-separated files with a header row.
///
/// Files may be UTF-8 or Latin-1; anything that is not valid UTF-8 is
/// decoded byte-per-character as Latin-1.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    separator: char,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self { separator: ';' }
    }
}

impl CorpusLoader {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Load every source and return all examples stably sorted by difficulty.
    pub fn load_all(&self, sources: &[CorpusSource]) -> Result<Vec<Example>> {
        let mut examples = Vec::new();
        for source in sources {
            examples.extend(self.load(source)?);
        }
        examples.sort_by_key(|e| e.difficulty);
        info!(examples = examples.len(), sources = sources.len(), "corpus loaded");
        Ok(examples)
    }

    /// Load a single source in file order.
    pub fn load(&self, source: &CorpusSource) -> Result<Vec<Example>> {
        let bytes = fs::read(&source.path)
            .map_err(|e| Error::storage(format!("reading {}", source.path.display()), e))?;
        let text = decode_text(bytes);
        let examples = self.parse(&text, source)?;
        debug!(path = %source.path.display(), rows = examples.len(), "corpus source parsed");
        Ok(examples)
    }

    /// Parse already-decoded text. The first line is the header.
    pub fn parse(&self, text: &str, source: &CorpusSource) -> Result<Vec<Example>> {
        let needed = source
            .word_column
            .max(source.difficulty_column)
            .max(source.label_column);
        let mut examples = Vec::new();
        for (idx, line) in text.lines().enumerate().skip(1) {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split(self.separator).map(str::trim).collect();
            if cells.len() <= needed {
                return Err(corpus_error(
                    &source.path,
                    line_no,
                    format!("expected at least {} columns, found {}", needed + 1, cells.len()),
                ));
            }
            let word = cells[source.word_column];
            if word.is_empty() {
                return Err(corpus_error(&source.path, line_no, "empty word"));
            }
            let difficulty = cells[source.difficulty_column]
                .parse::<usize>()
                .map_err(|e| corpus_error(&source.path, line_no, format!("difficulty: {e}")))
                .and_then(|d| {
                    DifficultyTier::from_index(d)
                        .map_err(|e| corpus_error(&source.path, line_no, e.to_string()))
                })?;
            let label = WordClass::from_cell(cells[source.label_column])
                .map_err(|e| corpus_error(&source.path, line_no, e.to_string()))?;
            examples.push(Example::new(word, difficulty, label));
        }
        Ok(examples)
    }
}

fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

fn corpus_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::Corpus {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_rows() {
        let text = "PALABRA;DIFICULTAD;SILABAS;TIPO\nhueso;0;hue-so;0\nfrío;1;frí-o;1\n";
        let source = CorpusSource::new("mem.csv", 3);
        let examples = CorpusLoader::default().parse(text, &source).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].word, "hueso");
        assert_eq!(examples[0].label, WordClass::Diphthong);
        assert_eq!(examples[1].difficulty, DifficultyTier::Medium);
        assert_eq!(examples[1].label, WordClass::Hiatus);
    }

    #[test]
    fn test_parse_accepts_tags_and_skips_blank_lines() {
        let text = "w;d;l\n\nlata;2;g\n";
        let source = CorpusSource::new("mem.csv", 2);
        let examples = CorpusLoader::default().parse(text, &source).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].label, WordClass::Neither);
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let text = "w;d;l\nlata;2;g\nvaso;7;g\n";
        let source = CorpusSource::new("mem.csv", 2);
        let err = CorpusLoader::default().parse(text, &source).unwrap_err();
        match err {
            Error::Corpus { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_short_rows() {
        let text = "w;d;l\nlata;2\n";
        let source = CorpusSource::new("mem.csv", 2);
        assert!(CorpusLoader::default().parse(text, &source).is_err());
    }

    #[test]
    fn test_load_latin1_file() {
        let mut file = NamedTempFile::new().unwrap();
        // "mío" in Latin-1: 'í' is 0xED
        file.write_all(b"w;d;l\nm\xedo;0;1\n").unwrap();
        let source = CorpusSource::new(file.path(), 2);
        let examples = CorpusLoader::default().load(&source).unwrap();
        assert_eq!(examples[0].word, "mío");
    }

    #[test]
    fn test_load_all_sorts_by_difficulty() {
        let mut a = NamedTempFile::new().unwrap();
        a.write_all(b"w;d;l\ncaer;2;1\nhueso;0;0\n").unwrap();
        let mut b = NamedTempFile::new().unwrap();
        b.write_all(b"w;d;l\nlata;1;2\n").unwrap();
        let sources = vec![CorpusSource::new(a.path(), 2), CorpusSource::new(b.path(), 2)];
        let examples = CorpusLoader::default().load_all(&sources).unwrap();
        let words: Vec<&str> = examples.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["hueso", "lata", "caer"]);
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let source = CorpusSource::new("/nonexistent/corpus.csv", 2);
        let err = CorpusLoader::default().load(&source).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }
}
