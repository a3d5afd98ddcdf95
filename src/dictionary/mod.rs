//! Dictionary Service
//!
//! Owns the set of valid words. Answers membership queries and supplies
//! random secret words. The word list is loaded at most once; concurrent
//! first callers block on the loader instead of loading twice.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Word list compiled into the binary.
const EMBEDDED_WORDS: &str = include_str!("../../data/words.txt");

/// Word returned by [`Dictionary::generate_word`] when the list is empty.
pub const FALLBACK_WORD: &str = "blank";

/// Where a dictionary reads its newline-delimited words from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WordSource {
    /// The list shipped inside the binary.
    #[default]
    Embedded,
    /// A word file on disk.
    File(PathBuf),
    /// An in-memory list.
    Text(String),
}

impl WordSource {
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        match self {
            WordSource::Embedded => Ok(Box::new(Cursor::new(EMBEDDED_WORDS))),
            WordSource::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            WordSource::Text(text) => Ok(Box::new(Cursor::new(text.as_str()))),
        }
    }

    fn describe(&self) -> String {
        match self {
            WordSource::Embedded => "embedded word list".to_string(),
            WordSource::File(path) => path.display().to_string(),
            WordSource::Text(_) => "in-memory word list".to_string(),
        }
    }
}

/// Dictionary errors.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The word source could not be opened or read.
    #[error("failed to load dictionary from {source_name}: {error}")]
    Load {
        /// Human-readable source name.
        source_name: String,
        /// Underlying I/O failure.
        #[source]
        error: io::Error,
    },
}

/// Loaded words: ordered pool for generation plus a lookup set.
#[derive(Debug, Default)]
struct WordList {
    words: Vec<String>,
    index: HashSet<String>,
}

impl WordList {
    fn read(source: &WordSource, word_length: usize) -> Result<Self, DictionaryError> {
        let load_error = |error| DictionaryError::Load {
            source_name: source.describe(),
            error,
        };

        let reader = source.open().map_err(load_error)?;
        let mut list = WordList::default();

        for line in reader.lines() {
            let line = line.map_err(load_error)?;
            let word = line.trim().to_lowercase();
            if word.chars().count() != word_length {
                continue;
            }
            list.index.insert(word.clone());
            list.words.push(word);
        }

        Ok(list)
    }
}

/// Thread-safe dictionary of fixed-length words.
#[derive(Debug)]
pub struct Dictionary {
    word_length: usize,
    default_source: WordSource,
    /// Filled by the first successful load; never replaced.
    words: OnceCell<WordList>,
    #[cfg(test)]
    loads: std::sync::atomic::AtomicUsize,
}

impl Dictionary {
    /// Create an unloaded dictionary that lazily reads `default_source`.
    pub fn new(word_length: usize, default_source: WordSource) -> Self {
        Self {
            word_length,
            default_source,
            words: OnceCell::new(),
            #[cfg(test)]
            loads: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Load words from `source_override`, or from the default source when `None`.
    ///
    /// A no-op once the dictionary is loaded. Concurrent first callers block
    /// while one of them loads. On failure the dictionary stays unloaded and
    /// a later call may retry with a different source.
    pub fn initialize(&self, source_override: Option<&WordSource>) -> Result<(), DictionaryError> {
        self.load(source_override).map(|_| ())
    }

    fn load(&self, source_override: Option<&WordSource>) -> Result<&WordList, DictionaryError> {
        self.words.get_or_try_init(|| {
            #[cfg(test)]
            self.loads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

            let source = source_override.unwrap_or(&self.default_source);
            WordList::read(source, self.word_length).map(|loaded| {
                info!(
                    "Loaded {} words of length {} from {}",
                    loaded.words.len(),
                    self.word_length,
                    source.describe()
                );
                loaded
            })
        })
    }

    /// Case-insensitive membership test.
    ///
    /// Loads the default source on first use. An unloadable dictionary
    /// answers `false`.
    pub fn is_word_valid(&self, word: &str) -> bool {
        match self.load(None) {
            Ok(list) => list.index.contains(&word.to_lowercase()),
            Err(e) => {
                warn!("Dictionary unavailable: {}", e);
                false
            }
        }
    }

    /// Pick a uniformly random word, or [`FALLBACK_WORD`] if the list is empty.
    pub fn generate_word(&self) -> Result<String, DictionaryError> {
        let list = self.load(None)?;
        let word = list
            .words
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_WORD.to_string());
        debug!("Generated secret word");
        Ok(word)
    }

    /// Has a load succeeded.
    pub fn is_initialized(&self) -> bool {
        self.words.get().is_some()
    }

    /// Number of words in the generation pool. Zero until loaded.
    pub fn len(&self) -> usize {
        self.words.get().map_or(0, |list| list.words.len())
    }

    /// True when no words are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured word length.
    pub fn word_length(&self) -> usize {
        self.word_length
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new(crate::WORD_LENGTH, WordSource::Embedded)
    }
}
