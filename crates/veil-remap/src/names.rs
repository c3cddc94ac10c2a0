//! Pluggable identifier sequences.

use std::collections::HashMap;

/// Source of candidate identifiers.
///
/// The planner resets the generator before naming each family and keeps
/// drawing until a candidate is free in every namespace the family touches,
/// so a generator only has to produce a deterministic sequence. Returning
/// `None` means the sequence is exhausted.
pub trait NameGenerator: Send {
    fn next_name(&mut self) -> Option<String>;

    /// Candidate for a member with `descriptor` when overloads may share a
    /// name. Generators that keep a cursor per descriptor let differently
    /// typed members start over from the first name.
    fn next_name_for(&mut self, descriptor: &str) -> Option<String> {
        let _ = descriptor;
        self.next_name()
    }

    fn reset(&mut self);
}

impl<G: NameGenerator + ?Sized> NameGenerator for Box<G> {
    fn next_name(&mut self) -> Option<String> {
        (**self).next_name()
    }

    fn next_name_for(&mut self, descriptor: &str) -> Option<String> {
        (**self).next_name_for(descriptor)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// `a`, `b`, ..., `z`, `aa`, `ab`, ... over a configurable alphabet.
#[derive(Debug, Clone)]
pub struct AlphabetGenerator {
    alphabet: Vec<char>,
    cursor: usize,
    per_descriptor: HashMap<String, usize>,
}

impl AlphabetGenerator {
    pub fn new() -> Self {
        Self::with_alphabet("abcdefghijklmnopqrstuvwxyz")
    }

    /// Duplicate characters are dropped; an empty alphabet yields nothing.
    pub fn with_alphabet(alphabet: &str) -> Self {
        let mut chars: Vec<char> = Vec::new();
        for c in alphabet.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        Self {
            alphabet: chars,
            cursor: 0,
            per_descriptor: HashMap::new(),
        }
    }

    /// Bijective base-k encoding of `index`.
    fn name_at(&self, mut index: usize) -> Option<String> {
        let base = self.alphabet.len();
        if base == 0 {
            return None;
        }
        let mut out = Vec::new();
        loop {
            out.push(self.alphabet[index % base]);
            if index < base {
                break;
            }
            index = index / base - 1;
        }
        Some(out.into_iter().rev().collect())
    }
}

impl Default for AlphabetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator for AlphabetGenerator {
    fn next_name(&mut self) -> Option<String> {
        let name = self.name_at(self.cursor)?;
        self.cursor += 1;
        Some(name)
    }

    fn next_name_for(&mut self, descriptor: &str) -> Option<String> {
        let cursor = self
            .per_descriptor
            .entry(descriptor.to_string())
            .or_insert(0);
        let index = *cursor;
        *cursor += 1;
        self.name_at(index)
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.per_descriptor.clear();
    }
}

/// A finite word list, consumed in order.
#[derive(Debug, Clone)]
pub struct DictionaryGenerator {
    words: Vec<String>,
    cursor: usize,
    per_descriptor: HashMap<String, usize>,
}

impl DictionaryGenerator {
    /// Blank entries and duplicates are dropped, order is otherwise kept.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for word in words {
            let word: String = word.into();
            let word = word.trim();
            if !word.is_empty() && !unique.iter().any(|w| w == word) {
                unique.push(word.to_string());
            }
        }
        Self {
            words: unique,
            cursor: 0,
            per_descriptor: HashMap::new(),
        }
    }

    /// One word per line.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl NameGenerator for DictionaryGenerator {
    fn next_name(&mut self) -> Option<String> {
        let word = self.words.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(word)
    }

    fn next_name_for(&mut self, descriptor: &str) -> Option<String> {
        let cursor = self
            .per_descriptor
            .entry(descriptor.to_string())
            .or_insert(0);
        let word = self.words.get(*cursor)?.clone();
        *cursor += 1;
        Some(word)
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.per_descriptor.clear();
    }
}
