use crate::rng::{sample_indices, Rng};
use std::collections::HashSet;

/// A single bank entry: the word itself plus a loose category tag. The
/// category isn't surfaced anywhere yet (no category-filtered game modes
/// are specced), but keeping it alongside the word avoids a second parallel
/// table if one is ever wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordEntry {
    pub word: &'static str,
    pub category: &'static str,
}

/// Static, category-tagged word list. `pick_unused` is the only way
/// callers should draw from it.
pub struct WordBank {
    entries: &'static [WordEntry],
}

impl WordBank {
    pub fn new() -> Self {
        Self { entries: WORDS }
    }

    /// Sample up to `k` distinct words uniformly from the bank minus
    /// `used`, preserving no particular order guarantee beyond "uniform".
    /// If fewer than `k` words remain, returns however many remain
    /// (possibly zero, if the entire bank has been exhausted).
    pub fn pick_unused(&self, k: usize, used: &HashSet<String>, rng: &mut dyn Rng) -> Vec<String> {
        let available: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.word)
            .filter(|w| !used.contains(*w))
            .collect();

        if available.is_empty() {
            return Vec::new();
        }

        let take = k.min(available.len());
        sample_indices(rng, available.len(), take)
            .into_iter()
            .map(|i| available[i].to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::new()
    }
}

const WORDS: &[WordEntry] = &[
    WordEntry { word: "apple", category: "food" },
    WordEntry { word: "banana", category: "food" },
    WordEntry { word: "pizza", category: "food" },
    WordEntry { word: "sandwich", category: "food" },
    WordEntry { word: "pancake", category: "food" },
    WordEntry { word: "cupcake", category: "food" },
    WordEntry { word: "watermelon", category: "food" },
    WordEntry { word: "strawberry", category: "food" },
    WordEntry { word: "taco", category: "food" },
    WordEntry { word: "popcorn", category: "food" },
    WordEntry { word: "dog", category: "animal" },
    WordEntry { word: "cat", category: "animal" },
    WordEntry { word: "elephant", category: "animal" },
    WordEntry { word: "giraffe", category: "animal" },
    WordEntry { word: "penguin", category: "animal" },
    WordEntry { word: "octopus", category: "animal" },
    WordEntry { word: "kangaroo", category: "animal" },
    WordEntry { word: "dolphin", category: "animal" },
    WordEntry { word: "butterfly", category: "animal" },
    WordEntry { word: "spider", category: "animal" },
    WordEntry { word: "guitar", category: "object" },
    WordEntry { word: "umbrella", category: "object" },
    WordEntry { word: "telephone", category: "object" },
    WordEntry { word: "bicycle", category: "object" },
    WordEntry { word: "camera", category: "object" },
    WordEntry { word: "backpack", category: "object" },
    WordEntry { word: "candle", category: "object" },
    WordEntry { word: "hammer", category: "object" },
    WordEntry { word: "ladder", category: "object" },
    WordEntry { word: "telescope", category: "object" },
    WordEntry { word: "mountain", category: "nature" },
    WordEntry { word: "volcano", category: "nature" },
    WordEntry { word: "rainbow", category: "nature" },
    WordEntry { word: "waterfall", category: "nature" },
    WordEntry { word: "desert", category: "nature" },
    WordEntry { word: "iceberg", category: "nature" },
    WordEntry { word: "tornado", category: "nature" },
    WordEntry { word: "lightning", category: "nature" },
    WordEntry { word: "forest", category: "nature" },
    WordEntry { word: "island", category: "nature" },
    WordEntry { word: "astronaut", category: "people" },
    WordEntry { word: "pirate", category: "people" },
    WordEntry { word: "wizard", category: "people" },
    WordEntry { word: "firefighter", category: "people" },
    WordEntry { word: "ninja", category: "people" },
    WordEntry { word: "robot", category: "people" },
    WordEntry { word: "superhero", category: "people" },
    WordEntry { word: "vampire", category: "people" },
    WordEntry { word: "mermaid", category: "people" },
    WordEntry { word: "knight", category: "people" },
    WordEntry { word: "basketball", category: "activity" },
    WordEntry { word: "swimming", category: "activity" },
    WordEntry { word: "painting", category: "activity" },
    WordEntry { word: "fishing", category: "activity" },
    WordEntry { word: "skateboarding", category: "activity" },
    WordEntry { word: "juggling", category: "activity" },
    WordEntry { word: "camping", category: "activity" },
    WordEntry { word: "surfing", category: "activity" },
    WordEntry { word: "dancing", category: "activity" },
    WordEntry { word: "skydiving", category: "activity" },
];
