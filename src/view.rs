//! The three partitions of commands and which one is on screen.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

use crate::history::{dedupe_stable, rank};

/// Which partition is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Every command, ranked by frequency then recency.
    #[default]
    Sorted,
    /// User-curated favorites.
    Favorites,
    /// Every command once, in the order first seen.
    All,
}

impl View {
    /// Sorted -> Favorites -> All -> Sorted.
    pub fn next(self) -> Self {
        match self {
            View::Sorted => View::Favorites,
            View::Favorites => View::All,
            View::All => View::Sorted,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Sorted => "sorted",
            View::Favorites => "favorites",
            View::All => "all",
        };
        f.write_str(name)
    }
}

/// The three named partitions. `Clone` copies every sequence, so a clone is
/// a snapshot that later edits to the original never reach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    sorted: Vec<String>,
    favorites: Vec<String>,
    all: Vec<String>,
}

impl Partitions {
    /// Build all partitions from raw history and stored favorites.
    pub fn build(history: &[String], favorites: &[String]) -> Self {
        Self {
            sorted: rank(history),
            favorites: rank(favorites),
            all: dedupe_stable(history),
        }
    }

    pub fn get(&self, view: View) -> &[String] {
        match view {
            View::Sorted => &self.sorted,
            View::Favorites => &self.favorites,
            View::All => &self.all,
        }
    }

    pub fn get_mut(&mut self, view: View) -> &mut Vec<String> {
        match view {
            View::Sorted => &mut self.sorted,
            View::Favorites => &mut self.favorites,
            View::All => &mut self.all,
        }
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, command: &str) -> bool {
        self.favorites.iter().any(|c| c == command)
    }

    /// Toggle `command` in the favorites partition. Returns true if it was added.
    pub fn toggle_favorite(&mut self, command: &str) -> bool {
        add_or_remove_favorite(command, &mut self.favorites)
    }

    /// Drop `command` from every partition. Returns true if favorites held it.
    pub fn remove_everywhere(&mut self, command: &str) -> bool {
        self.sorted.retain(|c| c != command);
        self.all.retain(|c| c != command);
        let before = self.favorites.len();
        self.favorites.retain(|c| c != command);
        before != self.favorites.len()
    }
}

/// Remove `command` from `favorites` if present, otherwise append it.
/// Returns true if it was added.
pub fn add_or_remove_favorite(command: &str, favorites: &mut Vec<String>) -> bool {
    match favorites.iter().position(|c| c == command) {
        Some(idx) => {
            favorites.remove(idx);
            false
        }
        None => {
            favorites.push(command.to_string());
            true
        }
    }
}
