use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui_interact::components::InputState;
use ratatui_themes::{ThemeName, ThemePalette};

use crate::error::StoreError;
use crate::pager::{Direction, Pager};
use crate::search::{apply, compile_filter, match_spans, Filter};
use crate::store::{FavoritesFile, HistoryStore};
use crate::view::{Partitions, View};

/// Message shown in place of the help label when the regex does not compile.
pub const INVALID_REGEX_MESSAGE: &str = "Invalid regex. Try again.";

/// Actions that the event loop should take after handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Put the command on the shell's input line.
    Insert(String),
    /// Put the command on the shell's input line and press enter.
    Run(String),
}

/// Everything the status bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStatus {
    pub view: View,
    pub regex_mode: bool,
    pub case_sensitive: bool,
    pub page: usize,
    pub total_pages: usize,
}

/// Main application state.
///
/// `partitions` is what is on screen: the active partition may be narrowed
/// by the current search. `to_restore` is the unfiltered copy, refreshed on
/// load and after every edit, from which each new search starts.
pub struct App {
    store: Box<dyn HistoryStore>,
    favorites_file: FavoritesFile,

    partitions: Partitions,
    to_restore: Partitions,

    /// Which partition is on screen.
    pub view: View,

    /// The search string being typed.
    pub search_input: InputState,

    pub regex_mode: bool,
    pub case_sensitive: bool,

    /// Filter compiled from the current search, if any (used for highlighting).
    filter: Option<Filter>,

    /// Set when the last search failed to compile.
    pub filter_error: Option<String>,

    pager: Pager,

    /// Command awaiting a y/n answer before being deleted.
    pub pending_delete: Option<String>,

    /// Current color theme.
    pub theme_name: ThemeName,
}

impl App {
    /// Load history and favorites and start on page 1 of the sorted view.
    pub fn new(
        mut store: Box<dyn HistoryStore>,
        favorites_file: FavoritesFile,
        capacity: usize,
    ) -> Result<Self, StoreError> {
        let history = store.load()?;
        let favorites = favorites_file.load()?;
        tracing::info!(
            history = history.len(),
            favorites = favorites.len(),
            store = %store.path().display(),
            "loaded history"
        );
        let partitions = Partitions::build(&history, &favorites);

        Ok(Self {
            store,
            favorites_file,
            to_restore: partitions.clone(),
            partitions,
            view: View::default(),
            search_input: InputState::empty(),
            regex_mode: false,
            case_sensitive: false,
            filter: None,
            filter_error: None,
            pager: Pager::new(capacity),
            pending_delete: None,
            theme_name: ThemeName::default(),
        })
    }

    /// Start in a given view and match mode.
    pub fn with_modes(mut self, view: View, regex_mode: bool, case_sensitive: bool) -> Self {
        self.view = view;
        self.regex_mode = regex_mode;
        self.case_sensitive = case_sensitive;
        self.search();
        self
    }

    /// Get the current theme palette.
    pub fn palette(&self) -> ThemePalette {
        self.theme_name.palette()
    }

    /// Cycle to the next theme.
    pub fn next_theme(&mut self) {
        self.theme_name = self.theme_name.next();
    }

    /// Cycle to the previous theme.
    pub fn prev_theme(&mut self) {
        self.theme_name = self.theme_name.prev();
    }

    /// Get the search text.
    pub fn search_text(&self) -> &str {
        self.search_input.text()
    }

    /// The active partition as currently filtered.
    pub fn active(&self) -> &[String] {
        self.partitions.get(self.view)
    }

    pub fn current_page_commands(&self) -> &[String] {
        self.pager.commands(self.active())
    }

    pub fn current_page_status(&self) -> PageStatus {
        PageStatus {
            view: self.view,
            regex_mode: self.regex_mode,
            case_sensitive: self.case_sensitive,
            page: self.pager.page(),
            total_pages: self.pager.total_pages(self.active().len()),
        }
    }

    /// Index of the highlighted row within the current page.
    pub fn selected_index(&self) -> usize {
        self.pager.selected()
    }

    pub fn selected_command(&self) -> Option<&str> {
        self.pager.selected_command(self.active())
    }

    /// Character ranges of `command` matched by the current search.
    pub fn matched_spans_for(&self, command: &str) -> Vec<(usize, usize)> {
        match_spans(self.filter.as_ref(), command)
    }

    pub fn is_favorite(&self, command: &str) -> bool {
        self.to_restore.is_favorite(command)
    }

    /// Recompute the page capacity after a terminal resize.
    pub fn resize(&mut self, capacity: usize) {
        let partition = self.partitions.get(self.view);
        self.pager.set_capacity(capacity, partition);
        tracing::debug!(capacity = self.pager.capacity(), "resized");
    }

    /// Restore every partition from the snapshot and narrow the active one
    /// by the current search. Always returns to the top of page 1.
    pub fn search(&mut self) {
        self.partitions = self.to_restore.clone();
        self.pager.reset();
        self.filter = None;
        self.filter_error = None;

        let query = self.search_input.text();
        if query.is_empty() {
            return;
        }

        match compile_filter(query, self.regex_mode, self.case_sensitive) {
            Ok(filter) => {
                let active = self.partitions.get_mut(self.view);
                *active = apply(active.as_slice(), &filter);
                self.filter = Some(filter);
            }
            Err(e) => {
                tracing::debug!(error = %e, "search did not compile");
                // Never leave unfiltered results on screen as if they matched.
                self.partitions.get_mut(self.view).clear();
                self.filter_error = Some(INVALID_REGEX_MESSAGE.to_string());
            }
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.next();
        tracing::debug!(view = %self.view, "toggled view");
        self.search();
    }

    pub fn toggle_regex_mode(&mut self) {
        self.regex_mode = !self.regex_mode;
        self.search();
    }

    pub fn toggle_case(&mut self) {
        self.case_sensitive = !self.case_sensitive;
        self.search();
    }

    pub fn move_selected(&mut self, direction: Direction) {
        let partition = self.partitions.get(self.view);
        self.pager.move_selected(direction, partition);
    }

    pub fn turn_page(&mut self, direction: Direction) {
        let partition = self.partitions.get(self.view);
        self.pager.turn(direction, partition);
    }

    /// Add the selected command to favorites, or remove it if already there.
    /// Page and selection stay put unless the page shrank under them.
    pub fn toggle_favorite_selected(&mut self) {
        let Some(command) = self.selected_command().map(str::to_string) else {
            return;
        };

        let added = self.to_restore.toggle_favorite(&command);
        // The on-screen favorites are a subset of the snapshot's, so the same
        // edit keeps them in step without re-running the search.
        let shown = self.partitions.get_mut(View::Favorites);
        if added {
            if !shown.contains(&command) {
                shown.push(command.clone());
            }
        } else {
            shown.retain(|c| c != &command);
        }
        tracing::debug!(command, added, "toggled favorite");

        self.persist_favorites();
        let partition = self.partitions.get(self.view);
        self.pager.clamp(partition);
    }

    /// Ask for confirmation before deleting the selected command.
    pub fn request_delete(&mut self) {
        self.pending_delete = self.selected_command().map(str::to_string);
    }

    /// Answer the pending delete prompt.
    pub fn confirm_delete(&mut self, confirmed: bool) {
        let Some(command) = self.pending_delete.take() else {
            return;
        };
        if !confirmed {
            return;
        }

        // Only touch memory once the store has really dropped the command.
        if let Err(e) = self.store.delete_everywhere(&command) {
            tracing::warn!(command, error = %e, "failed to delete from history");
            return;
        }

        self.partitions.remove_everywhere(&command);
        if self.to_restore.remove_everywhere(&command) {
            self.persist_favorites();
        }
        let partition = self.partitions.get(self.view);
        self.pager.clamp(partition);
    }

    fn persist_favorites(&self) {
        if let Err(e) = self.favorites_file.persist(self.to_restore.favorites()) {
            tracing::warn!(
                path = %self.favorites_file.path().display(),
                error = %e,
                "failed to save favorites"
            );
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        // A pending delete swallows the next key as its answer.
        if self.pending_delete.is_some() {
            self.confirm_delete(matches!(key.code, KeyCode::Char('y')));
            return Action::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Char('e') if ctrl => {
                self.toggle_regex_mode();
                Action::None
            }
            KeyCode::Char('t') if ctrl => {
                self.toggle_case();
                Action::None
            }
            KeyCode::Char('f') if ctrl => {
                self.toggle_favorite_selected();
                Action::None
            }
            // Terminals send Ctrl-/ as 0x1f, which decodes as Ctrl-7.
            KeyCode::Char('/') | KeyCode::Char('7') if ctrl => {
                self.toggle_view();
                Action::None
            }
            KeyCode::Char(_) if ctrl => Action::None,
            KeyCode::Char(c) => {
                self.search_input.insert_char(c);
                self.search();
                Action::None
            }
            KeyCode::Backspace => {
                self.search_input.delete_char_backward();
                self.search();
                Action::None
            }
            KeyCode::Up => {
                self.move_selected(Direction::Previous);
                Action::None
            }
            KeyCode::Down => {
                self.move_selected(Direction::Next);
                Action::None
            }
            KeyCode::PageUp => {
                self.turn_page(Direction::Previous);
                Action::None
            }
            KeyCode::PageDown => {
                self.turn_page(Direction::Next);
                Action::None
            }
            KeyCode::Delete => {
                self.request_delete();
                Action::None
            }
            KeyCode::Tab => self
                .selected_command()
                .map(|c| Action::Insert(c.to_string()))
                .unwrap_or(Action::None),
            KeyCode::Enter => self
                .selected_command()
                .map(|c| Action::Run(c.to_string()))
                .unwrap_or(Action::None),
            KeyCode::Esc => Action::Quit,
            KeyCode::F(2) => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_theme();
                } else {
                    self.next_theme();
                }
                Action::None
            }
            _ => Action::None,
        }
    }
}

/// In-memory store and app construction shared by the app and ui tests.
#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use super::*;

    /// History kept in a shared vector so tests can inspect deletions.
    pub struct MemoryStore {
        pub history: Rc<RefCell<Vec<String>>>,
        pub refuse_deletes: bool,
        path: PathBuf,
    }

    impl MemoryStore {
        pub fn new(history: &[&str]) -> Self {
            Self {
                history: Rc::new(RefCell::new(
                    history.iter().map(|s| s.to_string()).collect(),
                )),
                refuse_deletes: false,
                path: PathBuf::from("memory"),
            }
        }
    }

    impl HistoryStore for MemoryStore {
        fn load(&mut self) -> Result<Vec<String>, StoreError> {
            Ok(self.history.borrow().clone())
        }

        fn delete_everywhere(&mut self, command: &str) -> Result<(), StoreError> {
            if self.refuse_deletes {
                return Err(StoreError::DeletionRefused {
                    path: self.path.clone(),
                    command: command.to_string(),
                });
            }
            self.history.borrow_mut().retain(|c| c != command);
            Ok(())
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    /// An app over `history`, with favorites kept in a temp dir.
    pub fn app_with(store: MemoryStore, favorites: &[&str], capacity: usize) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let favorites_file = FavoritesFile::new(dir.path().join("favorites"));
        let favorites: Vec<String> = favorites.iter().map(|s| s.to_string()).collect();
        favorites_file.persist(&favorites).unwrap();
        let app = App::new(Box::new(store), favorites_file, capacity).unwrap();
        (app, dir)
    }

    pub fn numbered_history(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("cmd {i:02}")).collect()
    }
}
