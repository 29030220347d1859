//! Backing stores for history and favorites.
//!
//! Each shell kind gets one [`HistoryStore`] implementation, picked once at
//! startup. A missing store is created empty instead of being reported.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::shell::ShellKind;

/// Source of raw history and the place deletions go.
pub trait HistoryStore {
    /// Every history entry, oldest first, duplicates included.
    fn load(&mut self) -> Result<Vec<String>, StoreError>;

    /// Remove every occurrence of `command` from the backing store.
    fn delete_everywhere(&mut self, command: &str) -> Result<(), StoreError>;

    fn path(&self) -> &Path;
}

/// Open the history store for `kind` at `path`.
pub fn open_history(kind: ShellKind, path: PathBuf) -> Box<dyn HistoryStore> {
    match kind {
        ShellKind::Python | ShellKind::Bpython => Box::new(LineFileStore::new(path, LineFormat::Plain)),
        ShellKind::Bash => Box::new(LineFileStore::new(path, LineFormat::Bash)),
        ShellKind::Zsh => Box::new(LineFileStore::new(path, LineFormat::Zsh)),
        ShellKind::Ipython => Box::new(SqliteStore::new(path)),
    }
}

/// How entries are laid out in a line-oriented history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// One command per line.
    Plain,
    /// bash with `HISTTIMEFORMAT`: a `#<epoch>` line may precede a command.
    Bash,
    /// zsh `EXTENDED_HISTORY`: `: <epoch>:<duration>;<command>`.
    Zsh,
}

enum Line<'a> {
    Blank,
    Timestamp,
    Command(&'a str),
}

impl LineFormat {
    fn classify(self, line: &str) -> Line<'_> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Line::Blank;
        }
        match self {
            LineFormat::Plain => Line::Command(trimmed),
            LineFormat::Bash => {
                let is_stamp = trimmed
                    .strip_prefix('#')
                    .is_some_and(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
                if is_stamp {
                    Line::Timestamp
                } else {
                    Line::Command(trimmed)
                }
            }
            LineFormat::Zsh => match zsh_extended_command(trimmed) {
                Some(cmd) if cmd.trim().is_empty() => Line::Blank,
                Some(cmd) => Line::Command(cmd.trim()),
                None => Line::Command(trimmed),
            },
        }
    }
}

/// The command part of a zsh extended-history line, if it has the prefix.
fn zsh_extended_command(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(": ")?;
    let (meta, cmd) = rest.split_once(';')?;
    let (start, duration) = meta.split_once(':')?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (numeric(start.trim()) && numeric(duration.trim())).then_some(cmd)
}

/// A history file with one entry per line.
#[derive(Debug, Clone)]
pub struct LineFileStore {
    path: PathBuf,
    format: LineFormat,
}

impl LineFileStore {
    pub fn new(path: PathBuf, format: LineFormat) -> Self {
        Self { path, format }
    }
}

impl HistoryStore for LineFileStore {
    fn load(&mut self) -> Result<Vec<String>, StoreError> {
        let bytes = read_or_create(&self.path)?;
        let mut commands = Vec::new();
        let mut undecodable = 0usize;
        for raw in bytes.split(|&b| b == b'\n') {
            // Lines that are not UTF-8 are neither shown nor matched on delete.
            let Ok(text) = std::str::from_utf8(raw) else {
                undecodable += 1;
                continue;
            };
            if let Line::Command(cmd) = self.format.classify(text) {
                commands.push(cmd.to_string());
            }
        }
        if undecodable > 0 {
            tracing::debug!(path = %self.path.display(), undecodable, "skipped non-UTF-8 history lines");
        }
        Ok(commands)
    }

    fn delete_everywhere(&mut self, command: &str) -> Result<(), StoreError> {
        let bytes = read_or_create(&self.path)?;
        let mut kept: Vec<&[u8]> = Vec::new();
        // A timestamp line belongs to the command that follows it.
        let mut pending_stamp: Option<&[u8]> = None;
        let mut removed = 0usize;

        for raw in bytes.split(|&b| b == b'\n') {
            let line = match std::str::from_utf8(raw) {
                Ok(text) => self.format.classify(text),
                Err(_) => Line::Blank,
            };
            match line {
                Line::Timestamp => {
                    if let Some(stamp) = pending_stamp.replace(raw) {
                        kept.push(stamp);
                    }
                }
                Line::Command(cmd) if cmd == command => {
                    pending_stamp = None;
                    removed += 1;
                }
                Line::Command(_) | Line::Blank => {
                    if let Some(stamp) = pending_stamp.take() {
                        kept.push(stamp);
                    }
                    kept.push(raw);
                }
            }
        }
        if let Some(stamp) = pending_stamp {
            kept.push(stamp);
        }

        // The trailing newline shows up as an empty final segment; drop it and
        // write every kept line newline-terminated.
        if kept.last().is_some_and(|l| l.is_empty()) {
            kept.pop();
        }
        write_atomically(&self.path, kept.into_iter().map(Cow::Borrowed))?;
        tracing::info!(path = %self.path.display(), removed, "deleted command from history file");
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// IPython's SQLite history database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let conn = Connection::open(&self.path).map_err(|e| self.sqlite_error(e))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                session INTEGER,
                line INTEGER,
                source TEXT,
                source_raw TEXT,
                PRIMARY KEY (session, line)
            );",
        )
        .map_err(|e| self.sqlite_error(e))?;
        Ok(conn)
    }

    fn sqlite_error(&self, source: rusqlite::Error) -> StoreError {
        StoreError::Sqlite {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStore for SqliteStore {
    fn load(&mut self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT source_raw FROM history ORDER BY session, line")
            .map_err(|e| self.sqlite_error(e))?;
        let rows = stmt
            .query_map(params![], |row| row.get::<_, Option<String>>(0))
            .map_err(|e| self.sqlite_error(e))?;

        let mut commands = Vec::new();
        let mut multiline = 0usize;
        for row in rows {
            let Some(source) = row.map_err(|e| self.sqlite_error(e))? else {
                continue;
            };
            let source = source.trim();
            if source.is_empty() {
                continue;
            }
            // One command per line is all the favorites file can hold.
            if source.contains('\n') {
                multiline += 1;
                continue;
            }
            commands.push(source.to_string());
        }
        if multiline > 0 {
            tracing::debug!(multiline, "skipped multi-line IPython cells");
        }
        Ok(commands)
    }

    fn delete_everywhere(&mut self, command: &str) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(|e| self.sqlite_error(e))?;

        // Match rows the same way `load` trims them, then delete by rowid.
        let rowids = {
            let mut stmt = tx
                .prepare("SELECT rowid, source_raw FROM history")
                .map_err(|e| self.sqlite_error(e))?;
            let rows = stmt
                .query_map(params![], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
                })
                .map_err(|e| self.sqlite_error(e))?;
            let mut rowids = Vec::new();
            for row in rows {
                let (rowid, source) = row.map_err(|e| self.sqlite_error(e))?;
                if source.as_deref().map(str::trim) == Some(command) {
                    rowids.push(rowid);
                }
            }
            rowids
        };

        let mut removed = 0usize;
        for rowid in &rowids {
            removed += tx
                .execute("DELETE FROM history WHERE rowid = ?1", params![rowid])
                .map_err(|e| self.sqlite_error(e))?;
        }
        if removed != rowids.len() {
            return Err(StoreError::DeletionRefused {
                path: self.path.clone(),
                command: command.to_string(),
            });
        }
        tx.commit().map_err(|e| self.sqlite_error(e))?;

        tracing::info!(path = %self.path.display(), removed, "deleted command from history database");
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// The favorites list: a plain file, one command per line.
#[derive(Debug, Clone)]
pub struct FavoritesFile {
    path: PathBuf,
}

impl FavoritesFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<String>, StoreError> {
        LineFileStore::new(self.path.clone(), LineFormat::Plain).load()
    }

    /// Replace the file with `favorites` in one step.
    pub fn persist(&self, favorites: &[String]) -> Result<(), StoreError> {
        write_atomically(
            &self.path,
            favorites.iter().map(|f| Cow::Borrowed(f.as_bytes())),
        )?;
        tracing::debug!(path = %self.path.display(), count = favorites.len(), "persisted favorites");
        Ok(())
    }
}

/// Read `path`, creating it (and its parents) empty when it does not exist.
fn read_or_create(path: &Path) -> Result<Vec<u8>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "store missing, creating it empty");
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
            fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
            Ok(Vec::new())
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Write newline-terminated `lines` to a sibling temp file, then rename it
/// over `path`, so readers never see a half-written file.
fn write_atomically<'a>(
    path: &Path,
    lines: impl Iterator<Item = Cow<'a, [u8]>>,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.hstui-tmp"));

    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(&line);
        out.push(b'\n');
    }

    let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(&out)
        .and_then(|()| file.sync_all())
        .map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
