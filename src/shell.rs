//! Shell kinds and writing a command back into the calling shell's input.

use std::fmt;
use std::io;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

/// The shell whose history is being browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// Standard Python REPL (readline history file).
    Python,
    /// bpython (plain history file).
    Bpython,
    /// IPython (SQLite history database).
    Ipython,
    /// bash (`HISTFILE`, optional `#<epoch>` timestamp lines).
    Bash,
    /// zsh (`HISTFILE`, optional extended-history prefixes).
    Zsh,
}

impl ShellKind {
    /// Guess from `$SHELL`, falling back to the Python REPL.
    pub fn detect() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_default();
        match shell.rsplit('/').next() {
            Some("zsh") => ShellKind::Zsh,
            Some("bash") => ShellKind::Bash,
            _ => ShellKind::Python,
        }
    }

    /// Where this shell keeps its history by default.
    pub fn default_history_path(self) -> Option<PathBuf> {
        if matches!(self, ShellKind::Bash | ShellKind::Zsh) {
            if let Some(histfile) = std::env::var_os("HISTFILE").filter(|h| !h.is_empty()) {
                return Some(PathBuf::from(histfile));
            }
        }
        let home = dirs::home_dir()?;
        let path = match self {
            ShellKind::Python => home.join(".python_history"),
            ShellKind::Bpython => home.join(".pythonhist"),
            ShellKind::Ipython => home.join(".ipython/profile_default/history.sqlite"),
            ShellKind::Bash => home.join(".bash_history"),
            ShellKind::Zsh => home.join(".zsh_history"),
        };
        Some(path)
    }

    /// Where favorites for this shell are kept by default.
    pub fn default_favorites_path(self) -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("hstui").join(format!("{self}_favorites")))
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShellKind::Python => "python",
            ShellKind::Bpython => "bpython",
            ShellKind::Ipython => "ipython",
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
        };
        f.write_str(name)
    }
}

/// Push `text` into the controlling terminal's input queue, byte by byte,
/// so the shell reads it as if it had been typed.
#[cfg(unix)]
pub fn inject(text: &str) -> io::Result<()> {
    for byte in text.bytes() {
        // SAFETY: TIOCSTI reads exactly one byte through the pointer, which
        // stays valid for the duration of the call.
        let rc = unsafe { libc::ioctl(libc::STDIN_FILENO, libc::TIOCSTI, &byte as *const u8) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn inject(_text: &str) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "terminal input injection is only available on unix",
    ))
}
