//! Ordering and deduplication of raw history.
//!
//! Both functions are pure: they never fail, never mutate their input, and
//! always return exactly one entry per distinct command.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Remove duplicates, keeping each command at its first occurrence.
pub fn dedupe_stable(commands: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(commands.len());
    commands
        .iter()
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}

/// Rank distinct commands by how often they occur, most frequent first.
///
/// Ties go to the command whose latest occurrence is more recent (later in
/// `commands`), so the ordering is total and deterministic.
pub fn rank(commands: &[String]) -> Vec<String> {
    // command -> (count, last index)
    let mut stats: HashMap<&str, (usize, usize)> = HashMap::with_capacity(commands.len());
    for (idx, cmd) in commands.iter().enumerate() {
        let entry = stats.entry(cmd.as_str()).or_insert((0, idx));
        entry.0 += 1;
        entry.1 = idx;
    }

    let mut ranked: Vec<(&str, usize, usize)> = stats
        .into_iter()
        .map(|(cmd, (count, last))| (cmd, count, last))
        .collect();
    // Last indices are unique per command, so this key never ties.
    ranked.sort_unstable_by_key(|&(_, count, last)| (Reverse(count), Reverse(last)));
    ranked.into_iter().map(|(cmd, _, _)| cmd.to_string()).collect()
}
