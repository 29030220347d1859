//! Search string compilation and filtering.
//!
//! Literal searches are escaped into a regex so both modes share one
//! predicate type. Matching is "found anywhere", never a full match.

use regex::{Regex, RegexBuilder};

use crate::error::FilterError;

/// A compiled search predicate.
#[derive(Debug, Clone)]
pub struct Filter {
    re: Regex,
}

impl Filter {
    /// True iff the pattern occurs somewhere in `command`.
    pub fn matches(&self, command: &str) -> bool {
        self.re.is_match(command)
    }

    /// Half-open character ranges of every non-empty match in `command`.
    pub fn spans(&self, command: &str) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        // Byte offsets come back in increasing order, so count chars incrementally.
        let mut byte_pos = 0;
        let mut char_pos = 0;
        for m in self.re.find_iter(command) {
            if m.start() == m.end() {
                continue;
            }
            char_pos += command[byte_pos..m.start()].chars().count();
            let start = char_pos;
            char_pos += m.as_str().chars().count();
            byte_pos = m.end();
            spans.push((start, char_pos));
        }
        spans
    }
}

/// Compile a search string into a [`Filter`].
///
/// Only fails in regex mode; escaped literals are always valid patterns.
pub fn compile_filter(
    search: &str,
    regex_mode: bool,
    case_sensitive: bool,
) -> Result<Filter, FilterError> {
    let pattern = if regex_mode {
        search.to_string()
    } else {
        regex::escape(search)
    };

    let re = RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|source| FilterError::InvalidPattern {
            pattern: search.to_string(),
            source,
        })?;

    tracing::debug!(search, regex_mode, case_sensitive, "compiled filter");
    Ok(Filter { re })
}

/// Keep the commands the filter matches, preserving their order.
pub fn apply(partition: &[String], filter: &Filter) -> Vec<String> {
    partition
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect()
}

/// Matched character ranges of `command` for highlighting.
///
/// `filter` is `None` when there is no search or it did not compile; the
/// result is then empty, as it is when the command does not match.
pub fn match_spans(filter: Option<&Filter>, command: &str) -> Vec<(usize, usize)> {
    filter.map(|f| f.spans(command)).unwrap_or_default()
}
