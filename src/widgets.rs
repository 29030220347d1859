//! Reusable UI widget helpers for the history list.
//!
//! Colors are derived once per frame from the active theme into an
//! immutable [`UiColors`]; nothing here keeps global state.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use ratatui_themes::ThemePalette;

/// Semantic color palette derived from the active theme.
/// Maps abstract UI roles to concrete `Color` values.
pub struct UiColors {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub favorite: Color,
    pub error: Color,
    pub selected_bg: Color,
    pub bar_bg: Color,
    pub bg: Color,
}

impl UiColors {
    pub fn from_palette(p: &ThemePalette) -> Self {
        let bar_bg = match p.bg {
            Color::Rgb(r, g, b) => Color::Rgb(
                r.saturating_add(10),
                g.saturating_add(10),
                b.saturating_add(15),
            ),
            _ => Color::Rgb(30, 30, 40),
        };

        let selected_bg = match p.selection {
            Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
            _ => Color::Rgb(40, 40, 60),
        };

        Self {
            text: p.fg,
            muted: p.muted,
            accent: p.accent,
            favorite: p.warning,
            error: p.error,
            selected_bg,
            bar_bg,
            bg: p.bg,
        }
    }
}

/// Replace control characters with spaces, one for one, so that match
/// spans computed on the raw command still line up with the display text.
pub fn sanitize_for_display(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Compute the highlight styles for a row based on selection state.
/// Returns `(normal_style, highlight_style)` for use with `build_highlighted_text`.
fn highlight_styles(base_color: Color, bg_color: Color, is_selected: bool) -> (Style, Style) {
    if is_selected {
        (
            Style::default()
                .fg(base_color)
                .add_modifier(Modifier::BOLD),
            Style::default()
                .fg(bg_color)
                .bg(base_color)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(base_color),
            Style::default()
                .fg(base_color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
    }
}

/// Build spans for `text`, styling the half-open character ranges in `spans`
/// with `highlight_style` and everything else with `normal_style`.
pub fn build_highlighted_text(
    text: &str,
    spans: &[(usize, usize)],
    normal_style: Style,
    highlight_style: Style,
) -> Vec<Span<'static>> {
    if spans.is_empty() {
        return vec![Span::styled(text.to_string(), normal_style)];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut last_idx = 0;

    for &(start, end) in spans {
        let start = start.min(chars.len()).max(last_idx);
        let end = end.min(chars.len());
        if start >= end {
            continue;
        }
        if last_idx < start {
            out.push(Span::styled(
                chars[last_idx..start].iter().collect::<String>(),
                normal_style,
            ));
        }
        out.push(Span::styled(
            chars[start..end].iter().collect::<String>(),
            highlight_style,
        ));
        last_idx = end;
    }

    if last_idx < chars.len() {
        out.push(Span::styled(
            chars[last_idx..].iter().collect::<String>(),
            normal_style,
        ));
    }

    out
}

/// One row of the history list, padded to `width` so the selection
/// background spans the whole row.
pub fn command_line(
    command: &str,
    is_selected: bool,
    is_favorite: bool,
    matched: &[(usize, usize)],
    width: usize,
    colors: &UiColors,
) -> Line<'static> {
    let mut spans = Vec::new();

    if is_selected {
        spans.push(Span::styled(
            "▶ ",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("  "));
    }

    let base = if is_favorite {
        colors.favorite
    } else {
        colors.text
    };
    let (normal, highlight) = highlight_styles(base, colors.bg, is_selected);
    let display = sanitize_for_display(command);
    spans.extend(build_highlighted_text(&display, matched, normal, highlight));

    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }

    let mut line = Line::from(spans);
    if is_selected {
        line = line.style(Style::default().bg(colors.selected_bg));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contents(spans: &[Span<'_>]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlighted_text_splits_on_spans() {
        let normal = Style::default();
        let highlight = Style::default().add_modifier(Modifier::BOLD);
        let spans = build_highlighted_text("git log --oneline", &[(0, 3), (8, 10)], normal, highlight);
        assert_eq!(contents(&spans), vec!["git", " log ", "--", "oneline"]);
        assert_eq!(spans[0].style, highlight);
        assert_eq!(spans[1].style, normal);
    }

    #[test]
    fn test_highlighted_text_without_spans_is_one_span() {
        let spans = build_highlighted_text("ls", &[], Style::default(), Style::default());
        assert_eq!(contents(&spans), vec!["ls"]);
    }

    #[test]
    fn test_highlighted_text_ignores_out_of_range_spans() {
        let spans = build_highlighted_text("abc", &[(2, 9), (5, 6)], Style::default(), Style::default());
        assert_eq!(contents(&spans), vec!["ab", "c"]);
    }

    #[test]
    fn test_sanitize_keeps_length() {
        let raw = "echo\ta\u{1b}b";
        let clean = sanitize_for_display(raw);
        assert_eq!(clean, "echo a b");
        assert_eq!(clean.chars().count(), raw.chars().count());
    }
}
