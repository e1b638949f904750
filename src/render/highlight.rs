//! Language-aware highlighting for fenced code blocks

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const THEME: &str = "base16-ocean.dark";

/// Syntax and theme sets, loaded once and shared
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        let mut themes = ThemeSet::load_defaults();
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: themes.themes.remove(THEME).unwrap_or_default(),
        }
    }

    /// Whether `language` names a known syntax (by name or extension)
    pub fn recognizes(&self, language: &str) -> bool {
        self.syntaxes.find_syntax_by_token(language).is_some()
    }

    /// Highlight `code` as 24-bit terminal output.
    /// Returns `None` when the language is unknown.
    pub fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        let mut lines = HighlightLines::new(syntax, &self.theme);

        let mut out = String::new();
        for line in LinesWithEndings::from(code) {
            match lines.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
                Err(e) => {
                    tracing::debug!(error = %e, language, "Highlighting failed");
                    return None;
                }
            }
        }
        out.push_str("\x1b[0m");
        Some(out)
    }
}
