//! Terminal view of the transcript

use super::TranscriptView;
use crate::render::{paint, render, Highlighter};
use crate::transcript::{Role, Transcript};
use crossterm::style::Stylize;
use std::io::Write;

/// Prints each turn once, as it is appended
pub struct TerminalView<W: Write> {
    out: W,
    highlighter: Highlighter,
    shown: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            highlighter: Highlighter::new(),
            shown: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_new_turns(&mut self, transcript: &Transcript) -> std::io::Result<()> {
        for turn in transcript.turns().iter().skip(self.shown) {
            let label = format!("{} :", turn.role);
            let label = match turn.role {
                Role::User => label.bold().to_string(),
                Role::Model => label.bold().green().to_string(),
            };
            let body = paint(&render(&turn.text()), &self.highlighter);
            writeln!(self.out, "{label}\n{body}\n")?;
        }
        self.shown = transcript.len();
        self.out.flush()
    }

    fn write_pending(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "{}", "...".dark_grey())?;
        self.out.flush()
    }
}

impl<W: Write> TranscriptView for TerminalView<W> {
    fn show_latest(&mut self, transcript: &Transcript) {
        if let Err(e) = self.write_new_turns(transcript) {
            tracing::warn!(error = %e, "Failed to write transcript");
        }
    }

    fn pending_changed(&mut self, pending: bool) {
        if !pending {
            return;
        }
        if let Err(e) = self.write_pending() {
            tracing::warn!(error = %e, "Failed to write pending marker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Turn;

    #[test]
    fn test_each_turn_printed_once() {
        let mut view = TerminalView::new(Vec::new());
        let mut transcript = Transcript::new();

        transcript.push(Turn::user("first"));
        view.show_latest(&transcript);
        transcript.push(Turn::model("second"));
        view.show_latest(&transcript);
        view.show_latest(&transcript);

        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out.matches("first").count(), 1);
        assert_eq!(out.matches("second").count(), 1);
        assert!(out.find("user :").unwrap() < out.find("model :").unwrap());
    }

    #[test]
    fn test_pending_marker_only_when_pending() {
        let mut view = TerminalView::new(Vec::new());
        view.pending_changed(true);
        view.pending_changed(false);

        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out.matches("...").count(), 1);
    }

    /// Writer whose every write fails
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_write_errors_are_reported() {
        let mut view = TerminalView::new(BrokenPipe);
        let err = view.write_pending().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);

        // The view itself keeps going
        view.pending_changed(true);
        view.show_latest(&Transcript::from(vec![Turn::user("hi")]));
    }
}
