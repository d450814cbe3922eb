pub mod format;

use std::io::Write;

use log::error;

use crate::models::chat::{ EntryStyle, TranscriptEntry };

const TYPING_TEXT: &str = "bot is typing...";

/// View surface for the transcript. The client core talks to this trait so
/// tests can capture output instead of driving a real terminal.
pub trait Renderer {
    /// Show the newest transcript entry.
    fn append(&mut self, entry: &TranscriptEntry);

    /// Show or hide the awaiting-reply indicator.
    fn set_typing(&mut self, on: bool);
}

/// Writes the transcript to a terminal-style stream. The typing indicator
/// occupies an unterminated line and is erased in place before anything
/// else is printed.
pub struct TerminalRenderer<W: Write> {
    out: W,
    typing_shown: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, typing_shown: false }
    }

    fn erase_typing_line(&mut self) {
        let blank = " ".repeat(TYPING_TEXT.len());
        if write!(self.out, "\r{}\r", blank).and_then(|_| self.out.flush()).is_err() {
            error!("Failed to clear typing indicator");
        }
        self.typing_shown = false;
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn append(&mut self, entry: &TranscriptEntry) {
        if self.typing_shown {
            self.erase_typing_line();
        }

        let prefix = format!("{}> ", entry.sender.label());
        let indent = " ".repeat(prefix.len());

        let mut body = String::new();
        let mut lines = entry.text.lines();
        match entry.style {
            EntryStyle::Plain => {
                body.push_str(&prefix);
                body.push_str(lines.next().unwrap_or(""));
            }
            EntryStyle::ToolCall => {
                body.push_str(&prefix);
                body.push_str("[tool call]");
                if let Some(first) = lines.next() {
                    body.push('\n');
                    body.push_str(&indent);
                    body.push_str(first);
                }
            }
        }
        for line in lines {
            body.push('\n');
            body.push_str(&indent);
            body.push_str(line);
        }

        if writeln!(self.out, "{}", body).and_then(|_| self.out.flush()).is_err() {
            error!("Failed to write transcript entry");
        }
    }

    fn set_typing(&mut self, on: bool) {
        if on == self.typing_shown {
            return;
        }
        if on {
            if write!(self.out, "{}", TYPING_TEXT).and_then(|_| self.out.flush()).is_err() {
                error!("Failed to show typing indicator");
            }
            self.typing_shown = true;
        } else {
            self.erase_typing_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Sender;

    fn render(entry: &TranscriptEntry) -> String {
        let mut buf = Vec::new();
        TerminalRenderer::new(&mut buf).append(entry);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn user_entries_get_the_you_prefix() {
        let entry = TranscriptEntry::new(Sender::User, EntryStyle::Plain, "hello".into());
        assert_eq!(render(&entry), "you> hello\n");
    }

    #[test]
    fn multiline_entries_indent_under_the_prefix() {
        let entry = TranscriptEntry::new(
            Sender::Bot,
            EntryStyle::Plain,
            "SQL Query: SELECT 1\nResults:\n[]".into()
        );
        assert_eq!(render(&entry), "bot> SQL Query: SELECT 1\n     Results:\n     []\n");
    }

    #[test]
    fn tool_calls_are_marked() {
        let entry = TranscriptEntry::new(Sender::Bot, EntryStyle::ToolCall, "{\n  \"x\": 1\n}".into());
        let out = render(&entry);
        assert!(out.starts_with("bot> [tool call]\n"));
        assert!(out.contains("     {\n"));
        assert!(out.contains("\"x\": 1"));
    }

    #[test]
    fn typing_indicator_is_erased_before_the_next_entry() {
        let mut buf = Vec::new();
        let mut renderer = TerminalRenderer::new(&mut buf);
        renderer.set_typing(true);
        let entry = TranscriptEntry::new(Sender::Bot, EntryStyle::Plain, "hi".into());
        renderer.append(&entry);
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("bot is typing...\r"));
        assert!(out.ends_with("\rbot> hi\n"));
    }

    #[test]
    fn hiding_an_unshown_indicator_writes_nothing() {
        let mut buf = Vec::new();
        TerminalRenderer::new(&mut buf).set_typing(false);
        assert!(buf.is_empty());
    }
}
