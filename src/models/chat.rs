use chrono::Utc;
use serde::{ Serialize, Deserialize };

/// Who authored a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Bot => "bot",
        }
    }
}

/// Visual style of an entry. Tool calls render distinctly from plain replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStyle {
    Plain,
    ToolCall,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub style: EntryStyle,
    pub text: String,
    pub timestamp: i64,
}

impl TranscriptEntry {
    pub fn new(sender: Sender, style: EntryStyle, text: String) -> Self {
        Self {
            sender,
            style,
            text,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Ordered, append-only list of rendered chat entries. Entries are never
/// removed or reused; unbounded growth is accepted.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, style: EntryStyle, text: String) -> &TranscriptEntry {
        self.entries.push(TranscriptEntry::new(sender, style, text));
        self.entries.last().unwrap()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
