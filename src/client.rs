use log::debug;

use crate::cli::Framing;
use crate::error::ClientError;
use crate::models::chat::{ EntryStyle, Sender, Transcript };
use crate::models::websocket::{ MessageKind, ServerMessage };
use crate::render::format::{ format_content, format_error, format_tool_call };
use crate::render::Renderer;

/// Mediates between user input and the rendered transcript. Owns the
/// transcript and the awaiting-reply state; the WebSocket driver feeds it
/// frames and transmits whatever `send` hands back.
pub struct ChatClient<R: Renderer> {
    framing: Framing,
    renderer: R,
    transcript: Transcript,
    connected: bool,
    awaiting_reply: bool,
}

impl<R: Renderer> ChatClient<R> {
    pub fn new(framing: Framing, renderer: R) -> Self {
        Self {
            framing,
            renderer,
            transcript: Transcript::new(),
            connected: false,
            awaiting_reply: false,
        }
    }

    pub fn connection_opened(&mut self) {
        self.connected = true;
    }

    pub fn connection_closed(&mut self) {
        self.connected = false;
        if self.awaiting_reply {
            self.awaiting_reply = false;
            self.renderer.set_typing(false);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Accept a line of user input. Returns the text frame to transmit, or
    /// `None` when the trimmed line is empty or the client is not connected
    /// (the message is dropped, not queued).
    pub fn send(&mut self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        if !self.connected {
            debug!("Not connected; dropping message: {}", text);
            return None;
        }

        self.append(Sender::User, EntryStyle::Plain, text.to_string());
        self.awaiting_reply = true;
        self.renderer.set_typing(true);
        Some(text.to_string())
    }

    /// Handle one inbound text frame. Any receipt hides the typing
    /// indicator, even a malformed one.
    pub fn handle_frame(&mut self, raw: &str) -> Result<(), ClientError> {
        if self.awaiting_reply {
            self.awaiting_reply = false;
            self.renderer.set_typing(false);
        }

        match self.framing {
            Framing::Text => {
                self.append(Sender::Bot, EntryStyle::Plain, raw.to_string());
                Ok(())
            }
            Framing::Json => {
                let message = ServerMessage::parse(raw)?;
                match message.kind() {
                    MessageKind::Error => {
                        self.append(Sender::Bot, EntryStyle::Plain, format_error(&message.content));
                    }
                    MessageKind::ToolCall => {
                        self.append(
                            Sender::Bot,
                            EntryStyle::ToolCall,
                            format_tool_call(&message.content)
                        );
                    }
                    MessageKind::Answer => {
                        self.append(
                            Sender::Bot,
                            EntryStyle::Plain,
                            format_content(&message.content)
                        );
                    }
                }
                Ok(())
            }
        }
    }

    fn append(&mut self, sender: Sender, style: EntryStyle, text: String) {
        let entry = self.transcript.push(sender, style, text);
        self.renderer.append(entry);
    }
}
