use serde::Deserialize;
use serde_json::Value;

/// Inbound envelope from the chat endpoint: a `type` discriminant plus an
/// opaque `content` payload. The server does not enforce a schema, so the
/// envelope is kept as loose as the wire: an unknown or missing `type`
/// falls through to the answer path.
#[derive(Deserialize, Debug, Clone)]
pub struct ServerMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    ToolCall,
    Answer,
}

impl ServerMessage {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn kind(&self) -> MessageKind {
        match self.kind.as_deref() {
            Some("error") => MessageKind::Error,
            Some("tool_call") => MessageKind::ToolCall,
            _ => MessageKind::Answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_kinds() {
        let msg = ServerMessage::parse(r#"{"type":"error","content":"bad input"}"#).unwrap();
        assert_eq!(msg.kind(), MessageKind::Error);

        let msg = ServerMessage::parse(r#"{"type":"tool_call","content":{"x":1}}"#).unwrap();
        assert_eq!(msg.kind(), MessageKind::ToolCall);
        assert_eq!(msg.content, json!({"x": 1}));
    }

    #[test]
    fn unknown_or_missing_type_defaults_to_answer() {
        let msg = ServerMessage::parse(r#"{"type":"answer","content":"hi"}"#).unwrap();
        assert_eq!(msg.kind(), MessageKind::Answer);

        let msg = ServerMessage::parse(r#"{"type":"status","content":"hi"}"#).unwrap();
        assert_eq!(msg.kind(), MessageKind::Answer);

        let msg = ServerMessage::parse(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(msg.kind(), MessageKind::Answer);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ServerMessage::parse("not json").is_err());
    }
}
