//! Plain-text extraction from the `content` union of an exported message.

use serde_json::Value;

/// Content types whose `parts` carry strings or `{text}` / `{title}` objects.
pub const TEXTUAL_CONTENT_TYPES: [&str; 10] = [
    "text",
    "code",
    "reasoning_recap",
    "thoughts",
    "execution_output",
    "tether_browsing_display",
    "system_error",
    "computer_output",
    "sonic_webpage",
    "tether_quote",
];

/// Decoded shape of a message's `content` object, one variant per decoding rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageContent<'a> {
    Textual { parts: &'a [Value] },
    Multimodal { parts: &'a [Value] },
    UserEditableContext { instructions: Option<&'a str> },
    Unrecognized,
}

impl<'a> MessageContent<'a> {
    pub fn from_value(content: Option<&'a Value>) -> Self {
        let Some(content) = content else {
            return Self::Unrecognized;
        };
        let parts = content
            .get("parts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        match content_type(Some(content)) {
            Some(kind) if TEXTUAL_CONTENT_TYPES.contains(&kind) => Self::Textual { parts },
            Some("multimodal_text") => Self::Multimodal { parts },
            Some("user_editable_context") => Self::UserEditableContext {
                instructions: content
                    .get("user_instructions")
                    .and_then(Value::as_str),
            },
            _ => Self::Unrecognized,
        }
    }

    /// Every recoverable fragment, in part order, before empty ones are dropped.
    pub fn fragments(&self) -> Vec<&'a str> {
        match *self {
            Self::Textual { parts } => parts.iter().filter_map(textual_part).collect(),
            Self::Multimodal { parts } => parts.iter().filter_map(multimodal_part).collect(),
            Self::UserEditableContext { instructions } => instructions.into_iter().collect(),
            Self::Unrecognized => Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.fragments()
            .into_iter()
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The raw `content_type` tag, if the content carries a non-empty string one.
pub fn content_type(content: Option<&Value>) -> Option<&str> {
    content?
        .get("content_type")
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
}

/// Extract plain text from a message `content` value; never fails.
pub fn extract_text(content: Option<&Value>) -> String {
    MessageContent::from_value(content).text()
}

fn textual_part(part: &Value) -> Option<&str> {
    match part {
        Value::String(text) => Some(text.as_str()),
        Value::Object(obj) => match (obj.get("text"), obj.get("title")) {
            (Some(Value::String(text)), _) => Some(text.as_str()),
            (_, Some(Value::String(title))) => Some(title.as_str()),
            _ => None,
        },
        _ => None,
    }
}

fn multimodal_part(part: &Value) -> Option<&str> {
    match part {
        Value::String(text) => Some(text.as_str()),
        Value::Object(obj) => {
            let field = match obj.get("content_type").and_then(Value::as_str) {
                Some("text") => "text",
                Some("audio_transcription") => "transcript",
                _ => return None,
            };
            obj.get(field).and_then(Value::as_str)
        }
        _ => None,
    }
}
