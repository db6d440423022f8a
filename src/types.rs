//! Core data types: export records, normalized messages and per-conversation summaries.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Title given to conversations whose export record carries none.
pub const UNTITLED: &str = "Untitled";

/// Speaker category of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
    Unknown,
}

impl Role {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("user") => Self::User,
            Some("assistant") => Self::Assistant,
            Some("tool") => Self::Tool,
            Some("system") => Self::System,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::System => "system",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one element of the exported conversations array.
#[derive(Debug)]
pub struct ChatGptConversationRecord<'a> {
    pub id: Option<String>,
    pub title: Option<&'a str>,
    pub mapping: Option<&'a Map<String, Value>>,
}

impl<'a> ChatGptConversationRecord<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        let id = match value.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(num)) if num.as_f64() != Some(0.0) => Some(num.to_string()),
            _ => None,
        };
        Self {
            id,
            title: non_empty_str(value.get("title")),
            mapping: value.get("mapping").and_then(Value::as_object),
        }
    }
}

/// Borrowed view of the `message` field of a mapping node.
#[derive(Debug)]
pub struct ChatGptMessageRecord<'a> {
    pub role: Option<&'a str>,
    pub author_name: Option<&'a str>,
    pub create_time: Option<&'a Value>,
    pub content: Option<&'a Value>,
    pub model_slug: Option<&'a str>,
}

impl<'a> ChatGptMessageRecord<'a> {
    /// Returns `None` for nodes whose `message` is absent, null or otherwise falsy.
    pub fn from_node(node: &'a Value) -> Option<Self> {
        let message = node.get("message")?;
        if is_falsy(message) {
            return None;
        }
        let author = message.get("author");
        Some(Self {
            role: non_empty_str(author.and_then(|author| author.get("role"))),
            author_name: non_empty_str(author.and_then(|author| author.get("name"))),
            create_time: message.get("create_time"),
            content: message.get("content").filter(|content| !is_falsy(content)),
            model_slug: non_empty_str(
                message
                    .get("metadata")
                    .and_then(|metadata| metadata.get("model_slug")),
            ),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Number(num) => num.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// One message node flattened out of the export tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMessage {
    pub conversation_index: usize,
    pub conversation_id: String,
    pub conversation_title: String,
    pub role: Role,
    pub model: Option<String>,
    pub tool_name: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub content_type: String,
    pub has_code: bool,
    pub is_multimodal: bool,
    pub text: String,
    pub word_count: usize,
    /// UTF-16 code units of `text`.
    pub char_count: usize,
}

/// Which of the three mutually exclusive conversation shapes a summary falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationCategory {
    OneAndDone,
    Short,
    Deep,
}

/// Running totals for one conversation, keyed by conversation id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub tool_messages: usize,
    pub system_messages: usize,
    pub words_user: usize,
    pub words_assistant: usize,
    pub has_tool: bool,
    pub has_code: bool,
    pub has_multimodal: bool,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
}

impl ConversationSummary {
    pub fn new(message: &NormalizedMessage) -> Self {
        Self {
            index: message.conversation_index,
            id: message.conversation_id.clone(),
            title: message.conversation_title.clone(),
            messages: 0,
            user_messages: 0,
            assistant_messages: 0,
            tool_messages: 0,
            system_messages: 0,
            words_user: 0,
            words_assistant: 0,
            has_tool: false,
            has_code: false,
            has_multimodal: false,
            first_time: None,
            last_time: None,
        }
    }

    pub fn record(&mut self, message: &NormalizedMessage) {
        self.messages += 1;
        match message.role {
            Role::User => {
                self.user_messages += 1;
                self.words_user += message.word_count;
            }
            Role::Assistant => {
                self.assistant_messages += 1;
                self.words_assistant += message.word_count;
            }
            Role::Tool => {
                self.tool_messages += 1;
                self.has_tool = true;
            }
            Role::System => self.system_messages += 1,
            Role::Unknown => {}
        }

        self.has_code |= message.has_code;
        self.has_multimodal |= message.is_multimodal;

        if let Some(time) = message.create_time {
            if self.first_time.map_or(true, |first| time < first) {
                self.first_time = Some(time);
            }
            if self.last_time.map_or(true, |last| time > last) {
                self.last_time = Some(time);
            }
        }
    }

    pub fn category(&self) -> ConversationCategory {
        if self.user_messages == 1 && self.assistant_messages == 1 {
            ConversationCategory::OneAndDone
        } else if self.user_messages <= 3 {
            ConversationCategory::Short
        } else {
            ConversationCategory::Deep
        }
    }

    pub fn duration_minutes(&self) -> Option<f64> {
        let (first, last) = (self.first_time?, self.last_time?);
        Some((last - first).num_milliseconds() as f64 / 60_000.0)
    }
}

/// Calendar month key, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One weighted word for the word-cloud slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCloudTerm {
    pub text: String,
    pub weight: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(role: Role, words: usize, time: Option<i64>) -> NormalizedMessage {
        NormalizedMessage {
            conversation_index: 0,
            conversation_id: "c1".to_string(),
            conversation_title: "Title".to_string(),
            role,
            model: None,
            tool_name: None,
            create_time: time.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            content_type: "text".to_string(),
            has_code: false,
            is_multimodal: false,
            text: String::new(),
            word_count: words,
            char_count: 0,
        }
    }

    #[test]
    fn role_parse_falls_back_to_unknown() {
        assert_eq!(Role::parse(Some("assistant")), Role::Assistant);
        assert_eq!(Role::parse(Some("critic")), Role::Unknown);
        assert_eq!(Role::parse(None), Role::Unknown);
    }

    #[test]
    fn conversation_record_synthesizes_nothing_for_missing_fields() {
        let value = json!({"id": "", "title": null, "mapping": []});
        let record = ChatGptConversationRecord::from_value(&value);
        assert!(record.id.is_none());
        assert!(record.title.is_none());
        assert!(record.mapping.is_none());
    }

    #[test]
    fn message_record_skips_null_message() {
        assert!(ChatGptMessageRecord::from_node(&json!({"message": null})).is_none());
        assert!(ChatGptMessageRecord::from_node(&json!({"children": []})).is_none());
        let node = json!({
            "message": {"author": {"role": "tool", "name": "browser"}, "metadata": {"model_slug": "gpt-4"}}
        });
        let record = ChatGptMessageRecord::from_node(&node).unwrap();
        assert_eq!(record.role, Some("tool"));
        assert_eq!(record.author_name, Some("browser"));
        assert_eq!(record.model_slug, Some("gpt-4"));
        assert!(record.content.is_none());
    }

    #[test]
    fn summary_tracks_roles_and_time_bounds() {
        let first = message(Role::User, 3, Some(1_700_000_100));
        let mut summary = ConversationSummary::new(&first);
        summary.record(&first);
        summary.record(&message(Role::Assistant, 10, Some(1_700_000_000)));
        summary.record(&message(Role::Tool, 0, None));
        summary.record(&message(Role::Unknown, 0, Some(1_700_000_700)));

        assert_eq!(summary.messages, 4);
        assert_eq!(summary.user_messages, 1);
        assert_eq!(summary.assistant_messages, 1);
        assert_eq!(summary.tool_messages, 1);
        assert_eq!(summary.words_user, 3);
        assert_eq!(summary.words_assistant, 10);
        assert!(summary.has_tool);
        assert_eq!(summary.first_time.map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(summary.last_time.map(|t| t.timestamp()), Some(1_700_000_700));
        assert_eq!(summary.duration_minutes(), Some(700.0 / 60.0));
        assert_eq!(summary.category(), ConversationCategory::OneAndDone);
    }

    #[test]
    fn categories_follow_user_turns() {
        let seed = message(Role::User, 1, None);
        let mut summary = ConversationSummary::new(&seed);
        for _ in 0..5 {
            summary.record(&message(Role::User, 1, None));
            summary.record(&message(Role::Assistant, 1, None));
        }
        assert_eq!(summary.category(), ConversationCategory::Deep);

        let mut short = ConversationSummary::new(&seed);
        short.record(&message(Role::User, 1, None));
        assert_eq!(short.category(), ConversationCategory::Short);
    }

    #[test]
    fn year_month_formats_zero_padded() {
        let ym = YearMonth::of(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(ym.to_string(), "2024-03");
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
