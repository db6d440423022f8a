//! Flattening of the exported conversation trees into normalized messages.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::content::{content_type, MessageContent};
use crate::types::*;
use crate::words::{count_chars, count_words};

/// Flatten every conversation, in array order, into one message list.
///
/// Within a conversation, messages follow the iteration order of its `mapping`
/// object; nodes without a message contribute nothing.
pub fn flatten_messages(conversations: &[Value]) -> Vec<NormalizedMessage> {
    let mut messages = Vec::new();
    let mut without_mapping = 0usize;

    for (index, conversation) in conversations.iter().enumerate() {
        let record = ChatGptConversationRecord::from_value(conversation);
        if record.mapping.is_none() {
            without_mapping += 1;
        }
        extract_chatgpt_messages(index, &record, &mut messages);
    }

    if without_mapping > 0 {
        warn!(without_mapping, "conversations without a mapping object were skipped");
    }
    info!(
        conversations = conversations.len(),
        messages = messages.len(),
        "flattened export"
    );

    messages
}

fn extract_chatgpt_messages(
    index: usize,
    record: &ChatGptConversationRecord<'_>,
    out: &mut Vec<NormalizedMessage>,
) {
    let Some(mapping) = record.mapping else {
        return;
    };

    let conversation_id = record
        .id
        .clone()
        .unwrap_or_else(|| synthesized_conversation_id(index));
    let conversation_title = record.title.unwrap_or(UNTITLED);

    for node in nodes_in_export_order(mapping) {
        let Some(message) = ChatGptMessageRecord::from_node(node) else {
            continue;
        };
        out.push(normalize_message(
            index,
            &conversation_id,
            conversation_title,
            &message,
        ));
    }
}

fn normalize_message(
    index: usize,
    conversation_id: &str,
    conversation_title: &str,
    message: &ChatGptMessageRecord<'_>,
) -> NormalizedMessage {
    let raw_type = content_type(message.content);
    let text = MessageContent::from_value(message.content).text();

    NormalizedMessage {
        conversation_index: index,
        conversation_id: conversation_id.to_string(),
        conversation_title: conversation_title.to_string(),
        role: Role::parse(message.role),
        model: message.model_slug.map(str::to_string),
        tool_name: message.author_name.map(str::to_string),
        create_time: timestamp_from_value(message.create_time),
        content_type: raw_type.unwrap_or("text").to_string(),
        has_code: raw_type == Some("code"),
        is_multimodal: raw_type == Some("multimodal_text"),
        word_count: count_words(&text),
        char_count: count_chars(&text),
        text,
    }
}

/// Mapping nodes in object-property order: keys that are canonical array
/// indices come first in ascending numeric order, then every other key in
/// document order.
fn nodes_in_export_order(mapping: &Map<String, Value>) -> Vec<&Value> {
    let mut indexed: Vec<(u32, &Value)> = Vec::new();
    let mut named: Vec<&Value> = Vec::new();
    for (key, node) in mapping {
        match array_index(key) {
            Some(index) => indexed.push((index, node)),
            None => named.push(node),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, node)| node).chain(named).collect()
}

/// `key` as an array index when it is the canonical decimal form of one.
fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}

/// Identifier used for conversations exported without an `id`.
pub fn synthesized_conversation_id(index: usize) -> String {
    format!("conversation_{index:04}")
}

/// Interpret a JSON `create_time` as epoch seconds; anything but a finite number is `None`.
pub fn timestamp_from_value(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Number(num) => num.as_f64().and_then(timestamp_from_f64),
        _ => None,
    }
}

pub fn timestamp_from_f64(ts: f64) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    let seconds = ts.floor();
    if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
        return None;
    }
    let fraction = (ts - seconds).clamp(0.0, 0.999_999_999_9);
    let mut nanos = (fraction * 1_000_000_000.0).round() as u32;
    if nanos >= 1_000_000_000 {
        nanos = 999_999_999;
    }
    DateTime::<Utc>::from_timestamp(seconds as i64, nanos)
}
