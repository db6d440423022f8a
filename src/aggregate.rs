//! Single-pass rollups over the flattened message stream.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Timelike};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ReportTimezone;
use crate::types::{ConversationSummary, NormalizedMessage, Role, YearMonth};

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_WEEK: usize = 7;

/// Words, characters and message count of assistant replies in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReplyLengthTotals {
    pub words: usize,
    pub chars: usize,
    pub count: usize,
}

impl ReplyLengthTotals {
    fn add(&mut self, message: &NormalizedMessage) {
        self.words += message.word_count;
        self.chars += message.char_count;
        self.count += 1;
    }

    pub fn mean_words(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.words as f64 / self.count as f64
        }
    }

    pub fn mean_chars(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.chars as f64 / self.count as f64
        }
    }
}

/// Every counter the derived metrics are computed from.
///
/// Keyed maps that feed first-wins tie breaks (`role_counts`, `model_counts`,
/// `tool_counts`, `conversation_titles`, `conversations`) keep first-seen
/// order. Calendar maps are ordered by date. Hours and weekdays are taken in
/// the report time zone; weekday 0 is Sunday.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub timezone: ReportTimezone,
    pub message_count: usize,
    pub conversations: Vec<ConversationSummary>,
    pub role_counts: IndexMap<Role, usize>,
    pub model_counts: IndexMap<String, usize>,
    pub tool_counts: IndexMap<String, usize>,
    pub conversation_titles: IndexMap<String, String>,
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    pub monthly_counts: BTreeMap<YearMonth, usize>,
    pub monthly_role_counts: HashMap<(YearMonth, Role), usize>,
    pub assistant_daily: BTreeMap<NaiveDate, ReplyLengthTotals>,
    pub assistant_monthly: BTreeMap<YearMonth, ReplyLengthTotals>,
    pub hour_counts: [usize; HOURS_PER_DAY],
    pub weekday_counts: [usize; DAYS_PER_WEEK],
    pub weekday_hour_counts: [[usize; HOURS_PER_DAY]; DAYS_PER_WEEK],
    pub user_message_words: Vec<usize>,
    pub assistant_message_words: Vec<usize>,
    pub assistant_message_chars: Vec<usize>,
    pub untimed_messages: usize,
}

impl Aggregates {
    fn empty(timezone: ReportTimezone) -> Self {
        Self {
            timezone,
            message_count: 0,
            conversations: Vec::new(),
            role_counts: IndexMap::new(),
            model_counts: IndexMap::new(),
            tool_counts: IndexMap::new(),
            conversation_titles: IndexMap::new(),
            daily_counts: BTreeMap::new(),
            monthly_counts: BTreeMap::new(),
            monthly_role_counts: HashMap::new(),
            assistant_daily: BTreeMap::new(),
            assistant_monthly: BTreeMap::new(),
            hour_counts: [0; HOURS_PER_DAY],
            weekday_counts: [0; DAYS_PER_WEEK],
            weekday_hour_counts: [[0; HOURS_PER_DAY]; DAYS_PER_WEEK],
            user_message_words: Vec::new(),
            assistant_message_words: Vec::new(),
            assistant_message_chars: Vec::new(),
            untimed_messages: 0,
        }
    }

    /// Fold every message into the counters in one pass.
    pub fn collect(messages: &[NormalizedMessage], timezone: ReportTimezone) -> Self {
        let mut aggregates = Self::empty(timezone);
        let mut conversation_slots: HashMap<String, usize> = HashMap::new();

        for message in messages {
            aggregates.record(message, &mut conversation_slots);
        }

        if aggregates.untimed_messages > 0 {
            warn!(
                untimed = aggregates.untimed_messages,
                "messages without a usable create_time left out of calendar buckets"
            );
        }
        info!(
            messages = aggregates.message_count,
            conversations = aggregates.conversations.len(),
            active_days = aggregates.daily_counts.len(),
            "aggregated messages"
        );

        aggregates
    }

    fn record(&mut self, message: &NormalizedMessage, slots: &mut HashMap<String, usize>) {
        self.message_count += 1;
        *self.role_counts.entry(message.role).or_insert(0) += 1;

        if let Some(model) = &message.model {
            *self.model_counts.entry(model.clone()).or_insert(0) += 1;
        }
        if message.role == Role::Tool {
            if let Some(tool) = &message.tool_name {
                *self.tool_counts.entry(tool.clone()).or_insert(0) += 1;
            }
        }
        self.conversation_titles
            .entry(message.conversation_id.clone())
            .or_insert_with(|| message.conversation_title.clone());

        let slot = *slots
            .entry(message.conversation_id.clone())
            .or_insert_with(|| {
                self.conversations.push(ConversationSummary::new(message));
                self.conversations.len() - 1
            });
        self.conversations[slot].record(message);

        match message.role {
            Role::User => self.user_message_words.push(message.word_count),
            Role::Assistant => {
                self.assistant_message_words.push(message.word_count);
                self.assistant_message_chars.push(message.char_count);
            }
            _ => {}
        }

        let Some(instant) = message.create_time else {
            self.untimed_messages += 1;
            return;
        };
        let local = self.timezone.localize(instant);
        let day = local.date();
        let month = YearMonth::of(day);
        let hour = local.hour() as usize;
        let weekday = day.weekday().num_days_from_sunday() as usize;

        *self.daily_counts.entry(day).or_insert(0) += 1;
        *self.monthly_counts.entry(month).or_insert(0) += 1;
        *self
            .monthly_role_counts
            .entry((month, message.role))
            .or_insert(0) += 1;
        self.hour_counts[hour] += 1;
        self.weekday_counts[weekday] += 1;
        self.weekday_hour_counts[weekday][hour] += 1;

        if message.role == Role::Assistant {
            self.assistant_daily.entry(day).or_default().add(message);
            self.assistant_monthly.entry(month).or_default().add(message);
        }
    }

    pub fn monthly_role_count(&self, month: YearMonth, role: Role) -> usize {
        self.monthly_role_counts
            .get(&(month, role))
            .copied()
            .unwrap_or(0)
    }

    pub fn active_days(&self) -> Vec<NaiveDate> {
        self.daily_counts.keys().copied().collect()
    }

    /// Conversations started per month, by each conversation's first timestamp.
    pub fn monthly_conversation_counts(&self) -> BTreeMap<YearMonth, usize> {
        let mut counts = BTreeMap::new();
        for first in self.conversations.iter().filter_map(|c| c.first_time) {
            let month = YearMonth::of(self.timezone.localize(first).date());
            *counts.entry(month).or_insert(0) += 1;
        }
        counts
    }

    /// Messages falling on Saturday or Sunday.
    pub fn weekend_messages(&self) -> usize {
        self.weekday_counts[0] + self.weekday_counts[6]
    }

    pub fn timed_messages(&self) -> usize {
        self.weekday_counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn message(conversation: &str, role: Role, time: Option<i64>) -> NormalizedMessage {
        NormalizedMessage {
            conversation_index: 0,
            conversation_id: conversation.to_string(),
            conversation_title: format!("About {conversation}"),
            role,
            model: None,
            tool_name: None,
            create_time: time.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            content_type: "text".to_string(),
            has_code: false,
            is_multimodal: false,
            text: "two words".to_string(),
            word_count: 2,
            char_count: 9,
        }
    }

    // 2023-11-14T22:13:20Z, a Tuesday.
    const TUESDAY_NIGHT: i64 = 1_700_000_000;

    #[test]
    fn role_counts_sum_to_message_count() {
        let messages = vec![
            message("a", Role::User, Some(TUESDAY_NIGHT)),
            message("a", Role::Assistant, None),
            message("b", Role::Unknown, None),
            message("b", Role::Tool, Some(TUESDAY_NIGHT)),
        ];
        let agg = Aggregates::collect(&messages, ReportTimezone::Utc);
        assert_eq!(agg.role_counts.values().sum::<usize>(), messages.len());
        assert_eq!(agg.conversations.len(), 2);
        assert_eq!(agg.conversations[1].messages, 2);
        assert_eq!(agg.untimed_messages, 2);
    }

    #[test]
    fn calendar_buckets_use_report_zone() {
        let messages = vec![message("a", Role::Assistant, Some(TUESDAY_NIGHT))];

        let utc = Aggregates::collect(&messages, ReportTimezone::Utc);
        assert_eq!(utc.hour_counts[22], 1);
        assert_eq!(utc.weekday_counts[2], 1);
        assert_eq!(utc.weekday_hour_counts[2][22], 1);
        let day = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        assert_eq!(utc.daily_counts.get(&day), Some(&1));
        assert_eq!(utc.assistant_daily[&day].chars, 9);

        let ahead = Aggregates::collect(&messages, "+03:00".parse().unwrap());
        assert_eq!(ahead.hour_counts[1], 1);
        assert_eq!(ahead.weekday_counts[3], 1);
    }

    #[test]
    fn untimed_messages_skip_every_calendar_bucket() {
        let messages = vec![
            message("a", Role::User, None),
            message("a", Role::Assistant, None),
        ];
        let agg = Aggregates::collect(&messages, ReportTimezone::Utc);
        assert!(agg.daily_counts.is_empty());
        assert!(agg.monthly_counts.is_empty());
        assert!(agg.assistant_monthly.is_empty());
        assert_eq!(agg.hour_counts, [0; HOURS_PER_DAY]);
        assert_eq!(agg.timed_messages(), 0);
        assert_eq!(agg.conversations[0].user_messages, 1);
        assert_eq!(agg.conversations[0].words_assistant, 2);
    }

    #[test]
    fn tools_and_models_are_counted_in_first_seen_order() {
        let mut browse = message("a", Role::Tool, None);
        browse.tool_name = Some("browser".to_string());
        let mut named_user = message("a", Role::User, None);
        named_user.tool_name = Some("ignored".to_string());
        let mut reply = message("a", Role::Assistant, None);
        reply.model = Some("gpt-4o".to_string());

        let agg = Aggregates::collect(&[reply.clone(), browse, named_user, reply], ReportTimezone::Utc);
        assert_eq!(agg.tool_counts.len(), 1);
        assert_eq!(agg.tool_counts["browser"], 1);
        assert_eq!(agg.model_counts["gpt-4o"], 2);
        assert_eq!(
            agg.role_counts.keys().copied().collect::<Vec<_>>(),
            vec![Role::Assistant, Role::Tool, Role::User]
        );
    }

    #[test]
    fn conversations_started_per_month() {
        let messages = vec![
            message("a", Role::User, Some(TUESDAY_NIGHT)),
            message("b", Role::User, Some(TUESDAY_NIGHT + 40 * 86_400)),
            message("c", Role::User, None),
        ];
        let agg = Aggregates::collect(&messages, ReportTimezone::Utc);
        let months = agg.monthly_conversation_counts();
        assert_eq!(
            months.into_iter().collect::<Vec<_>>(),
            vec![
                (YearMonth { year: 2023, month: 11 }, 1),
                (YearMonth { year: 2023, month: 12 }, 1),
            ]
        );
    }
}
