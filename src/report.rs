//! Derived metrics, their display context and the finished recap.
//!
//! [`RecapMetrics`] holds raw values (counts, fractions, dates) and is what
//! tests assert against. [`RecapContext`] is the flat, display-ready mapping
//! the slideshow consumes; every entry in it is rendered from the metrics.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::achievements::{catalog_size, evaluate_achievements, Achievement, AchievementInputs};
use crate::aggregate::Aggregates;
use crate::charts::{build_chart_data, ChartData};
use crate::config::RecapConfig;
use crate::extremum::{first_extremum, low_bucket, peak_bucket, Extremum};
use crate::format::*;
use crate::leaderboard::{rank_models, rank_tools, rank_topics, tool_label, ModelUsage, ToolUsage, Topic};
use crate::stats::{describe_series, rolling_average, SeriesSummary};
use crate::streaks::{compute_streaks, StreakInfo};
use crate::types::{ConversationCategory, NormalizedMessage, Role, WordCloudTerm, YearMonth};
use crate::words::word_cloud_terms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: YearMonth,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthMean {
    pub month: YearMonth,
    pub mean_words: f64,
}

/// An hour (0..24) or weekday (0 = Sunday) bucket and its message count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub index: usize,
    pub count: usize,
}

impl From<(usize, usize)> for Bucket {
    fn from((index, count): (usize, usize)) -> Self {
        Self { index, count }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub one_and_done: usize,
    pub short: usize,
    pub deep: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.one_and_done + self.short + self.deep
    }

    /// Fraction of all conversations; zero everywhere when there are none.
    pub fn fraction(&self, category: ConversationCategory) -> f64 {
        let count = match category {
            ConversationCategory::OneAndDone => self.one_and_done,
            ConversationCategory::Short => self.short,
            ConversationCategory::Deep => self.deep,
        };
        count as f64 / self.total().max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopConversation {
    pub id: String,
    pub title: String,
    pub messages: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub messages_per_conversation: SeriesSummary,
    pub conversation_minutes: SeriesSummary,
    pub user_turns: SeriesSummary,
    pub assistant_turns: SeriesSummary,
    pub user_words_per_message: SeriesSummary,
    pub assistant_words_per_message: SeriesSummary,
    pub assistant_chars_per_message: SeriesSummary,
}

/// Raw derived values, before any display formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecapMetrics {
    pub conversation_count: usize,
    pub message_count: usize,
    pub role_counts: IndexMap<Role, usize>,
    pub untimed_messages: usize,
    pub active_days: usize,
    pub avg_messages_per_active_day: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub busiest_day: Option<DayCount>,
    pub peak_month: Option<MonthCount>,
    pub quiet_month: Option<MonthCount>,
    pub streaks: StreakInfo,
    pub categories: CategoryCounts,
    pub conversations_with_tools: usize,
    pub conversations_with_code: usize,
    pub conversations_with_multimodal: usize,
    pub top_conversation: Option<TopConversation>,
    pub assistant_peak: Option<MonthMean>,
    pub assistant_low: Option<MonthMean>,
    pub latest_word_avg: Option<f64>,
    pub latest_char_avg: Option<f64>,
    pub hour_counts: Vec<usize>,
    pub weekday_counts: Vec<usize>,
    pub peak_hour: Option<Bucket>,
    pub low_hour: Option<Bucket>,
    pub peak_weekday: Option<Bucket>,
    pub low_weekday: Option<Bucket>,
    pub daytime_messages: usize,
    pub late_night_messages: usize,
    pub weekend_messages: usize,
    pub timed_messages: usize,
    pub models: Vec<ModelUsage>,
    pub tools: ToolUsage,
    pub topics: Vec<Topic>,
    pub achievements: Vec<Achievement>,
    pub word_cloud: Vec<WordCloudTerm>,
    pub series: SeriesStatistics,
}

/// Hours 06:00 through 17:59 count as daytime.
fn is_daytime(hour: usize) -> bool {
    (6..18).contains(&hour)
}

/// From 22:00 until 04:59.
fn is_late_night(hour: usize) -> bool {
    hour >= 22 || hour < 5
}

fn sum_hours(hours: &[usize], keep: fn(usize) -> bool) -> usize {
    hours
        .iter()
        .enumerate()
        .filter(|(hour, _)| keep(*hour))
        .map(|(_, count)| count)
        .sum()
}

impl RecapMetrics {
    pub fn compute(
        messages: &[NormalizedMessage],
        aggregates: &Aggregates,
        config: &RecapConfig,
    ) -> Self {
        let conversations = &aggregates.conversations;
        let streaks = compute_streaks(&aggregates.active_days());

        let active_days = aggregates.daily_counts.len();
        let avg_messages_per_active_day = if active_days == 0 {
            0.0
        } else {
            aggregates.daily_counts.values().sum::<usize>() as f64 / active_days as f64
        };

        let busiest_day = first_extremum(
            aggregates
                .daily_counts
                .iter()
                .map(|(&day, &count)| DayCount { day, count })
                .filter(|entry| entry.count > 0),
            Extremum::Max,
            |entry| entry.count,
        );
        let month_counts = || {
            aggregates
                .monthly_counts
                .iter()
                .map(|(&month, &count)| MonthCount { month, count })
        };
        let peak_month = first_extremum(
            month_counts().filter(|entry| entry.count > 0),
            Extremum::Max,
            |entry| entry.count,
        );
        let quiet_month = first_extremum(month_counts(), Extremum::Min, |entry| entry.count);

        let mut categories = CategoryCounts::default();
        for conversation in conversations {
            match conversation.category() {
                ConversationCategory::OneAndDone => categories.one_and_done += 1,
                ConversationCategory::Short => categories.short += 1,
                ConversationCategory::Deep => categories.deep += 1,
            }
        }

        let top_conversation = first_extremum(
            conversations.iter().filter(|c| c.messages > 0),
            Extremum::Max,
            |c| c.messages,
        )
        .map(|c| TopConversation {
            id: c.id.clone(),
            title: c.title.clone(),
            messages: c.messages,
        });

        let monthly_means = || {
            aggregates
                .assistant_monthly
                .iter()
                .map(|(&month, totals)| MonthMean {
                    month,
                    mean_words: totals.mean_words(),
                })
        };
        let assistant_peak = first_extremum(
            monthly_means().filter(|entry| entry.mean_words > 0.0),
            Extremum::Max,
            |entry| entry.mean_words,
        );
        let assistant_low = first_extremum(monthly_means(), Extremum::Min, |entry| entry.mean_words);

        let daily_word_means: Vec<f64> = aggregates
            .assistant_daily
            .values()
            .map(|totals| totals.mean_words())
            .collect();
        let daily_char_means: Vec<f64> = aggregates
            .assistant_daily
            .values()
            .map(|totals| totals.mean_chars())
            .collect();

        let hours = &aggregates.hour_counts;
        let weekdays = &aggregates.weekday_counts;
        let tools = rank_tools(&aggregates.tool_counts);
        let achievements = evaluate_achievements(&AchievementInputs::from_aggregates(aggregates, &streaks));

        let metrics = Self {
            conversation_count: conversations.len(),
            message_count: aggregates.message_count,
            role_counts: aggregates.role_counts.clone(),
            untimed_messages: aggregates.untimed_messages,
            active_days,
            avg_messages_per_active_day,
            first_date: streaks.first_date,
            last_date: aggregates.daily_counts.keys().next_back().copied(),
            busiest_day,
            peak_month,
            quiet_month,
            categories,
            conversations_with_tools: conversations.iter().filter(|c| c.has_tool).count(),
            conversations_with_code: conversations.iter().filter(|c| c.has_code).count(),
            conversations_with_multimodal: conversations.iter().filter(|c| c.has_multimodal).count(),
            top_conversation,
            assistant_peak,
            assistant_low,
            latest_word_avg: rolling_average(&daily_word_means, config.rolling_window),
            latest_char_avg: rolling_average(&daily_char_means, config.rolling_window),
            hour_counts: hours.to_vec(),
            weekday_counts: weekdays.to_vec(),
            peak_hour: peak_bucket(hours).map(Bucket::from),
            low_hour: low_bucket(hours).map(Bucket::from),
            peak_weekday: peak_bucket(weekdays).map(Bucket::from),
            low_weekday: low_bucket(weekdays).map(Bucket::from),
            daytime_messages: sum_hours(hours, is_daytime),
            late_night_messages: sum_hours(hours, is_late_night),
            weekend_messages: aggregates.weekend_messages(),
            timed_messages: aggregates.timed_messages(),
            models: rank_models(&aggregates.model_counts, aggregates.message_count),
            tools,
            topics: rank_topics(
                aggregates.conversation_titles.values().map(String::as_str),
                config.topic_limit,
            ),
            achievements,
            word_cloud: word_cloud_terms(messages, config.word_cloud_limit),
            series: series_statistics(aggregates),
            streaks,
        };

        info!(
            active_days = metrics.active_days,
            longest_streak = metrics.streaks.longest_streak_length,
            earned_badges = metrics.earned_achievements().count(),
            "derived recap metrics"
        );
        metrics
    }

    pub fn role_count(&self, role: Role) -> usize {
        self.role_counts.get(&role).copied().unwrap_or(0)
    }

    pub fn earned_achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|badge| badge.earned)
    }
}

fn series_statistics(aggregates: &Aggregates) -> SeriesStatistics {
    let conversations = &aggregates.conversations;
    let as_f64 = |values: &[usize]| values.iter().map(|&v| v as f64).collect::<Vec<_>>();

    SeriesStatistics {
        messages_per_conversation: describe_series(conversations.iter().map(|c| c.messages as f64)),
        conversation_minutes: describe_series(
            conversations.iter().filter_map(|c| c.duration_minutes()),
        ),
        user_turns: describe_series(conversations.iter().map(|c| c.user_messages as f64)),
        assistant_turns: describe_series(conversations.iter().map(|c| c.assistant_messages as f64)),
        user_words_per_message: describe_series(as_f64(&aggregates.user_message_words)),
        assistant_words_per_message: describe_series(as_f64(&aggregates.assistant_message_words)),
        assistant_chars_per_message: describe_series(as_f64(&aggregates.assistant_message_chars)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicEntry {
    pub topic: String,
    pub count: String,
}

/// Display-ready values keyed by the names the slideshow templates use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecapContext {
    pub first_date: String,
    pub last_date: String,
    pub conversation_count: String,
    pub message_count: String,
    pub active_days: String,
    pub avg_messages_per_active_day: String,
    pub peak_month_label: String,
    pub peak_month_value: String,
    pub quiet_month_label: String,
    pub quiet_month_value: String,
    pub busiest_day_label: String,
    pub busiest_day_value: String,
    pub longest_streak_length: String,
    pub longest_streak_range: String,
    pub longest_gap_length: String,
    pub longest_gap_range: String,
    pub assistant_share: String,
    pub user_share: String,
    pub deep_share: String,
    pub short_share: String,
    pub one_share: String,
    pub tool_share: String,
    pub code_share: String,
    pub multimodal_share: String,
    pub top_conversation_title: String,
    pub top_conversation_messages: String,
    pub median_conversation_length: String,
    pub longest_conversation_minutes: String,
    pub assistant_peak_label: String,
    pub assistant_peak_words: String,
    pub assistant_low_label: String,
    pub assistant_low_words: String,
    pub latest_word_avg: String,
    pub latest_char_avg: String,
    pub peak_hour_label: String,
    pub peak_hour_messages: String,
    pub low_hour_label: String,
    pub low_hour_messages: String,
    pub daypart_split: String,
    pub night_share: String,
    pub peak_weekday_label: String,
    pub peak_weekday_messages: String,
    pub low_weekday_label: String,
    pub low_weekday_messages: String,
    pub weekend_share: String,
    pub word_cloud_terms: Vec<WordCloudTerm>,
    pub primary_model: String,
    pub primary_model_count: String,
    pub primary_model_percent: String,
    pub secondary_model: String,
    pub secondary_model_count: String,
    pub secondary_model_percent: String,
    pub tools_used: String,
    pub top_tool: String,
    pub top_tool_count: String,
    pub dalle_count: String,
    pub browser_count: String,
    pub top_topics: Vec<TopicEntry>,
    pub top_topic_1: String,
    pub top_topic_2: String,
    pub top_topic_3: String,
    pub achievements: Vec<Achievement>,
    pub achievement_count: usize,
    pub total_achievements: usize,
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

fn or_placeholder<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map_or_else(placeholder, render)
}

/// Zero counts read as unavailable on the leaderboard slides.
fn nonzero_integer(count: usize) -> String {
    integer_or_placeholder((count > 0).then_some(count))
}

fn model_fields(model: Option<&ModelUsage>) -> (String, String, String) {
    match model {
        Some(model) => (
            model.label.clone(),
            nonzero_integer(model.count),
            if model.percent > 0 {
                format!("{}%", model.percent)
            } else {
                placeholder()
            },
        ),
        None => (placeholder(), placeholder(), placeholder()),
    }
}

impl RecapContext {
    pub fn from_metrics(metrics: &RecapMetrics) -> Self {
        let streaks = &metrics.streaks;
        let hours = &metrics.hour_counts;
        let total_timed: usize = hours.iter().sum();
        let categories = &metrics.categories;

        let (primary_model, primary_model_count, primary_model_percent) =
            model_fields(metrics.models.first());
        let (secondary_model, secondary_model_count, secondary_model_percent) =
            model_fields(metrics.models.get(1));

        let top_topics: Vec<TopicEntry> = metrics
            .topics
            .iter()
            .map(|topic| TopicEntry {
                topic: topic.topic.clone(),
                count: format_integer(topic.count),
            })
            .collect();
        let topic_line = |idx: usize| {
            or_placeholder(top_topics.get(idx), |entry| {
                format!("{} ({})", entry.topic, entry.count)
            })
        };

        let earned: Vec<Achievement> = metrics.earned_achievements().cloned().collect();
        let conversation_minutes = &metrics.series.conversation_minutes;

        Self {
            first_date: or_placeholder(metrics.first_date, format_date_label),
            last_date: or_placeholder(metrics.last_date, format_date_label),
            conversation_count: format_integer(metrics.conversation_count),
            message_count: format_integer(metrics.message_count),
            active_days: format_integer(metrics.active_days),
            avg_messages_per_active_day: format_number(metrics.avg_messages_per_active_day),
            peak_month_label: or_placeholder(metrics.peak_month, |m| format_month_label(m.month)),
            peak_month_value: or_placeholder(metrics.peak_month, |m| format_integer(m.count)),
            quiet_month_label: or_placeholder(metrics.quiet_month, |m| format_month_label(m.month)),
            quiet_month_value: or_placeholder(metrics.quiet_month, |m| format_integer(m.count)),
            busiest_day_label: or_placeholder(metrics.busiest_day, |d| format_date_label(d.day)),
            busiest_day_value: or_placeholder(metrics.busiest_day, |d| format_integer(d.count)),
            longest_streak_length: format_integer(streaks.longest_streak_length),
            longest_streak_range: or_placeholder(streaks.longest_streak, format_day_range),
            longest_gap_length: format_integer(streaks.longest_gap_length),
            longest_gap_range: or_placeholder(
                streaks.longest_gap.filter(|_| streaks.longest_gap_length > 0),
                format_day_range,
            ),
            assistant_share: fraction_to_percent(
                metrics.role_count(Role::Assistant),
                metrics.message_count,
            ),
            user_share: fraction_to_percent(metrics.role_count(Role::User), metrics.message_count),
            deep_share: format_percent(categories.fraction(ConversationCategory::Deep)),
            short_share: format_percent(categories.fraction(ConversationCategory::Short)),
            one_share: format_percent(categories.fraction(ConversationCategory::OneAndDone)),
            tool_share: fraction_to_percent(
                metrics.conversations_with_tools,
                metrics.conversation_count,
            ),
            code_share: fraction_to_percent(
                metrics.conversations_with_code,
                metrics.conversation_count,
            ),
            multimodal_share: fraction_to_percent(
                metrics.conversations_with_multimodal,
                metrics.conversation_count,
            ),
            top_conversation_title: or_placeholder(metrics.top_conversation.as_ref(), |c| {
                c.title.clone()
            }),
            top_conversation_messages: or_placeholder(metrics.top_conversation.as_ref(), |c| {
                format_integer(c.messages)
            }),
            median_conversation_length: or_placeholder(
                metrics.series.messages_per_conversation.median,
                format_number,
            ),
            longest_conversation_minutes: or_placeholder(conversation_minutes.max, format_number),
            assistant_peak_label: or_placeholder(metrics.assistant_peak, |m| {
                format_month_label(m.month)
            }),
            assistant_peak_words: or_placeholder(metrics.assistant_peak, |m| {
                format_number(m.mean_words)
            }),
            assistant_low_label: or_placeholder(metrics.assistant_low, |m| {
                format_month_label(m.month)
            }),
            assistant_low_words: or_placeholder(metrics.assistant_low, |m| {
                format_number(m.mean_words)
            }),
            latest_word_avg: or_placeholder(metrics.latest_word_avg, format_number),
            latest_char_avg: or_placeholder(metrics.latest_char_avg, format_rounded),
            peak_hour_label: or_placeholder(metrics.peak_hour, |b| hour_label(b.index)),
            peak_hour_messages: or_placeholder(metrics.peak_hour, |b| format_integer(b.count)),
            low_hour_label: or_placeholder(metrics.low_hour, |b| hour_label(b.index)),
            low_hour_messages: or_placeholder(metrics.low_hour, |b| format_integer(b.count)),
            daypart_split: if total_timed == 0 {
                placeholder()
            } else {
                format!(
                    "Day {} • Night {}",
                    fraction_to_percent(metrics.daytime_messages, total_timed),
                    fraction_to_percent(total_timed - metrics.daytime_messages, total_timed)
                )
            },
            night_share: if total_timed == 0 {
                placeholder()
            } else {
                format!(
                    "Late night {} after 10pm",
                    fraction_to_percent(metrics.late_night_messages, total_timed)
                )
            },
            peak_weekday_label: or_placeholder(metrics.peak_weekday, |b| {
                weekday_label(b.index).to_string()
            }),
            peak_weekday_messages: or_placeholder(metrics.peak_weekday, |b| format_integer(b.count)),
            low_weekday_label: or_placeholder(metrics.low_weekday, |b| {
                weekday_label(b.index).to_string()
            }),
            low_weekday_messages: or_placeholder(metrics.low_weekday, |b| format_integer(b.count)),
            weekend_share: fraction_to_percent(metrics.weekend_messages, metrics.timed_messages),
            word_cloud_terms: metrics.word_cloud.clone(),
            primary_model,
            primary_model_count,
            primary_model_percent,
            secondary_model,
            secondary_model_count,
            secondary_model_percent,
            tools_used: nonzero_integer(metrics.tools.tools_used()),
            top_tool: or_placeholder(metrics.tools.top(), |(name, _)| tool_label(name)),
            top_tool_count: or_placeholder(metrics.tools.top(), |(_, count)| format_integer(count)),
            dalle_count: nonzero_integer(metrics.tools.image_generations),
            browser_count: nonzero_integer(metrics.tools.browser_calls),
            top_topic_1: topic_line(0),
            top_topic_2: topic_line(1),
            top_topic_3: topic_line(2),
            top_topics,
            achievement_count: earned.len(),
            achievements: earned,
            total_achievements: catalog_size(),
        }
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Recap {
    pub metrics: RecapMetrics,
    pub context: RecapContext,
    pub chart_data: ChartData,
}

/// The `{context, chartData}` document handed to the presentation layer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecapPresentation<'a> {
    pub context: &'a RecapContext,
    #[serde(rename = "chartData")]
    pub chart_data: &'a ChartData,
}

impl Recap {
    pub fn presentation(&self) -> RecapPresentation<'_> {
        RecapPresentation {
            context: &self.context,
            chart_data: &self.chart_data,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.presentation())
    }
}

/// Aggregate, derive and format a flattened message list in one go.
pub fn build_recap(messages: &[NormalizedMessage], config: &RecapConfig) -> Recap {
    let aggregates = Aggregates::collect(messages, config.timezone);
    let metrics = RecapMetrics::compute(messages, &aggregates, config);
    let context = RecapContext::from_metrics(&metrics);
    let chart_data = build_chart_data(&aggregates, &metrics.word_cloud, config.trend_sample_limit);
    Recap {
        metrics,
        context,
        chart_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportTimezone;
    use chrono::{DateTime, Utc};

    const DAY: i64 = 86_400;
    // 2024-01-01T00:00:00Z, a Monday.
    const NEW_YEAR: i64 = 1_704_067_200;

    fn message(conversation: &str, role: Role, time: Option<i64>, text: &str) -> NormalizedMessage {
        NormalizedMessage {
            conversation_index: 0,
            conversation_id: conversation.to_string(),
            conversation_title: format!("Planning {conversation} trip"),
            role,
            model: None,
            tool_name: None,
            create_time: time.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            content_type: "text".to_string(),
            has_code: false,
            is_multimodal: false,
            text: text.to_string(),
            word_count: crate::words::count_words(text),
            char_count: crate::words::count_chars(text),
        }
    }

    fn utc_config() -> RecapConfig {
        RecapConfig::default().with_timezone(ReportTimezone::Utc)
    }

    #[test]
    fn untimed_export_renders_placeholders() {
        let messages = vec![
            message("a", Role::User, None, "hello"),
            message("a", Role::Assistant, None, "hi there"),
        ];
        let recap = build_recap(&messages, &utc_config());

        assert_eq!(recap.metrics.active_days, 0);
        assert!(recap.metrics.peak_hour.is_none());
        assert_eq!(recap.context.peak_hour_label, PLACEHOLDER);
        assert_eq!(recap.context.peak_hour_messages, PLACEHOLDER);
        assert_eq!(recap.context.first_date, PLACEHOLDER);
        assert_eq!(recap.context.longest_streak_length, "0");
        assert_eq!(recap.context.longest_streak_range, PLACEHOLDER);
        assert_eq!(recap.context.daypart_split, PLACEHOLDER);
        assert_eq!(recap.context.weekend_share, PLACEHOLDER);
        assert_eq!(recap.context.latest_word_avg, PLACEHOLDER);
        assert_eq!(recap.context.one_share, "100%");
        assert_eq!(recap.context.user_share, "50%");
    }

    #[test]
    fn peaks_and_quiet_months_keep_first_on_ties() {
        let messages = vec![
            message("a", Role::User, Some(NEW_YEAR), "one"),
            message("a", Role::User, Some(NEW_YEAR + 40 * DAY), "two"),
            message("b", Role::User, Some(NEW_YEAR + 80 * DAY), "three"),
        ];
        let metrics = build_recap(&messages, &utc_config()).metrics;

        assert_eq!(
            metrics.peak_month.map(|m| m.month),
            Some(YearMonth { year: 2024, month: 1 })
        );
        assert_eq!(metrics.quiet_month, metrics.peak_month);
        assert_eq!(metrics.busiest_day.map(|d| d.count), Some(1));
        assert_eq!(
            metrics.busiest_day.map(|d| d.day),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(metrics.top_conversation.map(|c| c.id), Some("a".to_string()));
    }

    #[test]
    fn hour_and_weekday_extremes() {
        let messages = vec![
            message("a", Role::User, Some(NEW_YEAR + 9 * 3600), "x"),
            message("a", Role::User, Some(NEW_YEAR + 9 * 3600 + 60), "x"),
            message("a", Role::User, Some(NEW_YEAR + 5 * DAY + 23 * 3600), "x"),
        ];
        let recap = build_recap(&messages, &utc_config());
        assert_eq!(recap.context.peak_hour_label, "09:00");
        assert_eq!(recap.context.peak_hour_messages, "2");
        assert_eq!(recap.context.low_hour_label, "23:00");
        assert_eq!(recap.context.peak_weekday_label, "Mon");
        assert_eq!(recap.context.low_weekday_label, "Sat");
        assert_eq!(recap.context.daypart_split, "Day 66.7% • Night 33.3%");
        assert_eq!(recap.context.night_share, "Late night 33.3% after 10pm");
        assert_eq!(recap.context.weekend_share, "33.3%");
    }

    #[test]
    fn assistant_lengths_and_rolling_average() {
        let messages = vec![
            message("a", Role::Assistant, Some(NEW_YEAR), "one two three four"),
            message("a", Role::Assistant, Some(NEW_YEAR + 40 * DAY), "one two"),
        ];
        let recap = build_recap(&messages, &utc_config());
        let metrics = &recap.metrics;
        assert_eq!(metrics.assistant_peak.map(|m| m.mean_words), Some(4.0));
        assert_eq!(
            metrics.assistant_low.map(|m| m.month),
            Some(YearMonth { year: 2024, month: 2 })
        );
        assert_eq!(metrics.latest_word_avg, Some(3.0));
        assert_eq!(recap.context.latest_char_avg, "13");
        assert_eq!(recap.context.assistant_peak_label, "Jan 2024");
    }

    #[test]
    fn leaderboards_render_with_placeholders() {
        let mut reply = message("a", Role::Assistant, None, "sure");
        reply.model = Some("gpt-4o".to_string());
        let recap = build_recap(&[message("a", Role::User, None, "q"), reply], &utc_config());
        let context = &recap.context;
        assert_eq!(context.primary_model, "GPT-4o");
        assert_eq!(context.primary_model_count, "1");
        assert_eq!(context.primary_model_percent, "50%");
        assert_eq!(context.secondary_model, PLACEHOLDER);
        assert_eq!(context.tools_used, PLACEHOLDER);
        assert_eq!(context.dalle_count, PLACEHOLDER);
        assert_eq!(context.top_topic_1, "Planning (1)");
        assert_eq!(context.top_topic_2, "Trip (1)");
        assert_eq!(context.top_topic_3, PLACEHOLDER);
        assert_eq!(context.total_achievements, 8);
        assert_eq!(context.achievement_count, 0);
    }

    #[test]
    fn presentation_has_context_and_chart_data() {
        let recap = build_recap(&[message("a", Role::User, Some(NEW_YEAR), "hi")], &utc_config());
        let value = serde_json::to_value(recap.presentation()).unwrap();
        assert_eq!(value["context"]["message_count"], "1");
        assert!(value["chartData"]["hourlyActivity"].is_object());
        assert_eq!(value.as_object().map(|o| o.len()), Some(2));
    }
}
