//! Chart descriptions independent of any plotting library.

use serde::Serialize;

use crate::aggregate::{Aggregates, HOURS_PER_DAY};
use crate::format::{format_date_label, format_month_label, hour_label, weekday_label};
use crate::types::{Role, WordCloudTerm};

/// Monday-first display order of the Sunday-indexed weekday buckets.
pub const WEEKDAY_DISPLAY_ORDER: [usize; 7] = [1, 2, 3, 4, 5, 6, 0];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesValues {
    Counts(Vec<usize>),
    Measures(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub data: SeriesValues,
}

impl Series {
    fn counts(label: impl Into<String>, data: Vec<usize>) -> Self {
        Self {
            label: label.into(),
            data: SeriesValues::Counts(data),
        }
    }
}

/// Category labels plus one or more series aligned to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSeries {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloudChart {
    pub empty: bool,
    pub terms: Vec<WordCloudTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Chart {
    Line(LabeledSeries),
    Bar(LabeledSeries),
    Heatmap(LabeledSeries),
    WordCloud(WordCloudChart),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub monthly_role: Chart,
    pub cumulative_messages: Chart,
    pub assistant_trend: Chart,
    pub hourly_activity: Chart,
    pub weekday_activity: Chart,
    pub monthly_bar_chart: Chart,
    pub monthly_conversations: Chart,
    pub weekday_hour_heatmap: Chart,
    pub word_cloud: Chart,
}

pub fn build_chart_data(
    aggregates: &Aggregates,
    word_cloud_terms: &[WordCloudTerm],
    trend_sample_limit: usize,
) -> ChartData {
    let month_labels: Vec<String> = aggregates
        .monthly_counts
        .keys()
        .map(|month| format_month_label(*month))
        .collect();

    ChartData {
        monthly_role: Chart::Line(monthly_role(aggregates, &month_labels)),
        cumulative_messages: Chart::Line(cumulative_messages(aggregates)),
        assistant_trend: Chart::Line(assistant_trend(aggregates, trend_sample_limit)),
        hourly_activity: Chart::Bar(LabeledSeries {
            labels: (0..HOURS_PER_DAY).map(hour_label).collect(),
            series: vec![Series::counts("Messages", aggregates.hour_counts.to_vec())],
        }),
        weekday_activity: Chart::Bar(LabeledSeries {
            labels: WEEKDAY_DISPLAY_ORDER
                .iter()
                .map(|&day| weekday_label(day).to_string())
                .collect(),
            series: vec![Series::counts(
                "Messages",
                WEEKDAY_DISPLAY_ORDER
                    .iter()
                    .map(|&day| aggregates.weekday_counts[day])
                    .collect(),
            )],
        }),
        monthly_bar_chart: Chart::Bar(LabeledSeries {
            labels: month_labels,
            series: vec![Series::counts(
                "Messages",
                aggregates.monthly_counts.values().copied().collect(),
            )],
        }),
        monthly_conversations: Chart::Bar(monthly_conversations(aggregates)),
        weekday_hour_heatmap: Chart::Heatmap(weekday_hour_heatmap(aggregates)),
        word_cloud: Chart::WordCloud(WordCloudChart {
            empty: word_cloud_terms.is_empty(),
            terms: word_cloud_terms.to_vec(),
        }),
    }
}

fn monthly_role(aggregates: &Aggregates, month_labels: &[String]) -> LabeledSeries {
    let series = aggregates
        .role_counts
        .keys()
        .filter(|role| **role != Role::Unknown)
        .map(|&role| {
            Series::counts(
                role.as_str(),
                aggregates
                    .monthly_counts
                    .keys()
                    .map(|&month| aggregates.monthly_role_count(month, role))
                    .collect(),
            )
        })
        .collect();
    LabeledSeries {
        labels: month_labels.to_vec(),
        series,
    }
}

fn cumulative_messages(aggregates: &Aggregates) -> LabeledSeries {
    let mut running = 0usize;
    let (labels, totals) = aggregates
        .daily_counts
        .iter()
        .map(|(day, count)| {
            running += count;
            (format_date_label(*day), running)
        })
        .unzip();
    LabeledSeries {
        labels,
        series: vec![Series::counts("Messages", totals)],
    }
}

/// Mean words per assistant reply by day, thinned to at most about `limit` points.
fn assistant_trend(aggregates: &Aggregates, limit: usize) -> LabeledSeries {
    let days = aggregates.assistant_daily.len();
    let limit = limit.max(1);
    let step = if days <= limit { 1 } else { days.div_ceil(limit) };

    let (labels, means): (Vec<String>, Vec<f64>) = aggregates
        .assistant_daily
        .iter()
        .step_by(step)
        .map(|(day, totals)| (format_date_label(*day), totals.mean_words()))
        .unzip();
    LabeledSeries {
        labels,
        series: vec![Series {
            label: "Words per reply".to_string(),
            data: SeriesValues::Measures(means),
        }],
    }
}

fn monthly_conversations(aggregates: &Aggregates) -> LabeledSeries {
    let (labels, counts) = aggregates
        .monthly_conversation_counts()
        .into_iter()
        .map(|(month, count)| (format_month_label(month), count))
        .unzip();
    LabeledSeries {
        labels,
        series: vec![Series::counts("Conversations", counts)],
    }
}

/// One series per weekday, Monday first, each spanning the 24 hours.
fn weekday_hour_heatmap(aggregates: &Aggregates) -> LabeledSeries {
    LabeledSeries {
        labels: (0..HOURS_PER_DAY).map(hour_label).collect(),
        series: WEEKDAY_DISPLAY_ORDER
            .iter()
            .map(|&day| {
                Series::counts(
                    weekday_label(day),
                    aggregates.weekday_hour_counts[day].to_vec(),
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportTimezone;
    use crate::types::NormalizedMessage;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    const DAY: i64 = 86_400;
    // 2024-01-01T12:00:00Z, a Monday.
    const MONDAY_NOON: i64 = 1_704_110_400;

    fn message(role: Role, time: i64, words: usize) -> NormalizedMessage {
        NormalizedMessage {
            conversation_index: 0,
            conversation_id: "c".to_string(),
            conversation_title: "t".to_string(),
            role,
            model: None,
            tool_name: None,
            create_time: DateTime::<Utc>::from_timestamp(time, 0),
            content_type: "text".to_string(),
            has_code: false,
            is_multimodal: false,
            text: String::new(),
            word_count: words,
            char_count: words * 5,
        }
    }

    fn series(chart: &Chart) -> &LabeledSeries {
        match chart {
            Chart::Line(data) | Chart::Bar(data) | Chart::Heatmap(data) => data,
            Chart::WordCloud(_) => panic!("word cloud has no series"),
        }
    }

    #[test]
    fn cumulative_and_weekday_charts() {
        let messages = vec![
            message(Role::User, MONDAY_NOON, 1),
            message(Role::Assistant, MONDAY_NOON, 4),
            message(Role::User, MONDAY_NOON + 6 * DAY, 1),
        ];
        let agg = Aggregates::collect(&messages, ReportTimezone::Utc);
        let charts = build_chart_data(&agg, &[], 90);

        let cumulative = series(&charts.cumulative_messages);
        assert_eq!(cumulative.labels, vec!["Jan 01, 2024", "Jan 07, 2024"]);
        assert_eq!(cumulative.series[0].data, SeriesValues::Counts(vec![2, 3]));

        let weekdays = series(&charts.weekday_activity);
        assert_eq!(weekdays.labels.first().map(String::as_str), Some("Mon"));
        assert_eq!(weekdays.labels.last().map(String::as_str), Some("Sun"));
        assert_eq!(
            weekdays.series[0].data,
            SeriesValues::Counts(vec![2, 0, 0, 0, 0, 0, 1])
        );

        let heatmap = series(&charts.weekday_hour_heatmap);
        assert_eq!(heatmap.series.len(), 7);
        assert_eq!(heatmap.series[0].label, "Mon");
        assert_eq!(heatmap.labels.len(), 24);
        assert_eq!(
            heatmap.series[0].data,
            SeriesValues::Counts({
                let mut hours = vec![0; 24];
                hours[12] = 2;
                hours
            })
        );

        let roles = series(&charts.monthly_role);
        let names: Vec<_> = roles.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(names, vec!["user", "assistant"]);
    }

    #[test]
    fn assistant_trend_is_thinned() {
        let messages: Vec<_> = (0..200)
            .map(|i| message(Role::Assistant, MONDAY_NOON + i * DAY, 10))
            .collect();
        let agg = Aggregates::collect(&messages, ReportTimezone::Utc);
        let charts = build_chart_data(&agg, &[], 90);
        let trend = series(&charts.assistant_trend);
        assert_eq!(trend.labels.len(), 67);
        assert_eq!(trend.series[0].label, "Words per reply");
        assert_eq!(trend.labels[1], "Jan 04, 2024");
    }

    #[test]
    fn serialized_shape_uses_type_tags() {
        let agg = Aggregates::collect(&[message(Role::User, MONDAY_NOON, 1)], ReportTimezone::Utc);
        let terms = vec![WordCloudTerm {
            text: "rust".into(),
            weight: 2,
        }];
        let value = serde_json::to_value(build_chart_data(&agg, &terms, 90)).unwrap();
        assert_eq!(value["hourlyActivity"]["type"], "bar");
        assert_eq!(value["monthlyRole"]["type"], "line");
        assert_eq!(value["weekdayHourHeatmap"]["type"], "heatmap");
        assert_eq!(value["monthlyBarChart"]["labels"], json!(["Jan 2024"]));
        assert_eq!(
            value["wordCloud"],
            json!({"type": "word-cloud", "empty": false, "terms": [{"text": "rust", "weight": 2}]})
        );
    }
}
