//! FFI module for exposing the recap pipeline to Swift via swift-bridge
//!
//! The macOS front end passes an export path and a time zone string and gets
//! back either the full `{context, chartData}` JSON document or a flat struct
//! of headline figures for its summary card.

use std::path::PathBuf;

use crate::{analyse_export, load_config_or_default, Recap, RecapConfig, ReportTimezone};

#[swift_bridge::bridge]
mod ffi {
    #[swift_bridge(swift_repr = "struct")]
    pub struct FfiRecapHeadline {
        pub first_date: String,
        pub last_date: String,
        pub conversation_count: String,
        pub message_count: String,
        pub active_days: String,
        pub longest_streak_length: String,
        pub peak_hour_label: String,
        pub peak_weekday_label: String,
        pub primary_model: String,
        pub top_topic: String,
        pub achievement_count: usize,
        pub total_achievements: usize,
        pub earned_badges: Vec<String>,
    }

    extern "Rust" {
        fn build_recap_json(export_path: String, timezone: String) -> Result<String, String>;
        fn build_recap_headline(
            export_path: String,
            timezone: String
        ) -> Result<FfiRecapHeadline, String>;
    }
}

/// Config from the usual lookup, with the caller's zone applied when it names one.
fn config_for(timezone: &str) -> Result<RecapConfig, String> {
    let config = load_config_or_default(None).map_err(|e| format!("Failed to load config: {e:#}"))?;
    if timezone.trim().is_empty() {
        return Ok(config);
    }
    let zone: ReportTimezone = timezone
        .parse()
        .map_err(|e| format!("Invalid time zone: {e:#}"))?;
    Ok(config.with_timezone(zone))
}

fn analyse(export_path: String, timezone: &str) -> Result<Recap, String> {
    let config = config_for(timezone)?;
    analyse_export(&PathBuf::from(export_path), &config)
        .map_err(|e| format!("Failed to analyse export: {e}"))
}

/// Analyse an export and return the `{context, chartData}` document.
pub fn build_recap_json(export_path: String, timezone: String) -> Result<String, String> {
    let recap = analyse(export_path, &timezone)?;
    recap
        .to_json_pretty()
        .map_err(|e| format!("Failed to encode recap: {e}"))
}

/// Analyse an export and return the headline figures.
pub fn build_recap_headline(
    export_path: String,
    timezone: String,
) -> Result<ffi::FfiRecapHeadline, String> {
    let recap = analyse(export_path, &timezone)?;
    Ok(headline(&recap))
}

fn headline(recap: &Recap) -> ffi::FfiRecapHeadline {
    let ctx = &recap.context;
    ffi::FfiRecapHeadline {
        first_date: ctx.first_date.clone(),
        last_date: ctx.last_date.clone(),
        conversation_count: ctx.conversation_count.clone(),
        message_count: ctx.message_count.clone(),
        active_days: ctx.active_days.clone(),
        longest_streak_length: ctx.longest_streak_length.clone(),
        peak_hour_label: ctx.peak_hour_label.clone(),
        peak_weekday_label: ctx.peak_weekday_label.clone(),
        primary_model: ctx.primary_model.clone(),
        top_topic: ctx.top_topic_1.clone(),
        achievement_count: ctx.achievement_count,
        total_achievements: ctx.total_achievements,
        earned_badges: ctx
            .achievements
            .iter()
            .map(|badge| badge.name.to_string())
            .collect(),
    }
}
