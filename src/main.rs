use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nu_ansi_term::{Color, Style as AnsiStyle};
use tracing_subscriber::EnvFilter;

use chat_recap::format::{format_integer, PLACEHOLDER};
use chat_recap::leaderboard::tool_label;
use chat_recap::{
    build_recap, load_config_or_default, load_messages, Recap, RecapError, ReportTimezone,
};

const ACCENT_COLOR: Color = Color::Rgb(188, 205, 238);
const EDGE_COLOR: Color = Color::Rgb(217, 182, 203);
const DIM_COLOR: Color = Color::Rgb(125, 132, 140);
const VALUE_SHADE: Color = Color::Rgb(200, 200, 200);
const DOT_ACTIVE_COLOR: Color = Color::Rgb(188, 205, 238);
const DOT_INACTIVE_COLOR: Color = Color::Rgb(90, 94, 104);
const SPINNER_DOTS: usize = 6;

const EXIT_USAGE: u8 = 64;
const EXIT_DATA: u8 = 65;
const EXIT_NO_INPUT: u8 = 66;

#[derive(Parser, Debug)]
#[command(
    name = "chat-recap",
    version,
    about = "Year-in-review statistics for an exported ChatGPT conversations.json"
)]
struct Cli {
    /// conversations.json, or an export directory containing it
    export: PathBuf,

    /// TOML config file (defaults to $CHAT_RECAP_CONFIG, then ~/.config/chat-recap/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Calendar time zone: local, utc, or an offset such as +05:30
    #[arg(long, allow_hyphen_values = true)]
    tz: Option<String>,

    /// Also write recap.json and metrics.json into this directory
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the {context, chartData} document instead of the styled recap
    #[arg(long)]
    json: bool,
}

fn paint(color: Color, text: &str) -> String {
    AnsiStyle::new().fg(color).paint(text).to_string()
}

fn bold(color: Color, text: &str) -> String {
    AnsiStyle::new().fg(color).bold().paint(text).to_string()
}

fn bullet() -> String {
    paint(EDGE_COLOR, "⋆")
}

fn rule() -> String {
    paint(EDGE_COLOR, "~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~")
}

fn section(title: &str) -> String {
    format!("\n{} {}", paint(EDGE_COLOR, "────"), bold(ACCENT_COLOR, title))
}

/// `filled` lit dots followed by unlit ones, `SPINNER_DOTS` in total.
fn dots(filled: usize) -> String {
    let lit = bold(DOT_ACTIVE_COLOR, &"●".repeat(filled));
    let unlit = paint(DOT_INACTIVE_COLOR, &"○".repeat(SPINNER_DOTS - filled));
    format!("{lit}{unlit}")
}

fn print_banner(export_path: &Path, timezone: ReportTimezone) {
    println!("{}", rule());
    println!("{} {}", bullet(), paint(ACCENT_COLOR, "chat-recap is warming up"));
    println!(
        "{} {}",
        bullet(),
        paint(DIM_COLOR, &format!("source {}", export_path.display()))
    );
    println!(
        "{} {}",
        bullet(),
        paint(DIM_COLOR, &format!("calendar in {timezone}"))
    );
    println!("{}", rule());
}

/// Run one pipeline stage behind a filling row of dots.
fn stage<F, T>(label: &str, action: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let running = Arc::new(AtomicBool::new(true));
    let label = format!("{} {}", bullet(), paint(ACCENT_COLOR, &format!("{label}...")));

    let handle = {
        let running = Arc::clone(&running);
        let label = label.clone();
        thread::spawn(move || {
            let mut tick = 0usize;
            while running.load(Ordering::Relaxed) {
                print!("\r{label} {}", dots(tick % SPINNER_DOTS + 1));
                let _ = io::stdout().flush();
                tick += 1;
                thread::sleep(Duration::from_millis(110));
            }
        })
    };

    let result = action();

    running.store(false, Ordering::Relaxed);
    let _ = handle.join();
    println!("\r{label} {}", dots(SPINNER_DOTS));
    io::stdout().flush()?;

    result
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if !cli.export.exists() {
        eprintln!("The provided path `{}` does not exist.", cli.export.display());
        return ExitCode::from(EXIT_NO_INPUT);
    }

    let timezone = match cli.tz.as_deref().map(str::parse::<ReportTimezone>).transpose() {
        Ok(timezone) => timezone,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(&cli, timezone) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RecapError>() {
        Some(RecapError::ExportNotFound { .. }) => EXIT_NO_INPUT,
        Some(recap_err) if recap_err.is_data_error() => EXIT_DATA,
        _ => 1,
    }
}

fn run(cli: &Cli, timezone: Option<ReportTimezone>) -> Result<()> {
    let mut config = load_config_or_default(cli.config.clone())?;
    if let Some(timezone) = timezone {
        config = config.with_timezone(timezone);
    }

    let recap = if cli.json {
        let messages = load_messages(&cli.export)?;
        build_recap(&messages, &config)
    } else {
        print_banner(&cli.export, config.timezone);
        let messages = stage("reading export", || Ok(load_messages(&cli.export)?))?;
        println!(
            "{} {}",
            bullet(),
            paint(DIM_COLOR, &format!("{} messages flattened", format_integer(messages.len())))
        );
        stage("crunching numbers", || Ok(build_recap(&messages, &config)))?
    };

    if let Some(dir) = &cli.output {
        write_outputs(dir, &recap)?;
    }

    if cli.json {
        println!("{}", recap.to_json_pretty()?);
    } else {
        print_recap(&recap);
        if let Some(dir) = &cli.output {
            println!(
                "\n{} {}",
                bullet(),
                paint(DIM_COLOR, &format!("wrote recap.json and metrics.json to {}", dir.display()))
            );
        }
        println!("{}", rule());
    }
    Ok(())
}

fn write_outputs(dir: &Path, recap: &Recap) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating `{}`", dir.display()))?;

    let recap_path = dir.join("recap.json");
    fs::write(&recap_path, recap.to_json_pretty()?)
        .with_context(|| format!("writing `{}`", recap_path.display()))?;

    let metrics_path = dir.join("metrics.json");
    fs::write(&metrics_path, serde_json::to_string_pretty(&recap.metrics)?)
        .with_context(|| format!("writing `{}`", metrics_path.display()))?;
    Ok(())
}

fn line(label: &str, text: &str) {
    println!(
        "{} {} {}",
        paint(EDGE_COLOR, "|"),
        paint(DIM_COLOR, &format!("{label:<24}")),
        bold(VALUE_SHADE, text)
    );
}

fn print_recap(recap: &Recap) {
    let ctx = &recap.context;

    println!("{}", section("the big picture"));
    line("first message", &ctx.first_date);
    line("last message", &ctx.last_date);
    line("conversations", &ctx.conversation_count);
    line("messages", &ctx.message_count);
    line("active days", &ctx.active_days);
    line("messages per active day", &ctx.avg_messages_per_active_day);

    println!("{}", section("rhythm"));
    line("longest streak", &format!("{} days", ctx.longest_streak_length));
    line("", &ctx.longest_streak_range);
    line("longest break", &format!("{} days", ctx.longest_gap_length));
    line("", &ctx.longest_gap_range);
    line(
        "busiest day",
        &format!("{} ({})", ctx.busiest_day_label, ctx.busiest_day_value),
    );
    line(
        "peak month",
        &format!("{} ({})", ctx.peak_month_label, ctx.peak_month_value),
    );
    line(
        "quiet month",
        &format!("{} ({})", ctx.quiet_month_label, ctx.quiet_month_value),
    );
    line(
        "peak hour",
        &format!("{} ({})", ctx.peak_hour_label, ctx.peak_hour_messages),
    );
    line(
        "peak weekday",
        &format!("{} ({})", ctx.peak_weekday_label, ctx.peak_weekday_messages),
    );
    line("day vs night", &ctx.daypart_split);
    line("night owl index", &ctx.night_share);
    line("weekend share", &ctx.weekend_share);

    println!("{}", section("conversations"));
    line("one-and-done", &ctx.one_share);
    line("short", &ctx.short_share);
    line("deep", &ctx.deep_share);
    line("with tools", &ctx.tool_share);
    line("with code", &ctx.code_share);
    line("with images or audio", &ctx.multimodal_share);
    line("median length", &ctx.median_conversation_length);
    line(
        "biggest thread",
        &format!("{} ({})", ctx.top_conversation_title, ctx.top_conversation_messages),
    );

    println!("{}", section("replies"));
    line("assistant share", &ctx.assistant_share);
    line("your share", &ctx.user_share);
    line(
        "wordiest month",
        &format!("{} ({} words)", ctx.assistant_peak_label, ctx.assistant_peak_words),
    );
    line(
        "tersest month",
        &format!("{} ({} words)", ctx.assistant_low_label, ctx.assistant_low_words),
    );
    line(
        "lately",
        &format!("{} words, {} chars", ctx.latest_word_avg, ctx.latest_char_avg),
    );

    println!("{}", section("leaderboards"));
    line(
        "top model",
        &format!(
            "{} ({}, {})",
            ctx.primary_model, ctx.primary_model_count, ctx.primary_model_percent
        ),
    );
    line(
        "runner-up",
        &format!(
            "{} ({}, {})",
            ctx.secondary_model, ctx.secondary_model_count, ctx.secondary_model_percent
        ),
    );
    line(
        "top tool",
        &format!("{} ({})", ctx.top_tool, ctx.top_tool_count),
    );
    for (name, count) in recap.metrics.tools.ranked.iter().skip(1).take(4) {
        line("", &format!("{} ({})", tool_label(name), format_integer(*count)));
    }
    for (rank, topic) in ctx.top_topics.iter().enumerate() {
        let label = if rank == 0 { "topics" } else { "" };
        line(label, &format!("{} ({})", topic.topic, topic.count));
    }
    if ctx.top_topics.is_empty() {
        line("topics", PLACEHOLDER);
    }
    if !ctx.word_cloud_terms.is_empty() {
        let words = ctx
            .word_cloud_terms
            .iter()
            .take(10)
            .map(|term| term.text.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        line("your words", &words);
    }

    println!(
        "{}",
        section(&format!(
            "badges {}/{}",
            ctx.achievement_count, ctx.total_achievements
        ))
    );
    if ctx.achievements.is_empty() {
        println!("{} {}", paint(EDGE_COLOR, "|"), paint(DIM_COLOR, "none yet, keep chatting"));
    }
    for badge in &ctx.achievements {
        println!(
            "{} {} {} {}",
            paint(EDGE_COLOR, "|"),
            badge.emoji,
            paint(ACCENT_COLOR, badge.name),
            paint(DIM_COLOR, &format!("· {}", badge.description))
        );
    }
}
