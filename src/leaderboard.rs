//! Model, tool and topic rankings.

use indexmap::IndexMap;
use serde::Serialize;

use crate::words::title_keywords;

/// Tool name the image generator reports under.
pub const IMAGE_TOOL: &str = "dalle.text2im";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelUsage {
    pub slug: String,
    pub label: String,
    pub count: usize,
    /// Whole-number share of all messages.
    pub percent: u32,
}

/// Rank models by message count, highest first; ties keep first-seen order.
pub fn rank_models(model_counts: &IndexMap<String, usize>, total_messages: usize) -> Vec<ModelUsage> {
    let mut ranked: Vec<ModelUsage> = model_counts
        .iter()
        .map(|(slug, &count)| ModelUsage {
            slug: slug.clone(),
            label: model_label(slug),
            count,
            percent: whole_percent(count, total_messages),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// `gpt-4o` reads as `GPT-4o`, `gpt-3.5_turbo` as `GPT-3.5 Turbo`.
pub fn model_label(slug: &str) -> String {
    slug.replacen("gpt-", "GPT-", 1)
        .replacen('_', " ", 1)
        .replacen("turbo", "Turbo", 1)
}

fn whole_percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolUsage {
    /// Tools ranked by call count, highest first.
    pub ranked: Vec<(String, usize)>,
    pub image_generations: usize,
    /// Summed over every tool whose name mentions `browser`.
    pub browser_calls: usize,
}

impl ToolUsage {
    pub fn tools_used(&self) -> usize {
        self.ranked.len()
    }

    pub fn top(&self) -> Option<(&str, usize)> {
        self.ranked
            .first()
            .map(|(name, count)| (name.as_str(), *count))
    }
}

pub fn rank_tools(tool_counts: &IndexMap<String, usize>) -> ToolUsage {
    let image_generations = tool_counts.get(IMAGE_TOOL).copied().unwrap_or(0);
    let browser_calls = tool_counts
        .iter()
        .filter(|(name, _)| name.contains("browser"))
        .map(|(_, count)| count)
        .sum();

    let mut ranked: Vec<(String, usize)> = tool_counts
        .iter()
        .map(|(name, &count)| (name.clone(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ToolUsage {
        ranked,
        image_generations,
        browser_calls,
    }
}

pub fn tool_label(name: &str) -> String {
    name.replacen(IMAGE_TOOL, "DALL·E", 1)
        .replacen("browser", "Web Browser", 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub topic: String,
    pub count: usize,
}

/// Most frequent title keywords across conversations, first letter capitalised.
pub fn rank_topics<'a>(titles: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<Topic> {
    let mut keywords: IndexMap<String, usize> = IndexMap::new();
    for title in titles {
        for word in title_keywords(title) {
            *keywords.entry(word).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = keywords.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
        .into_iter()
        .map(|(word, count)| Topic {
            topic: capitalize(&word),
            count,
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
