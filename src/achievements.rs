//! Badge catalog and evaluation.

use serde::Serialize;

use crate::aggregate::Aggregates;
use crate::leaderboard::IMAGE_TOOL;
use crate::streaks::StreakInfo;

/// Share of timed messages that must fall on Saturday or Sunday.
pub const WEEKEND_SHARE_THRESHOLD: f64 = 0.30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub emoji: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

/// Figures the badge predicates look at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AchievementInputs {
    pub total_messages: usize,
    pub conversations: usize,
    /// Messages from midnight up to 6am.
    pub night_messages: usize,
    /// Messages between 4am and 6am.
    pub early_messages: usize,
    pub longest_streak: usize,
    pub image_generations: usize,
    pub busiest_day_messages: usize,
    pub weekend_messages: usize,
    pub timed_messages: usize,
}

impl AchievementInputs {
    pub fn from_aggregates(aggregates: &Aggregates, streaks: &StreakInfo) -> Self {
        let hours = &aggregates.hour_counts;
        Self {
            total_messages: aggregates.message_count,
            conversations: aggregates.conversations.len(),
            night_messages: hours[0..6].iter().sum(),
            early_messages: hours[4] + hours[5],
            longest_streak: streaks.longest_streak_length,
            image_generations: aggregates.tool_counts.get(IMAGE_TOOL).copied().unwrap_or(0),
            busiest_day_messages: aggregates.daily_counts.values().copied().max().unwrap_or(0),
            weekend_messages: aggregates.weekend_messages(),
            timed_messages: aggregates.timed_messages(),
        }
    }

    fn messages_per_conversation(&self) -> f64 {
        if self.conversations == 0 {
            0.0
        } else {
            self.total_messages as f64 / self.conversations as f64
        }
    }

    pub fn weekend_share(&self) -> Option<f64> {
        (self.timed_messages > 0)
            .then(|| self.weekend_messages as f64 / self.timed_messages as f64)
    }
}

struct Badge {
    id: &'static str,
    emoji: &'static str,
    name: &'static str,
    description: &'static str,
    earned: fn(&AchievementInputs) -> bool,
}

const CATALOG: &[Badge] = &[
    Badge {
        id: "night_owl",
        emoji: "🦉",
        name: "Night Owl",
        description: "500+ messages after midnight",
        earned: |inputs| inputs.night_messages >= 500,
    },
    Badge {
        id: "early_bird",
        emoji: "🌅",
        name: "Early Bird",
        description: "200+ messages before 6am",
        earned: |inputs| inputs.early_messages >= 200,
    },
    Badge {
        id: "streak_master",
        emoji: "🔥",
        name: "Streak Master",
        description: "30+ day streak",
        earned: |inputs| inputs.longest_streak >= 30,
    },
    Badge {
        id: "power_user",
        emoji: "💪",
        name: "Power User",
        description: "10,000+ total messages",
        earned: |inputs| inputs.total_messages >= 10_000,
    },
    Badge {
        id: "creative_soul",
        emoji: "🎨",
        name: "Creative Soul",
        description: "50+ DALL·E images",
        earned: |inputs| inputs.image_generations >= 50,
    },
    Badge {
        id: "deep_thinker",
        emoji: "📚",
        name: "Deep Thinker",
        description: "Avg 50+ messages per chat",
        earned: |inputs| inputs.messages_per_conversation() >= 50.0,
    },
    Badge {
        id: "speed_demon",
        emoji: "⚡",
        name: "Speed Demon",
        description: "100+ messages in a single day",
        earned: |inputs| inputs.busiest_day_messages >= 100,
    },
    Badge {
        id: "weekend_warrior",
        emoji: "🌍",
        name: "Weekend Warrior",
        description: "30%+ activity on weekends",
        earned: |inputs| {
            inputs
                .weekend_share()
                .is_some_and(|share| share >= WEEKEND_SHARE_THRESHOLD)
        },
    },
];

/// Every badge in catalog order, each marked earned or not.
pub fn evaluate_achievements(inputs: &AchievementInputs) -> Vec<Achievement> {
    CATALOG
        .iter()
        .map(|badge| Achievement {
            id: badge.id,
            emoji: badge.emoji,
            name: badge.name,
            description: badge.description,
            earned: (badge.earned)(inputs),
        })
        .collect()
}

pub fn catalog_size() -> usize {
    CATALOG.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earned_ids(inputs: &AchievementInputs) -> Vec<&'static str> {
        evaluate_achievements(inputs)
            .into_iter()
            .filter(|badge| badge.earned)
            .map(|badge| badge.id)
            .collect()
    }

    #[test]
    fn nothing_is_earned_by_default() {
        let inputs = AchievementInputs::default();
        assert!(earned_ids(&inputs).is_empty());
        assert_eq!(evaluate_achievements(&inputs).len(), catalog_size());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let inputs = AchievementInputs {
            total_messages: 10_000,
            conversations: 200,
            night_messages: 500,
            early_messages: 199,
            longest_streak: 30,
            image_generations: 50,
            busiest_day_messages: 100,
            weekend_messages: 0,
            timed_messages: 10_000,
        };
        assert_eq!(
            earned_ids(&inputs),
            vec![
                "night_owl",
                "streak_master",
                "power_user",
                "creative_soul",
                "deep_thinker",
                "speed_demon"
            ]
        );
    }

    #[test]
    fn weekend_warrior_needs_real_weekend_activity() {
        let mut inputs = AchievementInputs {
            weekend_messages: 29,
            timed_messages: 100,
            ..Default::default()
        };
        assert!(!earned_ids(&inputs).contains(&"weekend_warrior"));
        inputs.weekend_messages = 30;
        assert_eq!(earned_ids(&inputs), vec!["weekend_warrior"]);
    }
}
