//! Longest run of consecutive active days and longest silence between them.

use chrono::NaiveDate;
use serde::Serialize;

/// A closed range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreakInfo {
    pub longest_streak_length: usize,
    pub longest_streak: Option<DayRange>,
    pub longest_gap_length: usize,
    pub longest_gap: Option<DayRange>,
    pub first_date: Option<NaiveDate>,
}

/// Scan the active days for the longest streak and the longest gap.
///
/// The earliest streak wins among equally long ones, and likewise for gaps.
pub fn compute_streaks(active_days: &[NaiveDate]) -> StreakInfo {
    let mut sorted = active_days.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let Some(&first) = sorted.first() else {
        return StreakInfo::default();
    };

    let mut best = DayRange {
        start: first,
        end: first,
    };
    let mut best_len = 1usize;
    let mut current_start = first;
    let mut current_len = 1usize;

    let mut gap_len = 0usize;
    let mut gap: Option<DayRange> = None;

    for pair in sorted.windows(2) {
        let (prev, date) = (pair[0], pair[1]);
        let between = (date - prev).num_days();

        if between == 1 {
            current_len += 1;
        } else {
            if current_len > best_len {
                best_len = current_len;
                best = DayRange {
                    start: current_start,
                    end: prev,
                };
            }
            current_len = 1;
            current_start = date;
        }

        let missing = (between - 1).max(0) as usize;
        if missing > gap_len {
            gap_len = missing;
            gap = prev.succ_opt().zip(date.pred_opt()).map(|(start, end)| DayRange { start, end });
        }
    }

    if current_len > best_len {
        best_len = current_len;
        best = DayRange {
            start: current_start,
            end: *sorted.last().unwrap_or(&first),
        };
    }

    StreakInfo {
        longest_streak_length: best_len,
        longest_streak: Some(best),
        longest_gap_length: gap_len,
        longest_gap: gap,
        first_date: Some(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    #[test]
    fn no_active_days() {
        let info = compute_streaks(&[]);
        assert_eq!(info.longest_streak_length, 0);
        assert!(info.longest_streak.is_none());
        assert!(info.longest_gap.is_none());
        assert!(info.first_date.is_none());
    }

    #[test]
    fn streak_and_gap_law() {
        let info = compute_streaks(&[day(10), day(0), day(1), day(2)]);
        assert_eq!(info.longest_streak_length, 3);
        assert_eq!(
            info.longest_streak,
            Some(DayRange {
                start: day(0),
                end: day(2)
            })
        );
        assert_eq!(info.longest_gap_length, 7);
        assert_eq!(
            info.longest_gap,
            Some(DayRange {
                start: day(3),
                end: day(9)
            })
        );
        assert_eq!(info.longest_gap.map(|gap| gap.days()), Some(7));
        assert_eq!(info.first_date, Some(day(0)));
    }

    #[test]
    fn equal_streaks_keep_the_earliest() {
        let info = compute_streaks(&[day(0), day(1), day(5), day(6), day(9), day(10)]);
        assert_eq!(info.longest_streak_length, 2);
        assert_eq!(info.longest_streak.map(|s| s.start), Some(day(0)));
        assert_eq!(info.longest_gap_length, 3);
        assert_eq!(info.longest_gap.map(|g| g.start), Some(day(2)));
    }

    #[test]
    fn equal_gaps_keep_the_earliest() {
        let info = compute_streaks(&[day(0), day(3), day(6)]);
        assert_eq!(info.longest_gap_length, 2);
        assert_eq!(
            info.longest_gap,
            Some(DayRange {
                start: day(1),
                end: day(2)
            })
        );
        assert_eq!(info.longest_streak_length, 1);
        assert_eq!(info.longest_streak.map(|s| s.start), Some(day(0)));
    }

    #[test]
    fn trailing_streak_is_counted() {
        let info = compute_streaks(&[day(0), day(4), day(5), day(6), day(7)]);
        assert_eq!(info.longest_streak_length, 4);
        assert_eq!(
            info.longest_streak,
            Some(DayRange {
                start: day(4),
                end: day(7)
            })
        );
    }

    #[test]
    fn single_day_has_no_gap() {
        let info = compute_streaks(&[day(3)]);
        assert_eq!(info.longest_streak_length, 1);
        assert!(info.longest_streak.unwrap().is_single_day());
        assert_eq!(info.longest_gap_length, 0);
        assert!(info.longest_gap.is_none());
    }
}
