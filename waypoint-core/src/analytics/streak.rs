//! Consecutive-day streaks over daily action dates.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Length of the unbroken run of days ending at `today`.
///
/// Duplicates collapse, dates after `today` are ignored, and the walk stops
/// at the first missing day. No action today means a streak of 0, however
/// long the run that ended yesterday.
pub fn compute_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let unique: BTreeSet<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();

    let mut streak = 0;
    let mut cursor = today;
    for date in unique.iter().rev() {
        if *date != cursor {
            break;
        }
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

/// Streak statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakStats {
    /// Current streak (consecutive days with activity ending today)
    pub current_streak_days: u32,
    /// Longest streak anywhere in the history up to today
    pub longest_streak_days: u32,
    /// When the longest streak started
    pub longest_streak_start: Option<NaiveDate>,
    /// When the longest streak ended
    pub longest_streak_end: Option<NaiveDate>,
    /// Distinct days with activity
    pub active_days: usize,
    /// Most recent day with activity
    pub last_active: Option<NaiveDate>,
}

impl StreakStats {
    /// Compute current and longest streaks in one pass over the distinct dates.
    pub fn from_dates(dates: &[NaiveDate], today: NaiveDate) -> Self {
        let unique: BTreeSet<NaiveDate> =
            dates.iter().copied().filter(|d| *d <= today).collect();

        let mut stats = StreakStats {
            current_streak_days: compute_streak(dates, today),
            active_days: unique.len(),
            last_active: unique.iter().next_back().copied(),
            ..Default::default()
        };

        let mut run_start: Option<NaiveDate> = None;
        let mut prev: Option<NaiveDate> = None;
        let mut run_len = 0u32;
        for &date in &unique {
            let continues = prev.and_then(|p| p.succ_opt()) == Some(date);
            if continues {
                run_len += 1;
            } else {
                run_start = Some(date);
                run_len = 1;
            }
            if run_len > stats.longest_streak_days {
                stats.longest_streak_days = run_len;
                stats.longest_streak_start = run_start;
                stats.longest_streak_end = Some(date);
            }
            prev = Some(date);
        }

        stats
    }
}
