//! Vote tallies for a single question.
//!
//! The database does the grouping; everything here works on the grouped rows so
//! the arithmetic can be tested without a pool.

use serde::{Deserialize, Serialize};

use crate::models::{OptionCount, SliceCount};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionStat {
    pub option_index: i64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceStat {
    pub value: Option<String>,
    pub option_index: i64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceDimension {
    Education,
    AgeRange,
    Region,
}

impl SliceDimension {
    /// Column in `answers` holding this dimension. Only ever a fixed name, so it
    /// is safe to splice into SQL.
    pub fn column(self) -> &'static str {
        match self {
            SliceDimension::Education => "education",
            SliceDimension::AgeRange => "age_range",
            SliceDimension::Region => "region",
        }
    }
}

pub fn percentage(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Expands grouped counts into one entry per option, zero counts included.
///
/// Indices beyond `option_count` (left behind when an admin shortens the option
/// list) are still reported so the counts always add up to the total.
pub fn tally_options(option_count: usize, grouped: &[OptionCount]) -> Vec<OptionStat> {
    let highest_seen = grouped
        .iter()
        .map(|row| row.option_index + 1)
        .max()
        .unwrap_or(0)
        .max(0) as usize;
    let len = option_count.max(highest_seen);
    let total: i64 = grouped.iter().map(|row| row.count).sum();

    let mut counts = vec![0_i64; len];
    for row in grouped {
        if row.option_index >= 0 {
            counts[row.option_index as usize] += row.count;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| OptionStat {
            option_index: index as i64,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Percentages in a slice are relative to every answer on the question, not to
/// the slice group.
pub fn tally_slices(total: i64, grouped: Vec<SliceCount>) -> Vec<SliceStat> {
    grouped
        .into_iter()
        .map(|row| SliceStat {
            percentage: percentage(row.count, total),
            value: row.value,
            option_index: row.option_index,
            count: row.count,
        })
        .collect()
}

pub fn total_answers(stats: &[OptionStat]) -> i64 {
    stats.iter().map(|stat| stat.count).sum()
}
