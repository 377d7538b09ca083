//! Average cycle length per calendar month.
//!
//! A cycle is the whole number of days between two consecutive period
//! starts. Each gap is credited to the month of the later start, and
//! gaps from different years land in the same month bucket.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAverage {
    pub month: &'static str,
    pub avg_cycle_length: i64,
}

/// Raw day gaps for one month, before averaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleLengthSample {
    pub month: &'static str,
    pub gaps: Vec<i64>,
}

/// Groups the gaps between consecutive starts by the later start's month,
/// in Jan..Dec order. `starts` must already be sorted ascending.
pub fn samples_by_month(starts: &[NaiveDateTime]) -> Vec<CycleLengthSample> {
    let mut by_month = BTreeMap::<u32, Vec<i64>>::new();

    for pair in starts.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let gap = (curr - prev).num_days();
        by_month.entry(curr.month0()).or_default().push(gap);
    }

    by_month
        .into_iter()
        .map(|(month0, gaps)| CycleLengthSample {
            month: MONTHS[month0 as usize],
            gaps,
        })
        .collect()
}

/// Monthly mean cycle length, months without data omitted.
///
/// Fewer than two starts produce an empty list.
pub fn monthly_averages(starts: &[NaiveDateTime]) -> Vec<MonthlyAverage> {
    samples_by_month(starts)
        .into_iter()
        .filter_map(|sample| {
            mean_half_even(&sample.gaps).map(|avg_cycle_length| MonthlyAverage {
                month: sample.month,
                avg_cycle_length,
            })
        })
        .collect()
}

/// Integer mean with ties rounded to the even neighbour (27.5 -> 28, 28.5 -> 28).
pub fn mean_half_even(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as i64;
    let sum: i64 = values.iter().sum();
    let quotient = sum.div_euclid(n);
    let twice_rem = 2 * sum.rem_euclid(n);

    let rounded = match twice_rem.cmp(&n) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 0 => quotient,
        std::cmp::Ordering::Equal => quotient + 1,
    };
    Some(rounded)
}
