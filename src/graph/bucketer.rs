//! Time bucketing of the date-sorted work set.

use crate::corpus::store::Work;
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Calendar resolution for grouping works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeResolution {
    Year,
    Month,
}

impl FromStr for TimeResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(TimeResolution::Year),
            "month" => Ok(TimeResolution::Month),
            other => Err(format!("unknown time resolution: {}", other)),
        }
    }
}

impl fmt::Display for TimeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeResolution::Year => write!(f, "year"),
            TimeResolution::Month => write!(f, "month"),
        }
    }
}

/// A contiguous run of works sharing one calendar period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    /// Date of the first work assigned to the bucket.
    pub date: NaiveDate,
    /// Member work indices in encounter order.
    pub works: Vec<usize>,
}

impl TimeBucket {
    /// Period label used in graph file names: `"2001"` or `"2001-06"`.
    pub fn label(&self, resolution: TimeResolution) -> String {
        match resolution {
            TimeResolution::Year => format!("{:04}", self.date.year()),
            TimeResolution::Month => format!("{:04}-{:02}", self.date.year(), self.date.month()),
        }
    }
}

fn same_period(a: NaiveDate, b: NaiveDate, resolution: TimeResolution) -> bool {
    match resolution {
        TimeResolution::Year => a.year() == b.year(),
        // month resolution keys on year AND month, so January 2001 and
        // January 2002 land in different buckets
        TimeResolution::Month => a.year() == b.year() && a.month() == b.month(),
    }
}

/// Partitions `works` into contiguous calendar buckets.
///
/// Caller invariant: `works` is already sorted ascending by publication
/// date. This is not checked here; unsorted input silently produces
/// non-contiguous groups. Buckets come out in chronological order, empty
/// periods simply produce no bucket, and no work lands in two buckets.
pub fn group_by_time(works: &[Work], resolution: TimeResolution) -> Vec<TimeBucket> {
    let mut buckets: Vec<TimeBucket> = Vec::new();
    for (idx, work) in works.iter().enumerate() {
        match buckets.last_mut() {
            Some(bucket) if same_period(bucket.date, work.publication_date, resolution) => {
                bucket.works.push(idx);
            }
            _ => buckets.push(TimeBucket {
                date: work.publication_date,
                works: vec![idx],
            }),
        }
    }
    buckets
}
