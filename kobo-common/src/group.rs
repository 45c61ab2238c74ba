//! Partitioning of the chronological highlight stream into books and days.

use crate::library::Annotation;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

/// The new highlights of one book, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookGroup {
    pub volume_id: String,
    pub annotations: Vec<Annotation>,
}

impl BookGroup {
    pub fn days(&self) -> Vec<DayBucket<'_>> {
        group_by_day(&self.annotations)
    }
}

/// A run of consecutive highlights created on the same calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub annotations: Vec<&'a Annotation>,
}

/// Stable partition of `annotations` by owning volume.
///
/// Groups come out in order of the first highlight of each volume and keep
/// the input order inside each group.
pub fn group_by_book(annotations: Vec<Annotation>) -> Vec<BookGroup> {
    let mut groups: Vec<BookGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for annotation in annotations {
        match positions.get(&annotation.volume_id) {
            Some(&position) => groups[position].annotations.push(annotation),
            None => {
                positions.insert(annotation.volume_id.clone(), groups.len());
                groups.push(BookGroup {
                    volume_id: annotation.volume_id.clone(),
                    annotations: vec![annotation],
                });
            }
        }
    }

    groups
}

/// Splits chronologically ordered `annotations` into runs sharing a creation
/// date, in one pass.
pub fn group_by_day(annotations: &[Annotation]) -> Vec<DayBucket<'_>> {
    let runs = annotations.iter().chunk_by(|a| a.created_at.date());

    let buckets = runs
        .into_iter()
        .map(|(date, run)| DayBucket {
            date,
            annotations: run.collect(),
        })
        .collect();

    buckets
}
