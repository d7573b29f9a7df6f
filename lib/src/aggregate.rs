//! Grouped statistics, cross tabulations and value counts.
use crate::{
    derive::DerivedRequest,
    feature::{Category, Feature, Label},
    indicator::Indicator,
    table::{Counts, Crosstab, GroupStatsRow, GroupStatsTable},
    util::percentage,
};
use statrs::statistics::{Data, Median, Statistics};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Summary statistics of `feature` for each value of `group_key`.
///
/// Rows without a `group_key` are skipped. Within a group, rows where `feature` is missing are
/// left out of the mean, median, standard deviation and count, but are still in the approval
/// rate's denominator. Groups come out by mean descending; groups with equal means (or no
/// values at all) keep the order they were first seen in.
pub fn group_stats(
    rows: &[DerivedRequest],
    group_key: Category,
    feature: Feature,
    approval: Indicator,
) -> GroupStatsTable {
    struct Group {
        label: Label,
        values: Vec<f64>,
        requests: usize,
        approved: usize,
    }

    let mut idx: HashMap<Label, usize> = HashMap::new();
    let mut groups: Vec<Group> = vec![];
    for row in rows {
        let label = match group_key.label(row) {
            Some(label) => label,
            None => continue,
        };
        let i = *idx.entry(label.clone()).or_insert_with(|| {
            groups.push(Group {
                label,
                values: vec![],
                requests: 0,
                approved: 0,
            });
            groups.len() - 1
        });
        let group = &mut groups[i];
        group.requests += 1;
        if row.has(approval) {
            group.approved += 1;
        }
        if let Some(value) = feature.value(row) {
            group.values.push(value);
        }
    }

    let mut rows: Vec<GroupStatsRow> = groups
        .into_iter()
        .map(|group| {
            let count = group.values.len();
            let (mean, median, std_dev) = if group.values.is_empty() {
                (None, None, None)
            } else {
                let mean = group.values.iter().mean();
                let std_dev = group.values.iter().std_dev();
                let median = Data::new(group.values).median();
                (Some(mean), Some(median), Some(std_dev))
            };
            GroupStatsRow {
                label: group.label,
                mean,
                median,
                std_dev,
                count,
                requests: group.requests,
                approval_rate: percentage(group.approved, group.requests),
            }
        })
        .collect();
    // `None` sorts below any value, so empty groups go last.
    rows.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    GroupStatsTable {
        group_key,
        feature,
        rows,
    }
}

/// For each `row_key` value, the percentage of its rows in each `col_key` value.
///
/// Rows missing either key are skipped. Labels are sorted; combinations with no rows are `0.`.
pub fn crosstab(rows: &[DerivedRequest], row_key: Category, col_key: Category) -> Crosstab {
    // B Tree so we get a predictable ordering.
    let mut counts: BTreeMap<Label, BTreeMap<Label, usize>> = BTreeMap::new();
    let mut columns: BTreeSet<Label> = BTreeSet::new();
    for row in rows {
        let (r, c) = match (row_key.label(row), col_key.label(row)) {
            (Some(r), Some(c)) => (r, c),
            _ => continue,
        };
        columns.insert(c.clone());
        *counts.entry(r).or_default().entry(c).or_insert(0) += 1;
    }

    let columns: Vec<Label> = columns.into_iter().collect();
    let mut out_rows = Vec::with_capacity(counts.len());
    let mut percentages = Vec::with_capacity(counts.len());
    for (label, row_counts) in counts {
        let total: usize = row_counts.values().sum();
        percentages.push(
            columns
                .iter()
                .map(|col| percentage(row_counts.get(col).copied().unwrap_or(0), total))
                .collect(),
        );
        out_rows.push(label);
    }

    Crosstab {
        row_key,
        col_key,
        rows: out_rows,
        columns,
        percentages,
    }
}

/// How often each value of `field` occurs, most frequent first. Missing values are not counted.
pub fn value_counts(rows: &[DerivedRequest], field: Category) -> Counts {
    Counts::tally(rows.iter().filter_map(|row| field.label(row)))
}
