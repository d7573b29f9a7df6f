//! The output tables of the pipeline.
//!
//! These are plain data: ordered rows, named columns, numbers and labels. Each can render itself
//! as a terminal table, or be serialized for anything else that wants to draw it.
use crate::{
    feature::{Category, Feature, Label},
    util::{fmt_stat, percentage},
};
use serde::Serialize;
use std::collections::HashMap;
use term_data_table::{Cell, Row, Table};

/// A label and how many times it was seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: Label,
    pub count: usize,
}

/// Frequencies, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counts {
    pub rows: Vec<LabelCount>,
}

impl Counts {
    /// Count labels, ordering by count descending. Ties keep the order labels were first seen.
    pub fn tally(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut rows: Vec<LabelCount> = vec![];
        let mut idx: HashMap<Label, usize> = HashMap::new();
        for label in labels {
            match idx.get(&label) {
                Some(&i) => rows[i].count += 1,
                None => {
                    idx.insert(label.clone(), rows.len());
                    rows.push(LabelCount { label, count: 1 });
                }
            }
        }
        // stable, so first-seen order breaks ties.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Counts { rows }
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|row| row.count).sum()
    }

    pub fn get(&self, label: &Label) -> Option<usize> {
        self.rows
            .iter()
            .find(|row| &row.label == label)
            .map(|row| row.count)
    }

    /// Keep only the first `k` rows.
    pub fn truncate(mut self, k: usize) -> Self {
        self.rows.truncate(k);
        self
    }

    /// Reorder by label instead of by count.
    pub fn sorted_by_label(mut self) -> Self {
        self.rows.sort_by(|a, b| a.label.cmp(&b.label));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn term_table(&self, label_header: &str) -> Table<'_> {
        let total = self.total();
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from(label_header.to_string()))
                .with_cell(Cell::from("Count"))
                .with_cell(Cell::from("Percentage")),
        );
        for row in &self.rows {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(row.label.to_string()))
                    .with_cell(Cell::from(row.count.to_string()))
                    .with_cell(Cell::from(format!(
                        "{:.1}%",
                        percentage(row.count, total)
                    ))),
            );
        }
        table
    }
}

/// Summary statistics of one group.
///
/// The statistics are `None` when no row in the group has the feature. `std_dev` is NaN for a
/// group with a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatsRow {
    pub label: Label,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    /// Rows in the group where the feature is present.
    pub count: usize,
    /// All rows in the group.
    pub requests: usize,
    /// Percentage of all rows in the group that pass the approval indicator.
    pub approval_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatsTable {
    pub group_key: Category,
    pub feature: Feature,
    /// By mean, highest first.
    pub rows: Vec<GroupStatsRow>,
}

impl GroupStatsTable {
    pub fn get(&self, label: &Label) -> Option<&GroupStatsRow> {
        self.rows.iter().find(|row| &row.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn term_table(&self) -> Table<'_> {
        let opt = |v: Option<f64>| v.map(fmt_stat).unwrap_or_else(|| "-".to_string());
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from(self.group_key.to_string()))
                .with_cell(Cell::from("Mean"))
                .with_cell(Cell::from("Median"))
                .with_cell(Cell::from("Std. dev."))
                .with_cell(Cell::from("Count"))
                .with_cell(Cell::from("Requests"))
                .with_cell(Cell::from("Approval rate")),
        );
        for row in &self.rows {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(row.label.to_string()))
                    .with_cell(Cell::from(opt(row.mean)))
                    .with_cell(Cell::from(opt(row.median)))
                    .with_cell(Cell::from(opt(row.std_dev)))
                    .with_cell(Cell::from(row.count.to_string()))
                    .with_cell(Cell::from(row.requests.to_string()))
                    .with_cell(Cell::from(format!("{:.1}%", row.approval_rate))),
            );
        }
        table
    }
}

/// Row-normalized contingency table. Each row's percentages sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crosstab {
    pub row_key: Category,
    pub col_key: Category,
    pub rows: Vec<Label>,
    pub columns: Vec<Label>,
    /// `percentages[row][column]`.
    pub percentages: Vec<Vec<f64>>,
}

impl Crosstab {
    pub fn get(&self, row: &Label, column: &Label) -> Option<f64> {
        let r = self.rows.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        Some(self.percentages[r][c])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn term_table(&self) -> Table<'_> {
        let mut header = Row::new().with_cell(Cell::from(format!(
            "{} \\ {}",
            self.row_key, self.col_key
        )));
        for column in &self.columns {
            header = header.with_cell(Cell::from(column.to_string()));
        }
        let mut table = Table::new().with_row(header);
        for (label, pcts) in self.rows.iter().zip(&self.percentages) {
            let mut row = Row::new().with_cell(Cell::from(label.to_string()));
            for pct in pcts {
                row = row.with_cell(Cell::from(format!("{:.1}%", pct)));
            }
            table.add_row(row);
        }
        table
    }
}

/// Pairwise correlation between features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub features: Vec<Feature>,
    /// Symmetric, `values[i][j]` is the correlation of `features[i]` and `features[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Feature, b: Feature) -> Option<f64> {
        let i = self.features.iter().position(|f| *f == a)?;
        let j = self.features.iter().position(|f| *f == b)?;
        Some(self.values[i][j])
    }

    pub fn term_table(&self) -> Table<'_> {
        let mut header = Row::new().with_cell(Cell::from(""));
        for feature in &self.features {
            header = header.with_cell(Cell::from(feature.name()));
        }
        let mut table = Table::new().with_row(header);
        for (feature, values) in self.features.iter().zip(&self.values) {
            let mut row = Row::new().with_cell(Cell::from(feature.name()));
            for value in values {
                row = row.with_cell(Cell::from(fmt_stat(*value)));
            }
            table.add_row(row);
        }
        table
    }
}

/// Correlation of each feature with one target feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationVector {
    pub target: Feature,
    pub entries: Vec<(Feature, f64)>,
}

impl CorrelationVector {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.entries
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, v)| *v)
    }

    pub fn term_table(&self) -> Table<'_> {
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from("Feature"))
                .with_cell(Cell::from(format!("Correlation with {}", self.target))),
        );
        for (feature, value) in &self.entries {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(feature.name()))
                    .with_cell(Cell::from(fmt_stat(*value))),
            );
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correlation {
    Matrix(CorrelationMatrix),
    Vector(CorrelationVector),
}

impl Correlation {
    pub fn as_matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            Correlation::Matrix(m) => Some(m),
            Correlation::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&CorrelationVector> {
        match self {
            Correlation::Vector(v) => Some(v),
            Correlation::Matrix(_) => None,
        }
    }

    pub fn term_table(&self) -> Table<'_> {
        match self {
            Correlation::Matrix(m) => m.term_table(),
            Correlation::Vector(v) => v.term_table(),
        }
    }
}
