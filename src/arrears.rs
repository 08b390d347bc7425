//! Group and line views over open receivables.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::gateway::ReceivableRow;

/// Arrears table layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewMode {
    /// Consolidated by debtor group
    #[default]
    #[value(name = "group")]
    Grouped,
    /// One line per invoice
    #[value(name = "line")]
    Flat,
}

/// Debt of one debtor group summed over its invoices
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupSummary {
    pub display_name: String,
    pub city: String,
    pub count: usize,
    pub bucket_1_30: f64,
    pub bucket_31_60: f64,
    pub bucket_61_90: f64,
    pub bucket_90_120: f64,
    pub bucket_120_plus: f64,
    pub total: f64,
}

impl GroupSummary {
    fn open(key: &str, first: &ReceivableRow) -> Self {
        Self {
            display_name: key.to_string(),
            city: first.city.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    fn absorb(&mut self, row: &ReceivableRow) {
        self.bucket_1_30 += row.bucket_1_30;
        self.bucket_31_60 += row.bucket_31_60;
        self.bucket_61_90 += row.bucket_61_90;
        self.bucket_90_120 += row.bucket_90_120;
        self.bucket_120_plus += row.bucket_120_plus;
        self.total += row.total;
        self.count += 1;
    }

    /// Debt older than 90 days
    pub fn risk_amount(&self) -> f64 {
        self.bucket_90_120 + self.bucket_120_plus
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrearsView {
    Groups(Vec<GroupSummary>),
    Lines(Vec<ReceivableRow>),
}

impl ArrearsView {
    pub fn len(&self) -> usize {
        match self {
            ArrearsView::Groups(groups) => groups.len(),
            ArrearsView::Lines(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> ViewMode {
        match self {
            ArrearsView::Groups(_) => ViewMode::Grouped,
            ArrearsView::Lines(_) => ViewMode::Flat,
        }
    }
}

/// Consolidate rows by group key, largest total first.
///
/// Groups are created on first sight, so equal totals keep first-seen order.
pub fn group_rows(rows: &[ReceivableRow]) -> Vec<GroupSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupSummary> = Vec::new();

    for row in rows {
        let key = row.group_key();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(GroupSummary::open(key, row));
            groups.len() - 1
        });
        groups[slot].absorb(row);
    }

    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups
}

pub fn aggregate(rows: &[ReceivableRow], mode: ViewMode) -> ArrearsView {
    match mode {
        ViewMode::Flat => ArrearsView::Lines(rows.to_vec()),
        ViewMode::Grouped => ArrearsView::Groups(group_rows(rows)),
    }
}

/// Arrears table state: rows, view toggle, and the view derived from both.
///
/// The view is recomputed only when the rows or the mode actually change.
/// The receivables command opens it grouped and switches with `set_mode`.
#[derive(Debug, Clone)]
pub struct ArrearsTable {
    rows: Vec<ReceivableRow>,
    mode: ViewMode,
    view: ArrearsView,
}

impl ArrearsTable {
    pub fn new(rows: Vec<ReceivableRow>, mode: ViewMode) -> Self {
        let view = aggregate(&rows, mode);
        Self { rows, mode, view }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn rows(&self) -> &[ReceivableRow] {
        &self.rows
    }

    pub fn view(&self) -> &ArrearsView {
        &self.view
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if mode != self.mode {
            self.mode = mode;
            self.view = aggregate(&self.rows, mode);
        }
    }

    pub fn toggle(&mut self) {
        let next = match self.mode {
            ViewMode::Grouped => ViewMode::Flat,
            ViewMode::Flat => ViewMode::Grouped,
        };
        self.set_mode(next);
    }

    pub fn set_rows(&mut self, rows: Vec<ReceivableRow>) {
        if rows != self.rows {
            self.rows = rows;
            self.view = aggregate(&self.rows, self.mode);
        }
    }
}

/// Write a view as CSV; the header row comes from the first record
pub fn write_csv<W: io::Write>(view: &ArrearsView, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    match view {
        ArrearsView::Groups(groups) => {
            for group in groups {
                wtr.serialize(group)?;
            }
        }
        ArrearsView::Lines(rows) => {
            for row in rows {
                wtr.serialize(row)?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(view: &ArrearsView, path: &Path) -> Result<()> {
    write_csv(view, File::create(path)?)?;
    info!(path = %path.display(), records = view.len(), "exported arrears view");
    Ok(())
}
