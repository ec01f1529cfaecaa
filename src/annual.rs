//! Annual consumption per item, averaged over effective months.
//!
//! An effective month is a calendar month whose summed quantity is strictly
//! positive; averages divide by the number of effective months instead of 12.

use crate::table::PivotTable;
use crate::types::{AnnualSummaryRow, ConsumptionRecord, OverallMeanRow};
use crate::util::{average, ratio};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Running totals for one group, bucketed by calendar month.
#[derive(Debug, Clone, Default)]
pub(crate) struct MonthlyAcc {
    by_month: BTreeMap<u32, f64>,
}

impl MonthlyAcc {
    pub(crate) fn add(&mut self, month: u32, quantity: f64) {
        *self.by_month.entry(month).or_insert(0.0) += quantity;
    }

    pub(crate) fn total(&self) -> f64 {
        self.by_month.values().sum()
    }

    pub(crate) fn months_with_consumption(&self) -> usize {
        self.by_month.values().filter(|q| **q > 0.0).count()
    }

    /// Total over effective months, 0 when there are none.
    pub(crate) fn avg_monthly(&self) -> f64 {
        ratio(self.total(), self.months_with_consumption())
    }
}

/// Group by (item code, item description, year), sorted ascending.
pub fn aggregate_annual(subset: &[ConsumptionRecord]) -> Vec<AnnualSummaryRow> {
    let mut groups: BTreeMap<(String, String, i32), MonthlyAcc> = BTreeMap::new();
    for r in subset {
        groups
            .entry((r.item_code.clone(), r.item_description.clone(), r.year))
            .or_default()
            .add(r.month_number, r.quantity);
    }
    let rows: Vec<AnnualSummaryRow> = groups
        .into_iter()
        .map(|((item_code, item_description, year), acc)| AnnualSummaryRow {
            item_code,
            item_description,
            year,
            total_annual_quantity: acc.total(),
            months_with_consumption: acc.months_with_consumption(),
            avg_monthly_quantity: acc.avg_monthly(),
        })
        .collect();
    debug!(rows = rows.len(), "annual summary computed");
    rows
}

/// Which annual figure fills the cells of [`annual_pivot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnualMetric {
    Total,
    MonthlyAverage,
}

/// Items by year. Columns cover every selected year plus any year present
/// in `rows`; missing combinations are 0.
pub fn annual_pivot(
    rows: &[AnnualSummaryRow],
    years: &BTreeSet<i32>,
    metric: AnnualMetric,
) -> PivotTable {
    let all_years: Vec<i32> = years
        .iter()
        .copied()
        .chain(rows.iter().map(|r| r.year))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for r in rows {
        let Some(col) = all_years.iter().position(|y| *y == r.year) else {
            continue;
        };
        let line = cells
            .entry((r.item_code.clone(), r.item_description.clone()))
            .or_insert_with(|| vec![0.0; all_years.len()]);
        line[col] = match metric {
            AnnualMetric::Total => r.total_annual_quantity,
            AnnualMetric::MonthlyAverage => r.avg_monthly_quantity,
        };
    }

    let mut table = PivotTable::new(
        &["Cód. Insumo", "Desc. Insumo"],
        all_years.iter().map(|y| y.to_string()).collect(),
    );
    for ((code, desc), values) in cells {
        table.push_row(vec![code, desc], values);
    }
    table
}

/// Per item, the mean over the years present of the annual total and of
/// the effective monthly average.
pub fn aggregate_overall_means(rows: &[AnnualSummaryRow]) -> Vec<OverallMeanRow> {
    let mut groups: BTreeMap<(String, String), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in rows {
        let e = groups
            .entry((r.item_code.clone(), r.item_description.clone()))
            .or_default();
        e.0.push(r.total_annual_quantity);
        e.1.push(r.avg_monthly_quantity);
    }
    groups
        .into_iter()
        .map(|((item_code, item_description), (totals, avgs))| OverallMeanRow {
            item_code,
            item_description,
            mean_annual_quantity: average(&totals),
            mean_monthly_quantity: average(&avgs),
            years_counted: totals.len(),
        })
        .collect()
}
