//! Consumption broken down by requesting unit.
//!
//! Rows whose unit is blank or [`UNKNOWN`](crate::types::UNKNOWN) never
//! appear as a unit in these tables.

use crate::annual::MonthlyAcc;
use crate::table::PivotTable;
use crate::types::{ConsumptionRecord, UnitRankingRow, UnitSummaryRow, TOTAL_LABEL};
use crate::util::average;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Items by unit with a trailing `Total` column and `Total` row.
///
/// Units are ordered by descending overall quantity; units whose total is
/// zero are dropped.
pub fn aggregate_unit_overview(subset: &[ConsumptionRecord]) -> PivotTable {
    let mut cells: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    let mut unit_totals: BTreeMap<String, f64> = BTreeMap::new();
    for r in subset.iter().filter(|r| r.has_known_unit()) {
        *cells
            .entry(r.item_description.clone())
            .or_default()
            .entry(r.requesting_unit.clone())
            .or_insert(0.0) += r.quantity;
        *unit_totals.entry(r.requesting_unit.clone()).or_insert(0.0) += r.quantity;
    }

    let mut units: Vec<(String, f64)> = unit_totals.into_iter().filter(|(_, t)| *t > 0.0).collect();
    units.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let columns: Vec<String> = units.into_iter().map(|(u, _)| u).collect();

    let mut table = PivotTable::new(&["Desc. Insumo"], columns.clone());
    for (desc, by_unit) in cells {
        let values = columns
            .iter()
            .map(|u| by_unit.get(u).copied().unwrap_or(0.0))
            .collect();
        table.push_row(vec![desc], values);
    }
    table.push_column(TOTAL_LABEL, |row| row.values.iter().sum());

    let totals: Vec<f64> = (0..table.columns.len())
        .map(|i| table.rows.iter().map(|r| r.values[i]).sum::<f64>())
        .collect();
    table.push_row(vec![TOTAL_LABEL.to_string()], totals);
    debug!(units = columns.len(), rows = table.rows.len(), "unit overview computed");
    table
}

/// Unit breakdown for a single item.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDetail {
    pub item_description: String,
    /// One row per (unit, year).
    pub summary: Vec<UnitSummaryRow>,
    /// Units by their monthly average across years, highest first.
    pub ranked: Vec<UnitRankingRow>,
    /// Units by year, cells are the monthly average.
    pub year_pivot: PivotTable,
}

pub fn aggregate_unit_detail(subset: &[ConsumptionRecord], item_description: &str) -> UnitDetail {
    let mut groups: BTreeMap<(String, i32), MonthlyAcc> = BTreeMap::new();
    for r in subset
        .iter()
        .filter(|r| r.item_description == item_description && r.has_known_unit())
    {
        groups
            .entry((r.requesting_unit.clone(), r.year))
            .or_default()
            .add(r.month_number, r.quantity);
    }

    let summary: Vec<UnitSummaryRow> = groups
        .into_iter()
        .map(|((requesting_unit, year), acc)| UnitSummaryRow {
            requesting_unit,
            year,
            total_quantity: acc.total(),
            months_with_consumption: acc.months_with_consumption(),
            avg_monthly_quantity: acc.avg_monthly(),
        })
        .collect();

    let mut per_unit: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in &summary {
        per_unit
            .entry(row.requesting_unit.as_str())
            .or_default()
            .push(row.avg_monthly_quantity);
    }
    let mut ranked: Vec<UnitRankingRow> = per_unit
        .into_iter()
        .map(|(unit, avgs)| UnitRankingRow {
            requesting_unit: unit.to_string(),
            avg_monthly_quantity: average(&avgs),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.avg_monthly_quantity
            .partial_cmp(&a.avg_monthly_quantity)
            .unwrap_or(Ordering::Equal)
    });

    // Year columns come from the whole subset so the shape does not depend
    // on which years this item happens to have.
    let years: Vec<i32> = subset
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut cells: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in &summary {
        let line = cells
            .entry(row.requesting_unit.as_str())
            .or_insert_with(|| vec![0.0; years.len()]);
        if let Some(col) = years.iter().position(|y| *y == row.year) {
            line[col] = row.avg_monthly_quantity;
        }
    }
    let mut year_pivot = PivotTable::new(
        &["Descricao Requisitante"],
        years.iter().map(|y| y.to_string()).collect(),
    );
    for (unit, values) in cells {
        year_pivot.push_row(vec![unit.to_string()], values);
    }

    debug!(item = item_description, units = ranked.len(), "unit detail computed");
    UnitDetail {
        item_description: item_description.to_string(),
        summary,
        ranked,
        year_pivot,
    }
}
