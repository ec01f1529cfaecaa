//! Item-by-month consumption detail.
//!
//! The long table holds one row per item and calendar month. With several
//! years selected each month is the mean of that month's yearly sums, taken
//! only over the years that have rows for it. The wide table pivots the long
//! one into twelve month columns plus [`AVERAGE_COLUMN`].

use crate::annual::aggregate_annual;
use crate::calendar::{month_name, short_label, MONTHS};
use crate::table::PivotTable;
use crate::types::{ConsumptionRecord, MonthlyDetailRow, AVERAGE_COLUMN};
use crate::util::{average, ratio};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyDetail {
    pub wide: PivotTable,
    pub long: Vec<MonthlyDetailRow>,
}

pub fn aggregate_monthly_detail(
    subset: &[ConsumptionRecord],
    selected_years: &BTreeSet<i32>,
) -> MonthlyDetail {
    let long = monthly_long(subset, selected_years.len() > 1);
    let single_year = match selected_years.len() {
        1 => selected_years.iter().next().copied(),
        _ => None,
    };
    let wide = match single_year {
        Some(year) => single_year_wide(subset, &long, year),
        None => multi_year_wide(&long),
    };
    debug!(long = long.len(), wide = wide.rows.len(), "monthly detail computed");
    MonthlyDetail { wide, long }
}

fn monthly_long(subset: &[ConsumptionRecord], average_years: bool) -> Vec<MonthlyDetailRow> {
    let mut by_year: BTreeMap<(String, String, u32, i32), f64> = BTreeMap::new();
    for r in subset {
        *by_year
            .entry((r.item_code.clone(), r.item_description.clone(), r.month_number, r.year))
            .or_insert(0.0) += r.quantity;
    }

    // Years without rows for an item/month are absent from the mean, not zeros.
    let mut by_month: BTreeMap<(String, String, u32), Vec<f64>> = BTreeMap::new();
    for ((code, desc, month, _year), qty) in by_year {
        by_month.entry((code, desc, month)).or_default().push(qty);
    }

    by_month
        .into_iter()
        .filter_map(|((item_code, item_description, month_number), sums)| {
            let name = month_name(month_number)?;
            let quantity = if average_years {
                average(&sums)
            } else {
                sums.iter().sum::<f64>()
            };
            Some(MonthlyDetailRow {
                item_code,
                item_description,
                month_number,
                month_name: name,
                quantity,
            })
        })
        .collect()
}

fn pivot_months(long: &[MonthlyDetailRow], columns: Vec<String>) -> PivotTable {
    let mut cells: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for r in long {
        let line = cells
            .entry((r.item_code.clone(), r.item_description.clone()))
            .or_insert_with(|| vec![0.0; MONTHS.len()]);
        if let Some(slot) = (r.month_number as usize)
            .checked_sub(1)
            .and_then(|i| line.get_mut(i))
        {
            *slot += r.quantity;
        }
    }
    let mut table = PivotTable::new(&["Cód. Insumo", "Desc. Insumo"], columns);
    for ((code, desc), values) in cells {
        table.push_row(vec![code, desc], values);
    }
    table
}

/// Month columns renamed to `mon/yy`; the average comes from the annual
/// summary so both tables agree on the effective-month rule.
fn single_year_wide(
    subset: &[ConsumptionRecord],
    long: &[MonthlyDetailRow],
    year: i32,
) -> PivotTable {
    let columns = MONTHS
        .iter()
        .filter_map(|(n, _, _)| short_label(*n, year))
        .collect();
    let mut table = pivot_months(long, columns);

    let averages: HashMap<(String, String), f64> = aggregate_annual(subset)
        .into_iter()
        .filter(|r| r.year == year)
        .map(|r| ((r.item_code, r.item_description), r.avg_monthly_quantity))
        .collect();
    table.push_column(AVERAGE_COLUMN, |row| {
        averages
            .get(&(row.keys[0].clone(), row.keys[1].clone()))
            .copied()
            .unwrap_or(0.0)
    });
    table
}

fn multi_year_wide(long: &[MonthlyDetailRow]) -> PivotTable {
    let columns = MONTHS.iter().map(|(_, name, _)| name.to_string()).collect();
    let mut table = pivot_months(long, columns);
    table.push_column(AVERAGE_COLUMN, |row| {
        let total: f64 = row.values.iter().sum();
        let months = row.values.iter().filter(|v| **v > 0.0).count();
        ratio(total, months)
    });
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    fn years(ys: &[i32]) -> BTreeSet<i32> {
        ys.iter().copied().collect()
    }

    #[test]
    fn test_multi_year_mean_for_january() {
        let subset = vec![
            record("A", "Item A", 2023, 1, 10.0, "UTI"),
            record("A", "Item A", 2024, 1, 30.0, "UTI"),
        ];
        let detail = aggregate_monthly_detail(&subset, &years(&[2023, 2024]));
        assert_eq!(detail.long.len(), 1);
        assert_eq!(detail.long[0].month_name, "Janeiro");
        assert_eq!(detail.long[0].quantity, 20.0);
        assert_eq!(detail.wide.value(&["A", "Item A"], "Janeiro"), Some(20.0));
    }

    #[test]
    fn test_missing_year_is_excluded_from_mean() {
        let subset = vec![
            record("A", "Item A", 2023, 2, 8.0, "UTI"),
            record("A", "Item A", 2023, 2, 4.0, "PS"),
        ];
        let detail = aggregate_monthly_detail(&subset, &years(&[2023, 2024]));
        assert_eq!(detail.long[0].quantity, 12.0);
    }

    #[test]
    fn test_single_year_passes_sums_through() {
        let subset = vec![
            record("A", "Item A", 2023, 3, 5.0, "UTI"),
            record("A", "Item A", 2023, 3, 7.0, "PS"),
        ];
        let detail = aggregate_monthly_detail(&subset, &years(&[2023]));
        assert_eq!(detail.long.len(), 1);
        assert_eq!(detail.long[0].quantity, 12.0);
        assert_eq!(detail.wide.value(&["A", "Item A"], "mar/23"), Some(12.0));
    }

    #[test]
    fn test_single_year_columns_and_average_from_annual() {
        let subset = vec![
            record("A", "Item A", 2023, 1, 10.0, "UTI"),
            record("A", "Item A", 2023, 3, 20.0, "UTI"),
            record("A", "Item A", 2023, 6, 0.0, "UTI"),
        ];
        let detail = aggregate_monthly_detail(&subset, &years(&[2023]));
        let header = detail.wide.header();
        assert_eq!(header.len(), 2 + 12 + 1);
        assert_eq!(header[2], "jan/23");
        assert_eq!(header[13], "dez/23");
        assert_eq!(header[14], AVERAGE_COLUMN);
        assert_eq!(detail.wide.value(&["A", "Item A"], "fev/23"), Some(0.0));
        assert_eq!(detail.wide.value(&["A", "Item A"], AVERAGE_COLUMN), Some(15.0));
    }

    #[test]
    fn test_multi_year_average_over_nonzero_months() {
        let subset = vec![
            record("A", "Item A", 2023, 1, 10.0, "UTI"),
            record("A", "Item A", 2024, 1, 30.0, "UTI"),
            record("A", "Item A", 2024, 12, 40.0, "UTI"),
        ];
        let detail = aggregate_monthly_detail(&subset, &years(&[2023, 2024]));
        // January mean 20, December 40 -> (20 + 40) / 2
        assert_eq!(detail.wide.value(&["A", "Item A"], AVERAGE_COLUMN), Some(30.0));
        assert_eq!(detail.wide.value(&["A", "Item A"], "Dezembro"), Some(40.0));
    }

    #[test]
    fn test_columns_follow_calendar_order() {
        let detail = aggregate_monthly_detail(&[], &years(&[2023, 2024]));
        let expected: Vec<String> = MONTHS
            .iter()
            .map(|(_, n, _)| n.to_string())
            .chain(std::iter::once(AVERAGE_COLUMN.to_string()))
            .collect();
        assert_eq!(detail.wide.columns, expected);
    }

    #[test]
    fn test_empty_input_keeps_all_columns() {
        for ys in [years(&[2023]), years(&[2023, 2024]), years(&[])] {
            let detail = aggregate_monthly_detail(&[], &ys);
            assert!(detail.long.is_empty());
            assert!(detail.wide.is_empty());
            assert_eq!(detail.wide.columns.len(), 13);
            assert_eq!(detail.wide.columns[12], AVERAGE_COLUMN);
        }
    }

    #[test]
    fn test_idempotent() {
        let subset = vec![
            record("A", "Item A", 2023, 1, 10.0, "UTI"),
            record("B", "Item B", 2024, 5, 3.0, "PS"),
        ];
        let ys = years(&[2023, 2024]);
        assert_eq!(
            aggregate_monthly_detail(&subset, &ys),
            aggregate_monthly_detail(&subset, &ys)
        );
    }
}
