use crate::error::Result;
use crate::reports::ReportBundle;
use crate::table::PivotTable;
use crate::util::format_number;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Header row followed by one line per pivot row; values are written raw.
pub fn write_pivot_csv(path: &Path, table: &PivotTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.header())?;
    for row in &table.rows {
        let values = row.values.iter().map(|v| v.to_string());
        wtr.write_record(row.keys.iter().cloned().chain(values))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every table of `bundle` plus `summary.json` into `dir`.
pub fn export_bundle(dir: &Path, bundle: &ReportBundle) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    let mut target = |name: &str| {
        let p = dir.join(name);
        written.push(p.clone());
        p
    };

    write_csv(&target("annual_summary.csv"), &bundle.annual)?;
    write_pivot_csv(&target("annual_totals.csv"), &bundle.annual_totals)?;
    write_pivot_csv(&target("annual_monthly_averages.csv"), &bundle.annual_averages)?;
    write_csv(&target("overall_means.csv"), &bundle.overall_means)?;
    write_csv(&target("monthly_detail_long.csv"), &bundle.monthly.long)?;
    write_pivot_csv(&target("monthly_detail.csv"), &bundle.monthly.wide)?;
    write_pivot_csv(&target("unit_overview.csv"), &bundle.unit_overview)?;
    if let Some(detail) = &bundle.unit_detail {
        write_csv(&target("unit_summary.csv"), &detail.summary)?;
        write_csv(&target("unit_ranking.csv"), &detail.ranked)?;
        write_pivot_csv(&target("unit_by_year.csv"), &detail.year_pivot)?;
    }
    write_json(&target("summary.json"), &bundle.summary())?;

    info!(files = written.len(), dir = %dir.display(), "reports exported");
    Ok(written)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Markdown rendering of the first `max_rows` rows of a pivot.
pub fn render_pivot(table: &PivotTable, max_rows: usize, decimals: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.header());
    for row in table.rows.iter().take(max_rows) {
        let values = row.values.iter().map(|v| format_number(*v, decimals));
        builder.push_record(row.keys.iter().cloned().chain(values));
    }
    let mut rendered = builder.build();
    rendered.with(Style::markdown());
    rendered.to_string()
}

pub fn preview_pivot(table: &PivotTable, max_rows: usize, decimals: usize) {
    println!("{}", render_pivot(table, max_rows, decimals));
    if table.is_empty() {
        println!("(no rows)");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterParams;
    use crate::reports::build_report;
    use crate::test_support::record;
    use tempfile::TempDir;

    fn pivot() -> PivotTable {
        let mut t = PivotTable::new(&["Item"], vec!["2023".into()]);
        t.push_row(vec!["Luva".into()], vec![1234.5]);
        t
    }

    #[test]
    fn test_write_pivot_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pivot.csv");
        write_pivot_csv(&path, &pivot()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Item,2023\nLuva,1234.5\n");
    }

    #[test]
    fn test_render_pivot_formats_numbers() {
        let out = render_pivot(&pivot(), 10, 1);
        assert!(out.contains("Item"));
        assert!(out.contains("1,234.5"));
    }

    #[test]
    fn test_render_empty_pivot_keeps_header() {
        let t = PivotTable::new(&["Item"], vec!["Janeiro".into(), "Fevereiro".into()]);
        let out = render_pivot(&t, 10, 0);
        assert!(out.contains("Janeiro"));
        assert!(out.contains("Fevereiro"));
    }

    #[test]
    fn test_export_bundle_writes_all_files() {
        let store = vec![
            record("001", "Luva", 2023, 1, 10.0, "UTI"),
            record("001", "Luva", 2023, 2, 5.0, "PS"),
        ];
        let params = FilterParams {
            years: [2023].into_iter().collect(),
            movement_type: "Dispensação".into(),
            ..Default::default()
        };
        let bundle = build_report(&store, &params, None);
        let dir = TempDir::new().unwrap();
        let written = export_bundle(dir.path(), &bundle).unwrap();
        assert_eq!(written.len(), 11);
        assert!(written.iter().all(|p| p.exists()));

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["filtered_rows"], 2);
        assert_eq!(summary["unit_item"], "Luva");

        let monthly = std::fs::read_to_string(dir.path().join("monthly_detail.csv")).unwrap();
        assert!(monthly.starts_with("Cód. Insumo,Desc. Insumo,jan/23,"));
        assert!(monthly.lines().next().unwrap().ends_with("CONSUMO MEDIO"));
    }
}
