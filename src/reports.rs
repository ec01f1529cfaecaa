// One recomputation pass: filter the store, then run every aggregator.
//
// Nothing here is cached; a new selection always produces a new bundle.
use crate::annual::{aggregate_annual, aggregate_overall_means, annual_pivot, AnnualMetric};
use crate::filter::{select, FilterParams};
use crate::monthly::{aggregate_monthly_detail, MonthlyDetail};
use crate::table::PivotTable;
use crate::types::{AnnualSummaryRow, ConsumptionRecord, OverallMeanRow, SummaryStats};
use crate::units::{aggregate_unit_detail, aggregate_unit_overview, UnitDetail};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub params: FilterParams,
    pub filtered_rows: usize,
    pub total_quantity: f64,
    /// Distinct item descriptions in the working subset, sorted.
    pub items: Vec<String>,
    pub annual: Vec<AnnualSummaryRow>,
    pub annual_totals: PivotTable,
    pub annual_averages: PivotTable,
    pub overall_means: Vec<OverallMeanRow>,
    pub monthly: MonthlyDetail,
    pub unit_overview: PivotTable,
    pub unit_detail: Option<UnitDetail>,
}

impl ReportBundle {
    pub fn is_empty(&self) -> bool {
        self.filtered_rows == 0
    }

    pub fn summary(&self) -> SummaryStats {
        SummaryStats {
            movement_type: self.params.movement_type.clone(),
            years: self.params.years.iter().copied().collect(),
            items: self.items.clone(),
            filtered_rows: self.filtered_rows,
            total_quantity: self.total_quantity,
            unit_item: self.unit_detail.as_ref().map(|d| d.item_description.clone()),
        }
    }
}

/// Pick the item for the unit breakdown: the requested one when it is in
/// the subset, otherwise the first item.
fn choose_unit_item(items: &[String], requested: Option<&str>) -> Option<String> {
    requested
        .filter(|r| items.iter().any(|i| i == r))
        .map(str::to_string)
        .or_else(|| items.first().cloned())
}

pub fn build_report(
    store: &[ConsumptionRecord],
    params: &FilterParams,
    unit_item: Option<&str>,
) -> ReportBundle {
    let subset = select(store, params);
    let items: Vec<String> = subset
        .iter()
        .map(|r| r.item_description.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let annual = aggregate_annual(&subset);
    let annual_totals = annual_pivot(&annual, &params.years, AnnualMetric::Total);
    let annual_averages = annual_pivot(&annual, &params.years, AnnualMetric::MonthlyAverage);
    let overall_means = aggregate_overall_means(&annual);
    let monthly = aggregate_monthly_detail(&subset, &params.years);
    let unit_overview = aggregate_unit_overview(&subset);
    let unit_detail =
        choose_unit_item(&items, unit_item).map(|item| aggregate_unit_detail(&subset, &item));

    info!(
        rows = subset.len(),
        items = items.len(),
        years = params.years.len(),
        "report computed"
    );
    ReportBundle {
        params: params.clone(),
        filtered_rows: subset.len(),
        total_quantity: subset.iter().map(|r| r.quantity).sum(),
        items,
        annual,
        annual_totals,
        annual_averages,
        overall_means,
        monthly,
        unit_overview,
        unit_detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use crate::types::AVERAGE_COLUMN;

    fn store() -> Vec<ConsumptionRecord> {
        vec![
            record("001", "Luva", 2023, 1, 10.0, "UTI"),
            record("001", "Luva", 2023, 3, 20.0, "PS"),
            record("002", "Seringa", 2023, 2, 4.0, "UTI"),
            record("002", "Seringa", 2022, 2, 4.0, "UTI"),
        ]
    }

    fn params(years: &[i32]) -> FilterParams {
        FilterParams {
            years: years.iter().copied().collect(),
            movement_type: "Dispensação".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_pass() {
        let report = build_report(&store(), &params(&[2023]), Some("Seringa"));
        assert_eq!(report.filtered_rows, 3);
        assert_eq!(report.total_quantity, 34.0);
        assert_eq!(report.items, vec!["Luva", "Seringa"]);
        assert_eq!(report.annual.len(), 2);
        assert_eq!(report.annual_totals.value(&["001", "Luva"], "2023"), Some(30.0));
        assert_eq!(report.annual_averages.value(&["001", "Luva"], "2023"), Some(15.0));
        assert_eq!(
            report.monthly.wide.value(&["001", "Luva"], AVERAGE_COLUMN),
            Some(15.0)
        );
        assert_eq!(report.unit_overview.value(&["Luva"], "UTI"), Some(10.0));
        let detail = report.unit_detail.as_ref().unwrap();
        assert_eq!(detail.item_description, "Seringa");
    }

    #[test]
    fn test_unit_item_falls_back_to_first() {
        let report = build_report(&store(), &params(&[2023]), Some("Gaze"));
        assert_eq!(report.unit_detail.unwrap().item_description, "Luva");
        let report = build_report(&store(), &params(&[2023]), None);
        assert_eq!(report.unit_detail.unwrap().item_description, "Luva");
    }

    #[test]
    fn test_empty_selection_is_well_formed() {
        let report = build_report(&store(), &params(&[]), None);
        assert!(report.is_empty());
        assert!(report.annual.is_empty());
        assert!(report.unit_detail.is_none());
        assert_eq!(report.monthly.wide.columns.len(), 13);
        assert_eq!(report.unit_overview.rows.len(), 1);
        let summary = report.summary();
        assert_eq!(summary.filtered_rows, 0);
        assert!(summary.unit_item.is_none());
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let p = params(&[2022, 2023]);
        assert_eq!(build_report(&store(), &p, None), build_report(&store(), &p, None));
    }
}
