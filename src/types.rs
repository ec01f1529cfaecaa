use crate::util::display_qty;
use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// Placeholder stored when a unit or class is absent from the source.
///
/// Never counted as a genuine unit or class in breakdowns.
pub const UNKNOWN: &str = "N/A";

/// Label of the trailing average column of the monthly detail table.
pub const AVERAGE_COLUMN: &str = "CONSUMO MEDIO";

/// Label of the trailing total column and row of the unit overview.
pub const TOTAL_LABEL: &str = "Total";

/// One cleaned transaction row of the record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionRecord {
    pub item_code: String,
    pub item_description: String,
    pub class_description: String,
    pub movement_type: String,
    pub movement_date: NaiveDate,
    pub year: i32,
    pub month_number: u32,
    pub month_name: &'static str,
    /// Always non-negative.
    pub quantity: f64,
    pub requesting_unit: String,
    pub value: Option<f64>,
}

impl ConsumptionRecord {
    pub fn has_known_unit(&self) -> bool {
        is_known(&self.requesting_unit)
    }
}

/// True unless `value` is blank or the [`UNKNOWN`] placeholder.
pub fn is_known(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != UNKNOWN
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct AnnualSummaryRow {
    #[serde(rename = "Cód. Insumo")]
    #[tabled(rename = "Cód. Insumo")]
    pub item_code: String,
    #[serde(rename = "Desc. Insumo")]
    #[tabled(rename = "Desc. Insumo")]
    pub item_description: String,
    #[serde(rename = "Ano")]
    #[tabled(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Consumo Total Anual")]
    #[tabled(rename = "Consumo Total Anual", display_with = "display_qty")]
    pub total_annual_quantity: f64,
    #[serde(rename = "Meses com Consumo")]
    #[tabled(rename = "Meses com Consumo")]
    pub months_with_consumption: usize,
    #[serde(rename = "Consumo Médio Mensal")]
    #[tabled(rename = "Consumo Médio Mensal", display_with = "display_qty")]
    pub avg_monthly_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MonthlyDetailRow {
    #[serde(rename = "Cód. Insumo")]
    #[tabled(rename = "Cód. Insumo")]
    pub item_code: String,
    #[serde(rename = "Desc. Insumo")]
    #[tabled(rename = "Desc. Insumo")]
    pub item_description: String,
    #[serde(rename = "Mês")]
    #[tabled(rename = "Mês")]
    pub month_number: u32,
    #[serde(rename = "Nome Mês")]
    #[tabled(rename = "Nome Mês")]
    pub month_name: &'static str,
    #[serde(rename = "Quantidade")]
    #[tabled(rename = "Quantidade", display_with = "display_qty")]
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct UnitSummaryRow {
    #[serde(rename = "Descricao Requisitante")]
    #[tabled(rename = "Descricao Requisitante")]
    pub requesting_unit: String,
    #[serde(rename = "Ano")]
    #[tabled(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Consumo Total")]
    #[tabled(rename = "Consumo Total", display_with = "display_qty")]
    pub total_quantity: f64,
    #[serde(rename = "Meses com Consumo")]
    #[tabled(rename = "Meses com Consumo")]
    pub months_with_consumption: usize,
    #[serde(rename = "Média Mensal por Unidade")]
    #[tabled(rename = "Média Mensal por Unidade", display_with = "display_qty")]
    pub avg_monthly_quantity: f64,
}

/// A unit's monthly average for one item, averaged across years.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct UnitRankingRow {
    #[serde(rename = "Descricao Requisitante")]
    #[tabled(rename = "Descricao Requisitante")]
    pub requesting_unit: String,
    #[serde(rename = "Média Mensal por Unidade")]
    #[tabled(rename = "Média Mensal por Unidade", display_with = "display_qty")]
    pub avg_monthly_quantity: f64,
}

/// Per-item means over the selected years.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct OverallMeanRow {
    #[serde(rename = "Cód. Insumo")]
    #[tabled(rename = "Cód. Insumo")]
    pub item_code: String,
    #[serde(rename = "Desc. Insumo")]
    #[tabled(rename = "Desc. Insumo")]
    pub item_description: String,
    #[serde(rename = "Média Geral Anual")]
    #[tabled(rename = "Média Geral Anual", display_with = "display_qty")]
    pub mean_annual_quantity: f64,
    #[serde(rename = "Média Geral Mensal")]
    #[tabled(rename = "Média Geral Mensal", display_with = "display_qty")]
    pub mean_monthly_quantity: f64,
    #[serde(rename = "Anos")]
    #[tabled(rename = "Anos")]
    pub years_counted: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub movement_type: String,
    pub years: Vec<i32>,
    pub items: Vec<String>,
    pub filtered_rows: usize,
    pub total_quantity: f64,
    pub unit_item: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_known() {
        assert!(is_known("UTI Adulto"));
        assert!(!is_known(UNKNOWN));
        assert!(!is_known("   "));
        assert!(!is_known(""));
    }
}
