use crate::calendar::month_name;
use crate::types::{ConsumptionRecord, UNKNOWN};
use chrono::NaiveDate;

/// Dispensing record on the first day of `month`, class unknown.
pub fn record(
    code: &str,
    description: &str,
    year: i32,
    month: u32,
    quantity: f64,
    unit: &str,
) -> ConsumptionRecord {
    ConsumptionRecord {
        item_code: code.to_string(),
        item_description: description.to_string(),
        class_description: UNKNOWN.to_string(),
        movement_type: "Dispensação".to_string(),
        movement_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
        year,
        month_number: month,
        month_name: month_name(month).unwrap(),
        quantity,
        requesting_unit: unit.to_string(),
        value: None,
    }
}
