// Record store loading.
//
// The header is validated against the column mapping before any row is
// read, so everything past this module works with complete, typed records.
use crate::calendar::month_name;
use crate::config::ColumnMapping;
use crate::error::{ReportError, Result};
use crate::types::{ConsumptionRecord, UNKNOWN};
use crate::util::{parse_date_dayfirst, parse_decimal_br};
use chrono::Datelike;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    pub unparsed_quantities: usize,
    /// Optional columns absent from the header.
    pub missing_optional: Vec<String>,
    pub latin1_fallback: bool,
}

/// Header positions of every canonical field.
struct Columns {
    item_code: usize,
    item_description: usize,
    movement_type: usize,
    movement_date: usize,
    quantity: usize,
    requesting_unit: Option<usize>,
    class_description: Option<usize>,
    value: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, mapping: &ColumnMapping, report: &mut LoadReport) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name.trim());
        let required = |field: &'static str, name: &str| {
            find(name).ok_or_else(|| ReportError::MissingField {
                field,
                column: name.to_string(),
            })
        };
        let mut optional = |name: &str| {
            let idx = find(name);
            if idx.is_none() {
                warn!(column = name, "optional column not found; using defaults");
                report.missing_optional.push(name.trim().to_string());
            }
            idx
        };
        Ok(Columns {
            item_code: required("item_code", &mapping.item_code)?,
            item_description: required("item_description", &mapping.item_description)?,
            movement_type: required("movement_type", &mapping.movement_type)?,
            movement_date: required("movement_date", &mapping.movement_date)?,
            quantity: required("quantity", &mapping.quantity)?,
            requesting_unit: optional(&mapping.requesting_unit),
            class_description: optional(&mapping.class_description),
            value: optional(&mapping.value),
        })
    }
}

/// Decode as UTF-8, falling back to Latin-1.
fn decode(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(s) => {
            let s = match s.strip_prefix('\u{feff}') {
                Some(rest) => rest.to_string(),
                None => s,
            };
            (s, false)
        }
        Err(e) => (e.into_bytes().iter().map(|&b| b as char).collect(), true),
    }
}

pub fn load_and_clean(path: &Path, mapping: &ColumnMapping) -> Result<(Vec<ConsumptionRecord>, LoadReport)> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, latin1_fallback) = decode(bytes);
    if latin1_fallback {
        warn!(path = %path.display(), "file is not valid UTF-8; decoded as Latin-1");
    }
    if text.trim().is_empty() {
        return Err(ReportError::EmptyFile(path.to_path_buf()));
    }
    let (records, mut report) = parse_records(&text, mapping)?;
    report.latin1_fallback = latin1_fallback;
    info!(
        total = report.total_rows,
        kept = report.kept_rows,
        dropped = report.dropped_rows,
        "record store loaded"
    );
    Ok((records, report))
}

pub fn parse_records(text: &str, mapping: &ColumnMapping) -> Result<(Vec<ConsumptionRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let mut report = LoadReport::default();
    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers, mapping, &mut report)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.dropped_rows += 1;
                continue;
            }
        };
        match clean_row(&row, &cols, &mut report) {
            Some(r) => records.push(r),
            None => report.dropped_rows += 1,
        }
    }
    report.kept_rows = records.len();
    if report.dropped_rows > 0 {
        warn!(dropped = report.dropped_rows, "rows skipped due to missing identifiers or dates");
    }
    Ok((records, report))
}

fn clean_row(row: &StringRecord, cols: &Columns, report: &mut LoadReport) -> Option<ConsumptionRecord> {
    let field = |idx: usize| row.get(idx).map(str::trim).filter(|s| !s.is_empty());
    let optional_text = |idx: Option<usize>| {
        idx.and_then(|i| field(i))
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    let item_code = field(cols.item_code)?.to_string();
    let item_description = field(cols.item_description)?.to_string();
    let movement_type = field(cols.movement_type)?.to_string();
    let movement_date = parse_date_dayfirst(row.get(cols.movement_date))?;
    let month_number = movement_date.month();

    let quantity = match parse_decimal_br(row.get(cols.quantity)) {
        Some(q) => q.abs(),
        None => {
            report.unparsed_quantities += 1;
            0.0
        }
    };
    let value = cols
        .value
        .map(|i| parse_decimal_br(row.get(i)).map(f64::abs).unwrap_or(0.0));

    Some(ConsumptionRecord {
        item_code,
        item_description,
        class_description: optional_text(cols.class_description),
        movement_type,
        movement_date,
        year: movement_date.year(),
        month_number,
        month_name: month_name(month_number)?,
        quantity,
        requesting_unit: optional_text(cols.requesting_unit),
        value,
    })
}
