// Entry point and high-level CLI flow.
//
// - Option [1] loads and cleans the movement CSV, printing diagnostics.
// - Option [2] asks for the filter selection.
// - Option [3] recomputes every table for the selection, previews them and
//   exports them as CSV plus a JSON summary.
// After generating reports the user can go back to the menu or exit.
mod annual;
mod bootstrap;
mod calendar;
mod config;
mod error;
mod filter;
mod loader;
mod monthly;
mod output;
mod reports;
mod table;
mod types;
mod units;
mod util;

#[cfg(test)]
mod test_support;

use clap::Parser;
use config::{ColumnMapping, Settings};
use filter::{resolve_default_movement, selection_options, FilterParams};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use types::ConsumptionRecord;

// The record store is loaded once and shared by every recomputation; the
// selection is replaced wholesale whenever the user changes it.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    data: Option<Arc<Vec<ConsumptionRecord>>>,
    params: Option<FilterParams>,
    unit_item: Option<String>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Comma-separated values, blanks ignored.
fn parse_list(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-separated years; tokens that are not integers are reported back.
fn parse_years(input: &str) -> (BTreeSet<i32>, Vec<String>) {
    let mut years = BTreeSet::new();
    let mut invalid = Vec::new();
    for token in parse_list(input) {
        match token.parse::<i32>() {
            Ok(y) => {
                years.insert(y);
            }
            Err(_) => invalid.push(token),
        }
    }
    (years, invalid)
}

/// Movement type from a menu answer: blank keeps `default`, a number picks
/// from `options` (1-based), anything else is taken verbatim.
fn pick_movement(input: &str, options: &[String], default: Option<&str>) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return default.map(str::to_string);
    }
    if let Ok(n) = input.parse::<usize>() {
        if let Some(opt) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return Some(opt.clone());
        }
    }
    Some(input.to_string())
}

/// Handle option [1]: load and clean the CSV file.
fn handle_load(settings: &Settings) {
    let mapping = match ColumnMapping::load(settings.mapping.as_deref()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to load column mapping: {}\n", e);
            return;
        }
    };
    match loader::load_and_clean(&settings.file, &mapping) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} kept)",
                util::format_int(report.total_rows),
                util::format_int(report.kept_rows)
            );
            println!(
                "Note: {} rows skipped due to missing identifiers or dates.",
                util::format_int(report.dropped_rows)
            );
            if report.latin1_fallback {
                println!("Note: file is not UTF-8; read as Latin-1.");
            }
            if report.unparsed_quantities > 0 {
                println!(
                    "Note: {} quantities could not be parsed and count as 0.",
                    util::format_int(report.unparsed_quantities)
                );
            }
            for col in &report.missing_optional {
                println!("Warning: optional column '{}' not found; defaults used.", col);
            }
            println!();
            let mut st = state();
            st.data = Some(Arc::new(data));
            st.params = None;
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: ask for the filter selection.
fn handle_set_filters(settings: &Settings) {
    let Some(data) = state().data.clone() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let opts = selection_options(&data);
    println!(
        "{} items, {} codes, {} classes, years {:?}",
        util::format_int(opts.descriptions.len()),
        util::format_int(opts.codes.len()),
        util::format_int(opts.classes.len()),
        opts.years
    );

    let description_filter = parse_list(&prompt("Item descriptions (comma-separated, blank for any): "));
    let code_filter = parse_list(&prompt("Item codes (comma-separated, blank for any): "));
    let class_filter = parse_list(&prompt("Classes (comma-separated, blank for any): "));
    let (years, invalid) = parse_years(&prompt("Years (comma-separated): "));
    if !invalid.is_empty() {
        println!("Ignoring invalid years: {}", invalid.join(", "));
    }
    if years.is_empty() {
        println!("Note: no year selected; reports will be empty.");
    }

    let default = resolve_default_movement(&opts.movement_types, settings.default_movement_index);
    if let Some(w) = &default.warning {
        println!("Warning: {}", w);
    }
    for (i, m) in opts.movement_types.iter().enumerate() {
        println!("[{}] {}", i + 1, m);
    }
    let label = format!(
        "Movement type for consumption [{}]: ",
        default.value.as_deref().unwrap_or("")
    );
    let Some(movement_type) = pick_movement(&prompt(&label), &opts.movement_types, default.value.as_deref())
    else {
        println!("Error: no movement type selected.\n");
        return;
    };
    if !opts.movement_types.contains(&movement_type) {
        warn!(movement_type = %movement_type, "movement type not present in data");
    }

    let unit_item = prompt("Item for unit analysis (blank for first selected): ");
    let params = FilterParams {
        description_filter,
        code_filter,
        class_filter,
        years,
        movement_type,
    };
    info!(?params, "filters updated");

    let mut st = state();
    st.params = Some(params);
    st.unit_item = if unit_item.is_empty() { None } else { Some(unit_item) };
    println!();
}

/// Handle option [3]: recompute, preview and export all reports.
fn handle_generate_reports(settings: &Settings) {
    let (data, params, unit_item) = {
        let st = state();
        (st.data.clone(), st.params.clone(), st.unit_item.clone())
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let Some(params) = params else {
        println!("Error: No filters set. Please choose filters first (option 2).\n");
        return;
    };

    println!("Generating reports...\n");
    let bundle = reports::build_report(&data, &params, unit_item.as_deref());
    if bundle.is_empty() {
        println!("No data found for the selected criteria.\n");
    }

    println!("Annual Consumption per Item");
    output::preview_table_rows(&bundle.annual, 10);
    println!("Total Annual Consumption (items x years)");
    output::preview_pivot(&bundle.annual_totals, 10, 0);
    println!("Average Monthly Consumption (items x years)");
    output::preview_pivot(&bundle.annual_averages, 10, 1);
    println!("Overall Means over Selected Years");
    output::preview_table_rows(&bundle.overall_means, 10);
    println!("Monthly Detail");
    output::preview_pivot(&bundle.monthly.wide, 10, 1);
    println!("Consumption by Requesting Unit");
    output::preview_pivot(&bundle.unit_overview, 10, 0);
    if let Some(detail) = &bundle.unit_detail {
        println!("Average Monthly Consumption of '{}' by Unit", detail.item_description);
        output::preview_table_rows(&detail.ranked, 15);
        println!("Average Monthly Consumption by Unit and Year");
        output::preview_pivot(&detail.year_pivot, 15, 1);
    }

    match output::export_bundle(&settings.output_dir, &bundle) {
        Ok(files) => println!(
            "({} files exported to {})\n",
            files.len(),
            settings.output_dir.display()
        ),
        Err(e) => eprintln!("Write error: {}", e),
    }
    let summary = bundle.summary();
    println!(
        "Summary: {} rows, total quantity {}\n",
        util::format_int(summary.filtered_rows),
        util::format_number(summary.total_quantity, 2)
    );
}

fn main() {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level);
    info!("consumption_report v{} starting", env!("CARGO_PKG_VERSION"));

    loop {
        println!("Material Consumption Reports:");
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Generate Reports\n");
        match read_choice().as_str() {
            "1" => handle_load(&settings),
            "2" => handle_set_filters(&settings),
            "3" => {
                println!();
                handle_generate_reports(&settings);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
