use crate::types::{is_known, ConsumptionRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The user's current selection.
///
/// Empty identifier sets mean "no constraint"; an empty `years` set
/// selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub description_filter: BTreeSet<String>,
    pub code_filter: BTreeSet<String>,
    pub class_filter: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    pub movement_type: String,
}

impl FilterParams {
    fn matches_identifier(&self, r: &ConsumptionRecord) -> bool {
        match (self.description_filter.is_empty(), self.code_filter.is_empty()) {
            (true, true) => true,
            (false, true) => self.description_filter.contains(&r.item_description),
            (true, false) => self.code_filter.contains(&r.item_code),
            (false, false) => {
                self.description_filter.contains(&r.item_description)
                    || self.code_filter.contains(&r.item_code)
            }
        }
    }

    fn matches_class(&self, r: &ConsumptionRecord) -> bool {
        self.class_filter.is_empty() || self.class_filter.contains(&r.class_description)
    }

    pub fn matches(&self, r: &ConsumptionRecord) -> bool {
        self.years.contains(&r.year)
            && r.movement_type == self.movement_type
            && self.matches_identifier(r)
            && self.matches_class(r)
    }
}

/// Narrow the record store to the working subset for `params`.
pub fn select(records: &[ConsumptionRecord], params: &FilterParams) -> Vec<ConsumptionRecord> {
    let subset: Vec<ConsumptionRecord> =
        records.iter().filter(|r| params.matches(r)).cloned().collect();
    debug!(
        total = records.len(),
        selected = subset.len(),
        "filter applied"
    );
    subset
}

/// Sorted distinct values offered by the selection menus.
#[derive(Debug, Clone, Default)]
pub struct SelectionOptions {
    pub descriptions: Vec<String>,
    pub codes: Vec<String>,
    pub classes: Vec<String>,
    pub years: Vec<i32>,
    pub movement_types: Vec<String>,
}

pub fn selection_options(records: &[ConsumptionRecord]) -> SelectionOptions {
    let mut descriptions = BTreeSet::new();
    let mut codes = BTreeSet::new();
    let mut classes = BTreeSet::new();
    let mut years = BTreeSet::new();
    let mut movement_types = BTreeSet::new();
    for r in records {
        descriptions.insert(r.item_description.clone());
        codes.insert(r.item_code.clone());
        if is_known(&r.class_description) {
            classes.insert(r.class_description.clone());
        }
        years.insert(r.year);
        movement_types.insert(r.movement_type.clone());
    }
    SelectionOptions {
        descriptions: descriptions.into_iter().collect(),
        codes: codes.into_iter().collect(),
        classes: classes.into_iter().collect(),
        years: years.into_iter().collect(),
        movement_types: movement_types.into_iter().collect(),
    }
}

/// Result of resolving a positional default.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSelection {
    pub value: Option<String>,
    /// Set when the configured position could not be honoured.
    pub warning: Option<String>,
}

/// Pick the movement type at `index` in `options`, falling back to the
/// first option (with a warning) when there are too few.
pub fn resolve_default_movement(options: &[String], index: usize) -> DefaultSelection {
    if let Some(v) = options.get(index) {
        return DefaultSelection {
            value: Some(v.clone()),
            warning: None,
        };
    }
    let Some(first) = options.first() else {
        let msg = "No movement types available".to_string();
        warn!("{}", msg);
        return DefaultSelection {
            value: None,
            warning: Some(msg),
        };
    };
    let msg = format!(
        "Default movement type position {} not available ({} options). Using '{}'.",
        index,
        options.len(),
        first
    );
    warn!("{}", msg);
    DefaultSelection {
        value: Some(first.clone()),
        warning: Some(msg),
    }
}
