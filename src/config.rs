use crate::error::{ReportError, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Material consumption reports from a movement CSV export
#[derive(Parser, Debug, Clone)]
#[command(name = "consumption_report", version)]
pub struct Settings {
    /// Semicolon-separated movement export
    #[arg(long, default_value = "Material-CSVANUAL.csv")]
    pub file: PathBuf,

    /// JSON file overriding the source column names
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Directory the CSV and JSON reports are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Position (in sorted order) of the default movement type
    #[arg(long, default_value = "6")]
    pub default_movement_index: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

/// Source column name for each canonical field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub item_code: String,
    pub item_description: String,
    pub movement_date: String,
    pub quantity: String,
    pub movement_type: String,
    pub requesting_unit: String,
    pub value: String,
    pub class_description: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            item_code: "Insumo".to_string(),
            item_description: "Descricao".to_string(),
            movement_date: "Dt Movimento".to_string(),
            quantity: "Quantidade".to_string(),
            movement_type: "Descricao Movimento".to_string(),
            requesting_unit: "Descricao Requisitante".to_string(),
            value: "Valor ".to_string(),
            class_description: "Classe".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Defaults, with any field present in `path` overridden.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mapping: ColumnMapping = serde_json::from_str(&text)?;
        if mapping.required().iter().any(|(_, col)| col.trim().is_empty()) {
            return Err(ReportError::Config(format!(
                "column mapping in {} has a blank required column",
                path.display()
            )));
        }
        Ok(mapping)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// `(canonical field, source column)` for every required field.
    pub fn required(&self) -> [(&'static str, &str); 5] {
        [
            ("item_code", self.item_code.as_str()),
            ("item_description", self.item_description.as_str()),
            ("movement_type", self.movement_type.as_str()),
            ("movement_date", self.movement_date.as_str()),
            ("quantity", self.quantity.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_settings_defaults() {
        let s = Settings::parse_from(["consumption_report"]);
        assert_eq!(s.file, PathBuf::from("Material-CSVANUAL.csv"));
        assert_eq!(s.default_movement_index, 6);
        assert_eq!(s.log_level, "INFO");
        assert!(s.mapping.is_none());
    }

    #[test]
    fn test_settings_rejects_unknown_log_level() {
        assert!(Settings::try_parse_from(["consumption_report", "--log-level", "TRACE"]).is_err());
    }

    #[test]
    fn test_mapping_partial_override() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{"quantity": "Qtd", "value": "Valor"}}"#).unwrap();
        let m = ColumnMapping::from_file(f.path()).unwrap();
        assert_eq!(m.quantity, "Qtd");
        assert_eq!(m.value, "Valor");
        assert_eq!(m.item_code, "Insumo");
    }

    #[test]
    fn test_mapping_blank_required_column() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{"item_code": " "}}"#).unwrap();
        assert!(matches!(
            ColumnMapping::from_file(f.path()),
            Err(ReportError::Config(_))
        ));
    }

    #[test]
    fn test_mapping_missing_file() {
        let err = ColumnMapping::load(Some(Path::new("/nonexistent/mapping.json"))).unwrap_err();
        assert!(matches!(err, ReportError::FileRead { .. }));
    }
}
