//! File naming for exported charts. Rasterizing is done elsewhere.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Used when the chart title is empty
pub const DEFAULT_EXPORT_NAME: &str = "grafico";

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Every whitespace run becomes one `_`, edges included:
/// `"Ventas  2024 "` becomes `Ventas_2024_.png`
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let stem = WHITESPACE_RUN.replace_all(title, "_");
    let stem = if stem.is_empty() {
        DEFAULT_EXPORT_NAME
    } else {
        stem.as_ref()
    };
    format!("{}.{}", stem, format.extension())
}
