//! Chart data model: data points, chart-wide options and the closed set of
//! chart kinds.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ChartStudioError, Result};
use crate::messages::Locale;

pub const DEFAULT_CHART_COLOR: &str = "#3b82f6";
pub const DEFAULT_CHART_TITLE: &str = "Informe de Ventas T1-T2";

/// Per-position colors for multi-series chart kinds
pub const PALETTE: [&str; 12] = [
    "#3b82f6", "#ef4444", "#f97316", "#eab308", "#22c55e", "#14b8a6", "#6366f1", "#ec4899",
    "#8b5cf6", "#06b6d4", "#f59e0b", "#10b981",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// One chart data point.
///
/// Fields other than `id`, `name` and `value` are kept in `extra` so that
/// anything a renderer or the model attached survives a storage round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: String,
    pub name: String,
    pub value: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataItem {
    /// New item with a freshly generated id
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self::with_id(new_item_id(), name, value)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            extra: Map::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ChartStudioError::validation("data item id must not be empty"));
        }
        if !self.value.is_finite() {
            return Err(ChartStudioError::validation(format!(
                "data item '{}' has a non-finite value",
                self.name
            )));
        }
        Ok(())
    }
}

pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Checks every item and that ids are unique within the sequence
pub fn validate_items(items: &[DataItem]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        item.validate()?;
        if !seen.insert(item.id.as_str()) {
            return Err(ChartStudioError::validation(format!(
                "duplicate data item id '{}'",
                item.id
            )));
        }
    }
    Ok(())
}

/// The built-in dataset used on first start and when stored data is unusable
pub fn seed_data() -> Vec<DataItem> {
    [
        ("1", "Ene", 65.0),
        ("2", "Feb", 59.0),
        ("3", "Mar", 80.0),
        ("4", "Abr", 81.0),
        ("5", "May", 56.0),
        ("6", "Jun", 55.0),
    ]
    .into_iter()
    .map(|(id, name, value)| DataItem::with_id(id, name, value))
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Area,
    Radar,
    RadialBar,
    Treemap,
}

impl ChartType {
    pub const ALL: [ChartType; 7] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Area,
        ChartType::Radar,
        ChartType::RadialBar,
        ChartType::Treemap,
    ];

    /// Wire name, as stored and as sent to the model
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Area => "area",
            ChartType::Radar => "radar",
            ChartType::RadialBar => "radialBar",
            ChartType::Treemap => "treemap",
        }
    }

    /// Kinds that color each point from [`PALETTE`] and ignore `ChartOptions::color`
    pub fn is_multi_series(self) -> bool {
        matches!(self, ChartType::Pie | ChartType::RadialBar | ChartType::Treemap)
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Es, ChartType::Bar) => "Gráfico de Barras",
            (Locale::Es, ChartType::Line) => "Gráfico de Líneas",
            (Locale::Es, ChartType::Pie) => "Gráfico Circular",
            (Locale::Es, ChartType::Area) => "Gráfico de Área",
            (Locale::Es, ChartType::Radar) => "Gráfico de Radar",
            (Locale::Es, ChartType::RadialBar) => "Gráfico Radial",
            (Locale::Es, ChartType::Treemap) => "Mapa de Árbol",
            (Locale::En, ChartType::Bar) => "Bar Chart",
            (Locale::En, ChartType::Line) => "Line Chart",
            (Locale::En, ChartType::Pie) => "Pie Chart",
            (Locale::En, ChartType::Area) => "Area Chart",
            (Locale::En, ChartType::Radar) => "Radar Chart",
            (Locale::En, ChartType::RadialBar) => "Radial Bar Chart",
            (Locale::En, ChartType::Treemap) => "Treemap",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartStudioError;

    fn from_str(s: &str) -> Result<Self> {
        ChartType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ChartStudioError::validation(format!("unknown chart type '{s}'")))
    }
}

/// Chart-wide presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub color: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_CHART_TITLE.to_string(),
            chart_type: ChartType::Bar,
            color: DEFAULT_CHART_COLOR.to_string(),
        }
    }
}

impl ChartOptions {
    pub fn validate(&self) -> Result<()> {
        if !is_hex_color(&self.color) {
            return Err(ChartStudioError::validation(format!(
                "chart color '{}' is not a hex color",
                self.color
            )));
        }
        Ok(())
    }
}

/// Field-by-field override for [`ChartOptions`]; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChartOptionsPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn chart_type(chart_type: ChartType) -> Self {
        Self {
            chart_type: Some(chart_type),
            ..Default::default()
        }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, options: &mut ChartOptions) {
        if let Some(title) = self.title {
            options.title = title;
        }
        if let Some(chart_type) = self.chart_type {
            options.chart_type = chart_type;
        }
        if let Some(color) = self.color {
            options.color = color;
        }
    }
}

/// `#rgb` or `#rrggbb`
pub fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
