//! What a chart renderer is handed: the points to draw, the kind, and the
//! coloring already resolved from the options.

use serde::Serialize;

use crate::messages::{Locale, empty_chart_message};
use crate::model::{ChartOptions, ChartType, DataItem, palette_color};

pub const NAME_FIELD: &str = "name";
pub const VALUE_FIELD: &str = "value";
pub const FILL_FIELD: &str = "fill";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ChartView {
    /// No data; the chart region shows the empty-state message instead
    Empty,
    Ready {
        kind: ChartType,
        title: String,
        points: Vec<DataItem>,
        /// Series color for single-series kinds. Multi-series kinds color
        /// each point through its `fill` field instead.
        stroke: Option<String>,
    },
}

impl ChartView {
    pub fn build(data: &[DataItem], options: &ChartOptions) -> Self {
        if data.is_empty() {
            return ChartView::Empty;
        }

        let kind = options.chart_type;
        let (points, stroke) = if kind.is_multi_series() {
            let points = data
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let mut point = item.clone();
                    point
                        .extra
                        .insert(FILL_FIELD.to_string(), palette_color(index).into());
                    point
                })
                .collect();
            (points, None)
        } else {
            (data.to_vec(), Some(options.color.clone()))
        };

        ChartView::Ready {
            kind,
            title: options.title.clone(),
            points,
            stroke,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartView::Empty)
    }

    pub fn empty_message(locale: Locale) -> &'static str {
        empty_chart_message(locale)
    }
}
