//! Localized user-facing text.
//!
//! Every string a person sees when something goes wrong lives here, keyed by
//! locale and operation. Diagnostics never do; they go to the log.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display language for user-facing text and generated insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Language name used inside model instructions
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::Es => "Spanish",
            Locale::En => "English",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" | "es-es" | "spanish" => Ok(Locale::Es),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

/// A user-triggered flow that can fail with a displayable message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GenerateData,
    GenerateInsights,
    EditData,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GenerateData => "generate_data",
            Operation::GenerateInsights => "generate_insights",
            Operation::EditData => "edit_data",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single message shown when `operation` fails, whatever the cause.
pub fn failure_message(locale: Locale, operation: Operation) -> &'static str {
    match (locale, operation) {
        (Locale::Es, Operation::GenerateData) => {
            "No se pudieron generar los datos del gráfico desde la IA. Verifique su clave de API y la consulta."
        }
        (Locale::Es, Operation::GenerateInsights) => {
            "No se pudieron generar las ideas desde la IA."
        }
        (Locale::Es, Operation::EditData) => {
            "Por favor, ingrese un nombre válido y un valor numérico para el elemento."
        }
        (Locale::En, Operation::GenerateData) => {
            "Could not generate chart data from the AI. Check your API key and your prompt."
        }
        (Locale::En, Operation::GenerateInsights) => "Could not generate insights from the AI.",
        (Locale::En, Operation::EditData) => {
            "Please enter a valid name and a numeric value for the item."
        }
    }
}

/// Shown in place of a chart when there is nothing to draw
pub fn empty_chart_message(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "No hay datos para mostrar. Genere o añada elementos de datos.",
        Locale::En => "No data to display. Generate or add data items.",
    }
}
