//! Versioned instruction templates sent to the inference API.
//!
//! Each prompt carries a stable id, a version and a checksum of its template
//! so that a logged request can be traced back to the exact wording used.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CHART_DATA_PROMPT_ID: &str = "chart-data-v1";
pub const CHART_INSIGHT_PROMPT_ID: &str = "chart-insight-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Stable identifier (format: category-name-v1)
    pub id: String,
    pub one_liner: String,
    pub version: String,
    /// SHA1 checksum of the template
    pub checksum: String,
    /// Template text with `{{name}}` placeholders
    pub template: String,
}

impl Prompt {
    pub fn new(
        id: impl Into<String>,
        one_liner: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        let template = template.into();
        Self {
            id: id.into(),
            one_liner: one_liner.into(),
            version: "1.0.0".to_string(),
            checksum: sha1_checksum(&template),
            template,
        }
    }

    /// Substitute every `{{key}}` in a single pass, so placeholder-looking
    /// text inside a value is never expanded. Unknown placeholders are left
    /// in place.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

fn sha1_checksum(content: &str) -> String {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, Arc<Prompt>>,
}

impl PromptRegistry {
    /// Create new registry with core prompts
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_core_prompts();
        registry
    }

    pub fn register(&mut self, prompt: Prompt) {
        debug!(
            id = %prompt.id,
            version = %prompt.version,
            checksum = %prompt.checksum,
            "Registered prompt: {}",
            prompt.one_liner
        );
        self.prompts.insert(prompt.id.clone(), Arc::new(prompt));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Prompt>> {
        self.prompts.get(id).cloned()
    }

    fn register_core_prompts(&mut self) {
        self.register(Prompt::new(
            CHART_DATA_PROMPT_ID,
            "Synthesize a chart dataset from a description",
            "You are an expert data generation assistant. Based on the user's prompt, create a JSON array of objects to be used in a chart.\n\
Each object in the array MUST have two properties:\n\
1. \"name\": a string representing the label for a data point (e.g., a month, a category).\n\
2. \"value\": a number representing the value for that data point.\n\
\n\
The user wants data for: \"{{prompt}}\"\n\
\n\
Generate a reasonable number of data points (between 5 and 12) unless the user specifies otherwise.\n\
Return ONLY the raw JSON array, without any explanations, comments, or markdown fences.",
        ));

        self.register(Prompt::new(
            CHART_INSIGHT_PROMPT_ID,
            "Short narrative analysis of the current chart",
            "You are an expert data analyst. Your task is to provide a brief, insightful summary of the provided chart data.\n\
Analyze the data considering the chart's title and type.\n\
The summary should be concise, easy to understand, and limited to one or two key observations.\n\
\n\
Chart Information:\n\
- Title: \"{{title}}\"\n\
- Type: \"{{chart_type}}\"\n\
- Data: {{data}}\n\
\n\
Provide the analysis in {{language}}.",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_prompts_are_registered() {
        let registry = PromptRegistry::new();
        assert!(registry.get(CHART_DATA_PROMPT_ID).is_some());
        assert!(registry.get(CHART_INSIGHT_PROMPT_ID).is_some());
        assert!(registry.get("unknown-v1").is_none());
    }

    #[test]
    fn render_replaces_placeholders_verbatim() {
        let prompt = Prompt::new("t-v1", "test", "A {{x}} and {{x}}, not {{y}}");
        assert_eq!(
            prompt.render(&[("x", "\"quoted\"")]),
            "A \"quoted\" and \"quoted\", not {{y}}"
        );
    }

    #[test]
    fn placeholders_inside_values_are_not_expanded() {
        let prompt = Prompt::new("t-v1", "test", "{{a}}|{{b}}");
        assert_eq!(prompt.render(&[("a", "{{b}}"), ("b", "B")]), "{{b}}|B");
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        let prompt = Prompt::new("t-v1", "test", "x {{open");
        assert_eq!(prompt.render(&[("open", "no")]), "x {{open");
    }

    #[test]
    fn checksum_tracks_template() {
        let a = Prompt::new("a", "", "same");
        let b = Prompt::new("b", "", "same");
        let c = Prompt::new("c", "", "different");
        assert_eq!(a.checksum, b.checksum);
        assert_ne!(a.checksum, c.checksum);
        assert_eq!(a.checksum.len(), 40);
    }
}
