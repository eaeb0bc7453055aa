//! Per-step prompt templates.
//!
//! Each template carries a `{category}` token and ends with output-format
//! instructions asking for a bare JSON array. Providers do not always
//! honour that, which is what the sanitizer is for.

use std::collections::HashMap;

use crate::domain::questionnaire::QuestionStep;

use super::params::Responses;

/// Token replaced with the product category when rendering.
pub const CATEGORY_TOKEN: &str = "{category}";

const CONTEXT_HEADER: &str = "\n\nPrevious responses context: ";

const FORMAT_INSTRUCTIONS: &str = r#"
IMPORTANT: Return ONLY a valid JSON array, with no markdown formatting and no code fences.
Each question object must have the fields 'id', 'question', 'type' and 'required'.
'type' must be exactly one of: 'text', 'select', 'multiselect', 'number', 'boolean'.
'required' must be a JSON boolean.
For 'select' and 'multiselect' questions include a non-empty 'options' array of strings."#;

const MANUFACTURING_TEMPLATE: &str = r#"Generate 5-7 relevant questions about manufacturing and sourcing for a {category} product.
Focus on:
- Ingredient and component sourcing transparency
- Manufacturing processes and locations
- Supply chain visibility
- Quality control measures
- Ethical sourcing practices
Make the questions specific to {category} industry standards."#;

const TESTING_TEMPLATE: &str = r#"Generate 5-7 relevant questions about testing and certifications for a {category} product.
Focus on:
- Quality testing procedures
- Safety certifications and standards
- Third-party testing and validation
- Compliance with industry regulations
- Testing frequency and protocols
Make the questions specific to {category} industry requirements."#;

const ENVIRONMENTAL_TEMPLATE: &str = r#"Generate 5-7 relevant questions about environmental impact for a {category} product.
Focus on:
- Sustainability practices
- Packaging materials and recyclability
- Carbon footprint and emissions
- Waste management and disposal
- Environmental certifications
Make the questions specific to {category} environmental considerations."#;

/// Prompt templates keyed by generation step.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    templates: HashMap<QuestionStep, String>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        let templates = QuestionStep::all()
            .iter()
            .map(|step| (*step, Self::builtin_template(*step)))
            .collect();
        Self { templates }
    }
}

impl PromptCatalog {
    /// Creates the catalog with the built-in templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the template for one step.
    pub fn with_template(mut self, step: QuestionStep, template: impl Into<String>) -> Self {
        self.templates.insert(step, template.into());
        self
    }

    /// Returns the unrendered template for a step.
    pub fn template(&self, step: QuestionStep) -> &str {
        self.templates
            .get(&step)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Renders the prompt for `(category, step)`.
    ///
    /// Every category token is substituted. Non-empty prior responses are
    /// appended as serialized JSON context.
    pub fn render(&self, step: QuestionStep, category: &str, prior_responses: &Responses) -> String {
        let mut prompt = self.template(step).replace(CATEGORY_TOKEN, category);

        if !prior_responses.is_empty() {
            if let Ok(context) = serde_json::to_string(prior_responses) {
                prompt.push_str(CONTEXT_HEADER);
                prompt.push_str(&context);
            }
        }

        prompt
    }

    fn builtin_template(step: QuestionStep) -> String {
        let (body, example_id, example_question, example_type) = match step {
            QuestionStep::Manufacturing => (
                MANUFACTURING_TEMPLATE,
                "mfg_1",
                "Where are the main ingredients sourced from?",
                "text",
            ),
            QuestionStep::Testing => (
                TESTING_TEMPLATE,
                "test_1",
                "Is the product FDA approved?",
                "boolean",
            ),
            QuestionStep::Environmental => (
                ENVIRONMENTAL_TEMPLATE,
                "env_1",
                "Is the packaging recyclable?",
                "boolean",
            ),
        };

        format!(
            "{body}\n{instructions}\nEvery 'id' must start with '{prefix}' and be unique.\n\nExample format:\n[\n  {{\n    \"id\": \"{example_id}\",\n    \"question\": \"{example_question}\",\n    \"type\": \"{example_type}\",\n    \"required\": true\n  }}\n]",
            instructions = FORMAT_INSTRUCTIONS,
            prefix = step.id_prefix(),
        )
    }
}
