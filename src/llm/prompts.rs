//! Prompt rendering for resume analysis

use crate::error::{PreconditionViolation, Result, ResumeLensError};
use crate::llm::schema::SchemaDescriptor;
use serde::{Deserialize, Serialize};

/// Inputs to the prompt: resume text plus the combined role context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub role_context: String,
}

impl AnalysisRequest {
    /// Build a request, combining role title and description.
    ///
    /// Returns `None` when both role fields are blank.
    pub fn new(resume_text: String, role_title: &str, role_description: &str) -> Option<Self> {
        let role_context = role_context(role_title, role_description)?;
        Some(Self {
            resume_text,
            role_context,
        })
    }
}

/// `"{title}\n\nDescription: {description}"`, or whichever half is present.
pub fn role_context(role_title: &str, role_description: &str) -> Option<String> {
    let title = role_title.trim();
    let description = role_description.trim();
    match (title.is_empty(), description.is_empty()) {
        (true, true) => None,
        (false, true) => Some(title.to_string()),
        (true, false) => Some(format!("Description: {}", description)),
        (false, false) => Some(format!("{}\n\nDescription: {}", title, description)),
    }
}

/// Prompt text and the schema the response must follow.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub prompt_text: String,
    pub output_schema: SchemaDescriptor,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            template: ANALYSIS_TEMPLATE.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&self, request: &AnalysisRequest) -> RenderedPrompt {
        let prompt_text = render_template(
            &self.template,
            &[
                ("role", request.role_context.as_str()),
                ("resume", request.resume_text.as_str()),
            ],
        );

        RenderedPrompt {
            prompt_text,
            output_schema: SchemaDescriptor::analysis_result(),
        }
    }

    /// Render a prompt outside a pipeline run, e.g. for a dry run.
    pub fn build_from_parts(
        &self,
        resume_text: String,
        role_title: &str,
        role_description: &str,
    ) -> Result<RenderedPrompt> {
        let request = AnalysisRequest::new(resume_text, role_title, role_description)
            .ok_or(ResumeLensError::Precondition(PreconditionViolation::EmptyRoleContext))?;
        Ok(self.build(&request))
    }
}

/// Substitute `{name}` placeholders in a single pass.
///
/// Substituted values are copied verbatim and never rescanned; braces that do
/// not form a known placeholder are left as they are.
fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

const ANALYSIS_TEMPLATE: &str = r#"Analyze this resume for a {role} position.
Provide a detailed evaluation in JSON format.
Resume Content: {resume}

Return exactly this JSON structure:
{
  "score": number,
  "missingKeywords": string[],
  "weakBulletPoints": [{ "original": string, "suggestion": string }],
  "atsFriendliness": string,
  "skillsFound": string[]
}"#;
