use std::fmt;

use serde::Deserialize;

/// Parsed `generateContent` response.
///
/// Every field is optional on the wire, so missing keys deserialize to empty
/// values instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Top-level text summary. Only some proxies send it; the REST API does not.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerationResponse {
    /// Parts of the first candidate, if it has any.
    ///
    /// Later candidates are never consulted.
    pub fn first_parts(&self) -> Option<&[WirePart]> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        (!parts.is_empty()).then_some(parts.as_slice())
    }

    /// Owned variant of [`Self::first_parts`].
    pub fn into_first_parts(self) -> Option<Vec<WirePart>> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        (!parts.is_empty()).then_some(parts)
    }

    /// Top-level text, when present and non-empty.
    pub fn summary_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    /// Reason the prompt was blocked, when the service reports one.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// One generated alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<WirePart>,
    #[serde(default)]
    pub role: Option<String>,
}

/// A content part as it arrives on the wire: any subset of the known shapes
/// may be present. Convert with `Part::try_from` before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub executable_code: Option<ExecutableCode>,
    #[serde(default)]
    pub code_execution_result: Option<CodeExecutionResult>,
}

/// Source code the model generated for server-side execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutableCode {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub code: String,
}

/// Output of running an [`ExecutableCode`] part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CodeExecutionResult {
    #[serde(default)]
    pub outcome: Outcome,
    #[serde(default)]
    pub output: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Language {
    #[serde(rename = "PYTHON")]
    Python,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Outcome {
    #[serde(rename = "OUTCOME_OK")]
    Ok,
    #[serde(rename = "OUTCOME_FAILED")]
    Failed,
    #[serde(rename = "OUTCOME_DEADLINE_EXCEEDED")]
    DeadlineExceeded,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// A classified response part. Exactly one shape per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    ExecutableCode(ExecutableCode),
    CodeExecutionResult(CodeExecutionResult),
}

/// Why a [`WirePart`] could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartError {
    /// None of the known shapes is present (e.g. inline data, empty text).
    Empty,
    /// More than one shape is present; the listed field names were populated.
    Ambiguous(Vec<&'static str>),
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartError::Empty => write!(f, "part has no text, executableCode or codeExecutionResult"),
            PartError::Ambiguous(shapes) => {
                write!(f, "part has more than one shape: {}", shapes.join(", "))
            }
        }
    }
}

impl std::error::Error for PartError {}

impl TryFrom<WirePart> for Part {
    type Error = PartError;

    fn try_from(part: WirePart) -> Result<Self, Self::Error> {
        // Empty text carries nothing to show; treat it as absent.
        let text = part.text.filter(|text| !text.is_empty());
        match (text, part.executable_code, part.code_execution_result) {
            (Some(text), None, None) => Ok(Part::Text(text)),
            (None, Some(code), None) => Ok(Part::ExecutableCode(code)),
            (None, None, Some(result)) => Ok(Part::CodeExecutionResult(result)),
            (None, None, None) => Err(PartError::Empty),
            (text, code, result) => {
                let mut shapes = Vec::new();
                if text.is_some() {
                    shapes.push("text");
                }
                if code.is_some() {
                    shapes.push("executableCode");
                }
                if result.is_some() {
                    shapes.push("codeExecutionResult");
                }
                Err(PartError::Ambiguous(shapes))
            }
        }
    }
}
