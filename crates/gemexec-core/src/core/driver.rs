//! Request driver: validates the credential, issues one code-execution
//! request and renders each response part as its own block.
//!
//! The flow is linear: `Unvalidated -> Requested -> Completed | Failed`.
//! Every block is awaited before the next one is started, so blocks appear
//! in the order the model produced the parts.

use anyhow::Result;
use gemexec_types::{Capability, GenerationRequest, GenerationResponse, Language, Outcome, Part};
use tracing::{debug, info, warn};

use crate::providers::GenerativeModel;
use crate::render::{OutputSurface, Renderer, fenced};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PROMPT: &str = "What is the sum of the first 50 prime numbers? \
Generate and run code for the calculation, and make sure you get all 50.";

pub const MISSING_CREDENTIAL_MESSAGE: &str = "## Error\n`API_KEY` environment variable not set.";
pub const ANNOUNCE_MESSAGE: &str = "Generating content with code execution...";
pub const NO_RESPONSE_MESSAGE: &str = "No response from Gemini.";

/// Inputs fixed at construction. The credential is resolved by the caller;
/// the driver never reads the environment.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub prompt: String,
}

impl DriverSettings {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No credential; nothing was sent.
    MissingCredential,
    /// Candidate parts were rendered (`skipped` parts had no usable shape).
    Parts { rendered: usize, skipped: usize },
    /// No parts; the top-level text was rendered.
    Summary,
    /// Neither parts nor text.
    NoResponse,
    /// The request or its processing failed; an error block was rendered.
    Failed,
}

/// Runs the single request/render flow.
///
/// `connect` builds the model client once the credential is known, so no
/// client exists when the credential is missing. A `connect` error is
/// rendered like any other request failure.
pub struct RequestDriver<F> {
    settings: DriverSettings,
    connect: F,
}

impl<F, M> RequestDriver<F>
where
    F: FnOnce(String) -> Result<M>,
    M: GenerativeModel,
{
    pub fn new(settings: DriverSettings, connect: F) -> Self {
        Self { settings, connect }
    }

    pub async fn run<S: OutputSurface>(self, renderer: &mut Renderer<S>) -> RunOutcome {
        let Self { settings, connect } = self;

        let Some(api_key) = settings.api_key else {
            warn!("no API key configured; skipping request");
            renderer.render_markdown(MISSING_CREDENTIAL_MESSAGE).await;
            return RunOutcome::MissingCredential;
        };

        // Awaited so the announcement always precedes the outcome blocks.
        renderer.render_markdown(ANNOUNCE_MESSAGE).await;

        let request = GenerationRequest::new(settings.model, settings.prompt)
            .with_capability(Capability::CodeExecution);

        match request_and_render(connect, api_key, &request, renderer).await {
            Ok(outcome) => {
                info!(?outcome, "request completed");
                outcome
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "request failed");
                renderer.render_markdown(failure_message(&err)).await;
                RunOutcome::Failed
            }
        }
    }
}

async fn request_and_render<F, M, S>(
    connect: F,
    api_key: String,
    request: &GenerationRequest,
    renderer: &mut Renderer<S>,
) -> Result<RunOutcome>
where
    F: FnOnce(String) -> Result<M>,
    M: GenerativeModel,
    S: OutputSurface,
{
    let model = connect(api_key)?;
    let response = model.generate(request).await?;
    Ok(render_response(response, renderer).await)
}

/// Applies the outcome policy: candidate parts, else top-level text, else a
/// fixed "no response" block. Only the first candidate is read.
pub async fn render_response<S: OutputSurface>(
    response: GenerationResponse,
    renderer: &mut Renderer<S>,
) -> RunOutcome {
    if let Some(reason) = response.block_reason() {
        info!(reason, "prompt was blocked");
    }
    if let Some(reason) = response
        .candidates
        .first()
        .and_then(|candidate| candidate.finish_reason.as_deref())
    {
        debug!(reason, "first candidate finished");
    }
    if response.candidates.len() > 1 {
        debug!(
            count = response.candidates.len(),
            "ignoring candidates after the first"
        );
    }

    if let Some(summary) = response.summary_text()
        && response.first_parts().is_none()
    {
        renderer.render_markdown(summary).await;
        return RunOutcome::Summary;
    }

    let Some(parts) = response.into_first_parts() else {
        renderer.render_markdown(NO_RESPONSE_MESSAGE).await;
        return RunOutcome::NoResponse;
    };

    let mut rendered = 0;
    let mut skipped = 0;
    for (index, wire) in parts.into_iter().enumerate() {
        match Part::try_from(wire) {
            Ok(part) => {
                log_part(index, &part);
                renderer.render_markdown(part_markdown(&part)).await;
                rendered += 1;
            }
            Err(err) => {
                warn!(index, error = %err, "skipping unrecognised response part");
                skipped += 1;
            }
        }
    }

    RunOutcome::Parts { rendered, skipped }
}

fn log_part(index: usize, part: &Part) {
    match part {
        Part::Text(_) => {}
        Part::ExecutableCode(code) if code.language != Language::Python => {
            debug!(index, language = ?code.language, "executable code is not tagged as Python");
        }
        Part::ExecutableCode(_) => {}
        Part::CodeExecutionResult(result) if result.outcome != Outcome::Ok => {
            warn!(index, outcome = ?result.outcome, "code execution did not succeed");
        }
        Part::CodeExecutionResult(_) => {}
    }
}

/// Markdown shown for one classified part.
pub fn part_markdown(part: &Part) -> String {
    match part {
        Part::Text(text) => text.clone(),
        Part::ExecutableCode(code) => {
            format!("**Executable Code:**\n{}", fenced("python", &code.code))
        }
        Part::CodeExecutionResult(result) => {
            format!("**Execution Result:**\n{}", fenced("", &result.output))
        }
    }
}

/// Error block for a failed request. `{:#}` keeps the context chain.
pub fn failure_message(err: &anyhow::Error) -> String {
    format!("## Error\nAn error occurred: {err:#}")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use gemexec_types::{Candidate, CodeExecutionResult, Content, ExecutableCode, WirePart};

    use super::*;
    use crate::providers::ProviderError;
    use crate::render::HtmlDocument;

    /// Scripted model: returns a canned result and records what it saw.
    #[derive(Clone, Default)]
    struct FakeModel {
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<GenerationRequest>>>,
        keys: Arc<Mutex<Vec<String>>>,
        reply: Arc<Mutex<Option<Result<GenerationResponse>>>>,
    }

    impl FakeModel {
        fn replying(reply: Result<GenerationResponse>) -> Self {
            let model = Self::default();
            *model.reply.lock().unwrap() = Some(reply);
            model
        }
    }

    impl GenerativeModel for FakeModel {
        async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(GenerationResponse::default()))
        }
    }

    async fn run_with(api_key: Option<&str>, model: &FakeModel) -> (RunOutcome, Vec<String>) {
        let settings = DriverSettings::new(api_key.map(str::to_string));
        let fake = model.clone();
        let driver = RequestDriver::new(settings, move |key| {
            fake.keys.lock().unwrap().push(key);
            Ok(fake)
        });
        let mut renderer = Renderer::new(HtmlDocument::new("test"));
        let outcome = driver.run(&mut renderer).await;
        (outcome, renderer.into_surface().blocks().to_vec())
    }

    fn response_with_parts(parts: Vec<WirePart>) -> GenerationResponse {
        GenerationResponse {
            candidates: vec![Candidate {
                content: Some(Content { parts, role: None }),
                finish_reason: None,
            }],
            ..GenerationResponse::default()
        }
    }

    fn text(value: &str) -> WirePart {
        WirePart {
            text: Some(value.to_string()),
            ..WirePart::default()
        }
    }

    fn code(value: &str) -> WirePart {
        WirePart {
            executable_code: Some(ExecutableCode {
                code: value.to_string(),
                ..ExecutableCode::default()
            }),
            ..WirePart::default()
        }
    }

    fn result(value: &str) -> WirePart {
        WirePart {
            code_execution_result: Some(CodeExecutionResult {
                output: value.to_string(),
                ..CodeExecutionResult::default()
            }),
            ..WirePart::default()
        }
    }

    #[tokio::test]
    async fn missing_credential_renders_error_without_request() {
        let model = FakeModel::default();

        let (outcome, blocks) = run_with(None, &model).await;

        assert_eq!(outcome, RunOutcome::MissingCredential);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert!(model.keys.lock().unwrap().is_empty());
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains("<h2>Error</h2>"));
        assert!(blocks[0].contains("<code>API_KEY</code>"));
    }

    #[tokio::test]
    async fn sends_fixed_request_with_code_execution() {
        let model = FakeModel::default();

        run_with(Some("secret"), &model).await;

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*model.keys.lock().unwrap(), vec!["secret".to_string()]);
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].model(), DEFAULT_MODEL);
        assert_eq!(seen[0].prompt(), DEFAULT_PROMPT);
        assert_eq!(seen[0].capabilities(), &[Capability::CodeExecution]);
    }

    #[tokio::test]
    async fn renders_one_block_per_part_in_order() {
        let model = FakeModel::replying(Ok(response_with_parts(vec![
            text("A"),
            code("print(1)"),
            result("1"),
        ])));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(
            outcome,
            RunOutcome::Parts {
                rendered: 3,
                skipped: 0
            }
        );
        assert_eq!(blocks.len(), 4);
        assert!(blocks[0].contains(ANNOUNCE_MESSAGE));
        assert_eq!(blocks[1], "<p>A</p>\n");
        assert!(blocks[2].contains("<strong>Executable Code:</strong>"));
        assert!(blocks[2].contains("<code class=\"language-python\">print(1)\n</code>"));
        assert!(blocks[3].contains("<strong>Execution Result:</strong>"));
        assert!(blocks[3].contains("<pre><code>1\n</code></pre>"));
    }

    #[tokio::test]
    async fn failed_execution_result_is_still_rendered() {
        let failed = WirePart {
            code_execution_result: Some(CodeExecutionResult {
                outcome: Outcome::Failed,
                output: "Traceback".to_string(),
            }),
            ..WirePart::default()
        };
        let model = FakeModel::replying(Ok(response_with_parts(vec![failed])));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(
            outcome,
            RunOutcome::Parts {
                rendered: 1,
                skipped: 0
            }
        );
        assert!(blocks[1].contains("<pre><code>Traceback\n</code></pre>"));
    }

    #[tokio::test]
    async fn unrecognised_parts_are_skipped() {
        let both = WirePart {
            text: Some("x".to_string()),
            ..code("y")
        };
        let model = FakeModel::replying(Ok(response_with_parts(vec![
            WirePart::default(),
            both,
            text("kept"),
        ])));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(
            outcome,
            RunOutcome::Parts {
                rendered: 1,
                skipped: 2
            }
        );
        assert_eq!(blocks, vec![
            format!("<p>{ANNOUNCE_MESSAGE}</p>\n"),
            "<p>kept</p>\n".to_string(),
        ]);
    }

    #[tokio::test]
    async fn summary_text_used_without_candidates() {
        let model = FakeModel::replying(Ok(GenerationResponse {
            text: Some("The sum is 5117.".to_string()),
            ..GenerationResponse::default()
        }));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(outcome, RunOutcome::Summary);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], "<p>The sum is 5117.</p>\n");
    }

    #[tokio::test]
    async fn whitespace_summary_text_is_still_rendered() {
        let model = FakeModel::replying(Ok(GenerationResponse {
            text: Some("  ".to_string()),
            ..GenerationResponse::default()
        }));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(outcome, RunOutcome::Summary);
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[1].contains(NO_RESPONSE_MESSAGE));
    }

    #[tokio::test]
    async fn parts_win_over_summary_text() {
        let mut response = response_with_parts(vec![text("from parts")]);
        response.text = Some("from summary".to_string());
        let model = FakeModel::replying(Ok(response));

        let (_, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].contains("from parts"));
    }

    #[tokio::test]
    async fn empty_response_renders_no_response_message() {
        let model = FakeModel::replying(Ok(GenerationResponse::default()));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(outcome, RunOutcome::NoResponse);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], format!("<p>{NO_RESPONSE_MESSAGE}</p>\n"));
    }

    #[tokio::test]
    async fn failure_renders_single_error_block() {
        let body = r#"{"error":{"message":"quota exceeded"}}"#;
        let model = FakeModel::replying(Err(ProviderError::http_status(429, body).into()));

        let (outcome, blocks) = run_with(Some("k"), &model).await;

        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].contains("<h2>Error</h2>"));
        assert!(blocks[1].contains("quota exceeded"));
    }

    #[tokio::test]
    async fn connect_failure_renders_error_block() {
        let settings = DriverSettings::new(Some("k".to_string()));
        let driver = RequestDriver::new(settings, |_key| -> Result<FakeModel> {
            Err(anyhow!("bad base url").context("resolve Gemini base URL"))
        });
        let mut renderer = Renderer::new(HtmlDocument::new("test"));

        let outcome = driver.run(&mut renderer).await;

        let blocks = renderer.into_surface().blocks().to_vec();
        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains(ANNOUNCE_MESSAGE));
        assert!(blocks[1].contains("resolve Gemini base URL: bad base url"));
    }

    #[test]
    fn failure_message_includes_context_chain() {
        let err = anyhow!("connection reset").context("send request");
        assert_eq!(
            failure_message(&err),
            "## Error\nAn error occurred: send request: connection reset"
        );
    }

    #[test]
    fn part_markdown_labels_code_and_results() {
        let code = Part::ExecutableCode(ExecutableCode {
            code: "print(1)".to_string(),
            ..ExecutableCode::default()
        });
        let result = Part::CodeExecutionResult(CodeExecutionResult {
            output: "1\n".to_string(),
            ..CodeExecutionResult::default()
        });

        assert_eq!(
            part_markdown(&code),
            "**Executable Code:**\n```python\nprint(1)\n```"
        );
        assert_eq!(part_markdown(&result), "**Execution Result:**\n```\n1\n```");
        assert_eq!(part_markdown(&Part::Text("*hi*".to_string())), "*hi*");
    }
}
