/// Server-side capability switched on for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Let the model write and run code while producing its answer.
    CodeExecution,
}

/// A single generate-content request.
///
/// Built once and never mutated; the fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    capabilities: Vec<Capability>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            capabilities: Vec::new(),
        }
    }

    /// Enables a capability. Enabling the same one twice is a no-op.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}
