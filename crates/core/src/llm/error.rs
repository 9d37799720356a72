use crate::llm::Provider;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Http,
    Decode,
    NoChoices,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Http => "http",
            Stage::Decode => "decode",
            Stage::NoChoices => "no_choices",
        }
    }
}

/// A completion call that reached the provider but produced no usable text.
#[derive(Debug, Clone)]
pub struct CompletionDiagnosticsError {
    pub provider: Provider,
    pub stage: Stage,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl fmt::Display for CompletionDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "completion error (provider={:?}, stage={}): {}",
            self.provider,
            self.stage.as_str(),
            self.detail
        )
    }
}

impl std::error::Error for CompletionDiagnosticsError {}
