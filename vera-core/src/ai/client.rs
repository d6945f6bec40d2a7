//! AI Client Module
//!
//! Handles communication with Claude via CLI or direct API.

use crate::ai::prompts;
use crate::ai::responses;
use crate::ai::{QualityAnalysis, RequirementExtractor};
use crate::models::TestStep;
use crate::quality::QualityReport;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur during AI operations
#[derive(Error, Debug)]
pub enum AiError {
    #[error("AI CLI execution failed: {0}")]
    CliExecFailed(String),

    #[error("Invalid response from AI: {0}")]
    InvalidResponse(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("AI integration not available")]
    NotAvailable,
}

/// AI operation mode
#[derive(Debug, Clone, Default)]
pub enum AiMode {
    /// Use Claude CLI with --print flag
    ClaudeCli { path: PathBuf },
    /// Direct API integration (future)
    DirectApi { api_key: String },
    /// AI features disabled
    #[default]
    Disabled,
}

/// Client for the external language model service
#[derive(Debug, Clone)]
pub struct AiClient {
    mode: AiMode,
}

impl Default for AiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AiClient {
    /// Create a new AI client with auto-detected mode
    pub fn new() -> Self {
        Self {
            mode: Self::detect_mode(),
        }
    }

    /// Create a client with a specific mode
    pub fn with_mode(mode: AiMode) -> Self {
        Self { mode }
    }

    /// Detect the best available AI mode
    fn detect_mode() -> AiMode {
        if let Some(path) = Self::find_claude_cli() {
            return AiMode::ClaudeCli { path };
        }

        if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
            if !api_key.is_empty() {
                return AiMode::DirectApi { api_key };
            }
        }

        AiMode::Disabled
    }

    /// Find the claude CLI executable
    fn find_claude_cli() -> Option<PathBuf> {
        if let Ok(output) = Command::new("which").arg("claude").output() {
            if output.status.success() {
                let path_str = String::from_utf8_lossy(&output.stdout);
                let path = PathBuf::from(path_str.trim());
                if path.exists() {
                    return Some(path);
                }
            }
        }

        let candidates = ["/usr/local/bin/claude", "/usr/bin/claude"];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            let npm_global = PathBuf::from(home).join(".npm-global/bin/claude");
            if npm_global.exists() {
                return Some(npm_global);
            }
        }

        None
    }

    /// Check if AI features are available
    pub fn is_available(&self) -> bool {
        match &self.mode {
            AiMode::ClaudeCli { path } => path.exists(),
            AiMode::DirectApi { api_key } => !api_key.is_empty(),
            AiMode::Disabled => false,
        }
    }

    /// Get the current mode
    pub fn mode(&self) -> &AiMode {
        &self.mode
    }

    /// Get a description of the current mode
    pub fn mode_description(&self) -> String {
        match &self.mode {
            AiMode::ClaudeCli { path } => format!("Claude CLI ({})", path.display()),
            AiMode::DirectApi { .. } => "Direct API".to_string(),
            AiMode::Disabled => "Disabled".to_string(),
        }
    }

    /// Extract test steps from raw URS document text
    pub fn extract_test_steps(&self, document_text: &str) -> Result<Vec<TestStep>, AiError> {
        let prompt = prompts::build_extraction_prompt(document_text);
        let response = self.send_request(&prompt)?;
        let parsed = responses::parse_extraction_response(&response)?;
        Ok(parsed.test_steps)
    }

    /// Run the quality analysis over raw URS document text
    pub fn analyze_quality(&self, document_text: &str) -> Result<QualityReport, AiError> {
        let prompt = prompts::build_quality_prompt(document_text);
        let response = self.send_request(&prompt)?;
        responses::parse_quality_response(&response)
    }

    /// Send a request to the AI
    fn send_request(&self, prompt: &str) -> Result<String, AiError> {
        match &self.mode {
            AiMode::ClaudeCli { path } => self.send_cli_request(path, prompt),
            AiMode::DirectApi { api_key: _ } => {
                // Future: implement direct API
                Err(AiError::NotAvailable)
            }
            AiMode::Disabled => Err(AiError::NotAvailable),
        }
    }

    /// Send request via Claude CLI
    fn send_cli_request(&self, cli_path: &PathBuf, prompt: &str) -> Result<String, AiError> {
        // Use --print flag for non-interactive output
        // Use -p flag to pass the prompt
        let output = Command::new(cli_path)
            .arg("--print")
            .arg("-p")
            .arg(prompt)
            .output()
            .map_err(|e| AiError::CliExecFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.to_lowercase().contains("rate limit") {
                return Err(AiError::RateLimited);
            }
            return Err(AiError::CliExecFailed(format!(
                "Exit code: {:?}, stderr: {}",
                output.status.code(),
                stderr
            )));
        }

        let response = String::from_utf8_lossy(&output.stdout).to_string();

        if response.is_empty() {
            return Err(AiError::InvalidResponse("Empty response from CLI".to_string()));
        }

        Ok(response)
    }
}

impl RequirementExtractor for AiClient {
    fn extract(&self, document_text: &str) -> Result<Vec<TestStep>, AiError> {
        self.extract_test_steps(document_text)
    }
}

impl QualityAnalysis for AiClient {
    fn analyze(&self, document_text: &str) -> Result<QualityReport, AiError> {
        self.analyze_quality(document_text)
    }
}
