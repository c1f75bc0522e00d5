//! Compiler request and result types

use serde::{Deserialize, Serialize};

/// Judge0 language id used when the language name is not recognised
pub const DEFAULT_LANGUAGE_ID: u32 = 71;

/// Judge0 status id for a successful run
pub const STATUS_ACCEPTED: u32 = 3;

/// Playground languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    Cpp,
    C,
    Html,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Html => "html",
        }
    }

    /// Judge0 language id
    pub fn judge0_id(&self) -> u32 {
        match self {
            Language::Python => 71,
            Language::Javascript => 63,
            Language::Java => 62,
            Language::Cpp => 54,
            Language::C => 50,
            Language::Html => 60,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "python" => Some(Language::Python),
            "javascript" => Some(Language::Javascript),
            "java" => Some(Language::Java),
            "cpp" => Some(Language::Cpp),
            "c" => Some(Language::C),
            "html" => Some(Language::Html),
            _ => None,
        }
    }

    /// Guess a language from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "js" | "mjs" => Some(Language::Javascript),
            "java" => Some(Language::Java),
            "cpp" | "cc" | "cxx" => Some(Language::Cpp),
            "c" => Some(Language::C),
            "html" | "htm" => Some(Language::Html),
            _ => None,
        }
    }
}

/// Submission sent to the remote compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileRequest {
    pub source_code: String,
    pub language_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

impl CompileRequest {
    /// Build a request, mapping unknown language names to Python
    pub fn new(source_code: &str, language: &str, stdin: Option<&str>) -> Self {
        Self {
            source_code: source_code.to_string(),
            language_id: Language::from_name(language)
                .map(|l| l.judge0_id())
                .unwrap_or(DEFAULT_LANGUAGE_ID),
            stdin: stdin.map(str::to_string),
        }
    }
}

/// Execution status reported by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub id: u32,
    pub description: String,
}

impl ExecutionStatus {
    pub fn accepted() -> Self {
        Self {
            id: STATUS_ACCEPTED,
            description: "Accepted".to_string(),
        }
    }
}

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Remote,
    Fallback,
}

/// Execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileResult {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub status: ExecutionStatus,
    /// Wall time in seconds, as reported
    pub time: String,
    /// Memory in KB
    pub memory: u64,
    #[serde(default)]
    pub mode: ExecutionMode,
}

impl CompileResult {
    pub fn is_fallback(&self) -> bool {
        self.mode == ExecutionMode::Fallback
    }
}
