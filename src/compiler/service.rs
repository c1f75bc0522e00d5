//! Compiler service with local fallback

use crate::compiler::fallback::pseudo_execute;
use crate::compiler::types::{CompileRequest, CompileResult, ExecutionMode};
use crate::config::CompilerConfig;
use crate::error::SetuError;
use tracing::{debug, warn};

/// Remote code-execution service
pub trait RemoteCompiler {
    fn execute(&self, request: &CompileRequest) -> Result<CompileResult, SetuError>;
}

/// Runs code remotely when possible, locally otherwise
///
/// Execution never fails: every remote problem turns into a fallback result.
#[derive(Default)]
pub struct CompilerService {
    remote: Option<Box<dyn RemoteCompiler>>,
    api_key: Option<String>,
}

impl CompilerService {
    /// Service that only uses the local fallback
    pub fn local() -> Self {
        Self::default()
    }

    /// Service backed by a remote compiler, used only when `api_key` is set
    pub fn with_remote(remote: Box<dyn RemoteCompiler>, api_key: Option<String>) -> Self {
        Self {
            remote: Some(remote),
            api_key,
        }
    }

    /// Service for the configured credentials
    ///
    /// `remote` is only used when the configuration carries an API key.
    pub fn from_config(remote: Option<Box<dyn RemoteCompiler>>, config: &CompilerConfig) -> Self {
        match remote {
            Some(remote) => Self::with_remote(remote, config.api_key.clone()),
            None => Self::local(),
        }
    }

    /// True when a remote compiler and credentials are both configured
    pub fn has_remote(&self) -> bool {
        self.remote.is_some() && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn execute(&self, code: &str, language: &str, stdin: Option<&str>) -> CompileResult {
        match self.try_remote(code, language, stdin) {
            Ok(mut result) => {
                result.mode = ExecutionMode::Remote;
                result
            }
            Err(e) => {
                warn!(error = %e, language, "remote execution unavailable, using fallback");
                pseudo_execute(code, language)
            }
        }
    }

    fn try_remote(
        &self,
        code: &str,
        language: &str,
        stdin: Option<&str>,
    ) -> Result<CompileResult, SetuError> {
        let remote = match &self.remote {
            Some(remote) if self.has_remote() => remote,
            Some(_) => {
                return Err(SetuError::RemoteServiceUnavailable(
                    "missing compiler API key".to_string(),
                ))
            }
            None => {
                return Err(SetuError::RemoteServiceUnavailable(
                    "no remote compiler configured".to_string(),
                ))
            }
        };

        let request = CompileRequest::new(code, language, stdin);
        debug!(language_id = request.language_id, "submitting to remote compiler");
        remote.execute(&request)
    }
}
