//! Code execution for the playground
//!
//! Source is sent to a remote compiler when one is configured with credentials.
//! Otherwise, or when the remote call fails, a local pseudo-execution scrapes
//! print statements so the playground still shows output. Results always say
//! which path produced them.

pub mod fallback;
pub mod service;
pub mod snippets;
pub mod types;

pub use fallback::pseudo_execute;
pub use service::{CompilerService, RemoteCompiler};
pub use snippets::{Snippet, SnippetStore};
pub use types::{CompileRequest, CompileResult, ExecutionMode, ExecutionStatus, Language};
