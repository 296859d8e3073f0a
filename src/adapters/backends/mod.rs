//! Agent backend adapters.
//!
//! One adapter per supported CLI. Adapters receive the same composed
//! envelope and differ only in how they hand it to their binary.

pub mod claude_code;
pub mod codex;
pub mod gemini;
pub mod registry;

pub use claude_code::ClaudeCodeBackend;
pub use codex::CodexBackend;
pub use gemini::GeminiBackend;
pub use registry::BackendRegistry;

use crate::domain::models::Manifest;

/// Permission modes that mean "run without asking".
const BYPASS_PERMISSION_MODES: &[&str] = &["bypassPermissions", "bypass", "yolo"];

pub(crate) fn wants_bypass(manifest: &Manifest) -> bool {
    manifest
        .session
        .permission_mode
        .as_deref()
        .is_some_and(|mode| BYPASS_PERMISSION_MODES.contains(&mode))
}

pub(crate) fn push_model(args: &mut Vec<String>, manifest: &Manifest) {
    if let Some(model) = manifest.session.model.as_deref() {
        args.push("--model".to_string());
        args.push(model.to_string());
    }
}
