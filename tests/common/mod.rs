//! Common test utilities for integration tests
//!
//! Shared manifest fixtures used across the integration test files.

#![allow(dead_code)]

use std::path::PathBuf;

use maestro::domain::models::{
    AgentMode, Directive, IdentityProfile, Manifest, ManifestBuilder, TaskSpec,
};
use tempfile::TempDir;

pub const PROJECT_ID: &str = "proj_1";
pub const COORDINATOR_SESSION: &str = "sess_parent_1";

/// A builder for `mode` with one task, and a coordinator id when the mode
/// needs one.
pub fn builder(mode: AgentMode) -> ManifestBuilder {
    let builder = ManifestBuilder::new(mode, PROJECT_ID)
        .task(TaskSpec::new("task_1", "Implement login API").with_description("POST /login"));
    if mode.is_coordinated() {
        builder.coordinator(COORDINATOR_SESSION)
    } else {
        builder
    }
}

pub fn manifest(mode: AgentMode) -> Manifest {
    builder(mode).build().expect("fixture manifest is valid")
}

pub fn profile(id: &str, name: &str, role: &str) -> IdentityProfile {
    IdentityProfile::new(id, name, role).with_identity(format!("{name} is a careful {role}."))
}

pub fn directive(subject: &str, message: &str) -> Directive {
    Directive {
        subject: subject.to_string(),
        message: message.to_string(),
        from_session_id: Some(COORDINATOR_SESSION.to_string()),
    }
}

/// Write `json` to a manifest file in a fresh temp dir.
pub fn write_manifest(json: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("manifest.json");
    std::fs::write(&path, json).expect("Failed to write manifest");
    (dir, path)
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
