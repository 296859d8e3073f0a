//! Prompt composition integration tests.

mod common;

use maestro::domain::models::{
    AgentMode, ComposeContext, IdentityProfile, Manifest, TaskContext, TaskSpec,
};
use maestro::{DomainError, PromptComposer};
use proptest::prelude::*;

use common::{builder, count, directive, profile, COORDINATOR_SESSION};

fn ctx() -> ComposeContext {
    ComposeContext::new("sess_1700000000000_abcd1234")
}

fn compose(manifest: &Manifest) -> maestro::PromptEnvelope {
    PromptComposer::new()
        .compose(manifest, &ctx())
        .expect("composition succeeds")
}

#[test]
fn test_composition_is_byte_identical_across_calls() {
    let manifest = builder(AgentMode::CoordinatedWorker)
        .profile(profile("tm_1", "Ada", "backend"))
        .teammate(profile("tm_2", "Grace", "frontend"))
        .directive(directive("Start", "Pick up the login task"))
        .reference_task("ref_1")
        .build()
        .unwrap();

    let composer = PromptComposer::new();
    let first = composer.compose(&manifest, &ctx()).unwrap();
    let second = composer.compose(&manifest.clone(), &ctx()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_worker_with_two_reference_tasks() {
    let manifest = builder(AgentMode::Worker)
        .reference_task("ref_a")
        .reference_task("ref_b")
        .reference_task("ref_a")
        .build()
        .unwrap();
    let envelope = compose(&manifest);

    assert_eq!(count(&envelope.task, "<session_context>"), 1);
    assert_eq!(count(&envelope.task, "<reference_tasks>"), 1);
    assert!(envelope.task.contains("<reference_task id=\"ref_a\"/>"));
    assert!(envelope.task.contains("<reference_task id=\"ref_b\"/>"));
    assert_eq!(count(&envelope.task, "<reference_task id="), 2);
    assert!(!envelope.task.contains("maestro task get <taskId>"));
    assert!(envelope.task.contains("maestro task get &lt;taskId&gt;"));
    assert!(envelope
        .task
        .contains("<session_id>sess_1700000000000_abcd1234</session_id>"));
    assert!(envelope.task.contains("<mode>worker</mode>"));

    assert!(!envelope.system.contains("ref_a"));
    assert!(!envelope.system.contains("<coordination_context>"));
}

#[test]
fn test_coordinated_worker_receives_directive_in_system_prompt() {
    let manifest = builder(AgentMode::CoordinatedWorker)
        .directive(directive("Kickoff", "Implement the login endpoint first"))
        .build()
        .unwrap();
    let envelope = compose(&manifest);

    assert!(envelope
        .system
        .starts_with("<maestro_system_prompt mode=\"coordinated-worker\""));
    assert_eq!(count(&envelope.system, "<coordination_context>"), 1);
    assert!(envelope.system.contains(&format!(
        "<coordinator_session_id>{COORDINATOR_SESSION}</coordinator_session_id>"
    )));
    assert!(envelope.system.contains(&format!(
        "<initial_directive from_session_id=\"{COORDINATOR_SESSION}\">"
    )));
    assert!(envelope.system.contains("<subject>Kickoff</subject>"));
    assert!(envelope
        .system
        .contains("<message>Implement the login endpoint first</message>"));
    assert!(!envelope.task.contains("Implement the login endpoint first"));
    assert!(envelope.system.contains("<workflow template=\"coordinated-worker-default\""));
}

#[test]
fn test_legacy_alias_renders_canonical_mode() {
    let json = format!(
        r#"{{"mode":"execute","coordinatorSessionId":"{COORDINATOR_SESSION}","projectId":"proj_1","tasks":[{{"id":"t1","title":"Build"}}]}}"#
    );
    let manifest = Manifest::from_json(&json).unwrap();
    let envelope = compose(&manifest);
    assert!(envelope.system.contains("mode=\"coordinated-worker\""));
    assert!(envelope.task.contains("<mode>coordinated-worker</mode>"));
}

#[test]
fn test_coordinator_identity_policy() {
    let two = builder(AgentMode::Coordinator)
        .profile(profile("tm_1", "Lead", "lead"))
        .profile(profile("tm_2", "Architect", "architect"))
        .build()
        .unwrap();

    let err = PromptComposer::new().compose(&two, &ctx()).unwrap_err();
    assert!(matches!(
        err,
        DomainError::IdentityPolicyViolation { found: 2, .. }
    ));

    let relaxed = PromptComposer::new()
        .with_permissive_identity(true)
        .compose(&two, &ctx())
        .unwrap();
    assert!(relaxed.system.contains("<self_identity merged=\"false\">"));
    assert!(relaxed.system.contains("id=\"tm_1\""));
    assert!(!relaxed.system.contains("Architect is a careful architect."));

    let none = builder(AgentMode::Coordinator).build().unwrap();
    assert!(PromptComposer::new().compose(&none, &ctx()).is_err());

    let manifest_opt_in = builder(AgentMode::Coordinator).permissive_identity(true).build().unwrap();
    let envelope = PromptComposer::new().compose(&manifest_opt_in, &ctx()).unwrap();
    assert!(!envelope.system.contains("<self_identity"));
}

#[test]
fn test_manifest_flag_overrides_permissive_default() {
    let two = builder(AgentMode::CoordinatedCoordinator)
        .profile(profile("tm_1", "Lead", "lead"))
        .profile(profile("tm_2", "Architect", "architect"))
        .permissive_identity(false)
        .build()
        .unwrap();
    let composer = PromptComposer::new().with_permissive_identity(true);
    assert!(composer.compose(&two, &ctx()).is_err());
}

#[test]
fn test_worker_merges_multiple_identities() {
    let manifest = builder(AgentMode::Worker)
        .profile(profile("tm_1", "Ada", "backend"))
        .profile(profile("tm_2", "Grace", "frontend"))
        .build()
        .unwrap();
    let envelope = compose(&manifest);

    assert!(envelope.system.contains("<self_identity merged=\"true\">"));
    assert!(envelope
        .system
        .contains("<combined_role>Ada (backend), Grace (frontend)</combined_role>"));
    assert!(envelope.system.contains("<instructions>Ada is a careful backend.</instructions>"));
    assert!(envelope.system.contains("<instructions>Grace is a careful frontend.</instructions>"));
    assert!(!envelope.task.contains("careful"));
}

#[test]
fn test_team_lens_excludes_own_identity() {
    let worker = builder(AgentMode::Worker)
        .profile(profile("tm_1", "Ada", "backend"))
        .teammate(profile("tm_1", "Ada", "backend"))
        .teammate(profile("tm_2", "Grace", "frontend"))
        .build()
        .unwrap();
    let envelope = compose(&worker);

    assert!(envelope.system.contains("<team_members lens=\"full_expertise\">"));
    assert_eq!(count(&envelope.system, "<team_member "), 1);
    assert!(envelope.system.contains("<team_member id=\"tm_2\" name=\"Grace\" role=\"frontend\">"));
    assert!(envelope.system.contains("<expertise>Grace is a careful frontend.</expertise>"));

    let coordinator = builder(AgentMode::Coordinator)
        .profile(profile("tm_lead", "Lead", "lead"))
        .teammate(profile("tm_lead", "Lead", "lead"))
        .teammate(profile("tm_2", "Grace", "frontend"))
        .build()
        .unwrap();
    let envelope = compose(&coordinator);
    assert!(envelope.system.contains("<team_members lens=\"slim_roster\">"));
    assert!(envelope.system.contains("<team_member id=\"tm_2\" name=\"Grace\" role=\"frontend\"/>"));
    assert!(!envelope.system.contains("<expertise>"));
    assert!(!envelope.system.contains("id=\"tm_lead\" name=\"Lead\" role=\"lead\"/>"));
}

#[test]
fn test_team_section_omitted_when_only_self_available() {
    let manifest = builder(AgentMode::Worker)
        .profile(profile("tm_1", "Ada", "backend"))
        .teammate(profile("tm_1", "Ada", "backend"))
        .build()
        .unwrap();
    assert!(!compose(&manifest).system.contains("<team_members"));
}

#[test]
fn test_task_tree_rendered_for_parent_links() {
    let manifest = builder(AgentMode::Worker)
        .task(TaskSpec::new("t_child", "Child").with_parent("task_1"))
        .task(TaskSpec::new("t_grandchild", "Grandchild").with_parent("t_child"))
        .strategy("tree")
        .build()
        .unwrap();
    let envelope = compose(&manifest);

    assert_eq!(count(&envelope.task, "<task_tree>"), 1);
    assert!(envelope.task.contains(
        "    <node id=\"task_1\" title=\"Implement login API\">\n      <node id=\"t_child\" title=\"Child\">\n        <node id=\"t_grandchild\" title=\"Grandchild\"/>\n"
    ));
    assert!(envelope.task.contains("<tasks count=\"3\">"));
    assert!(envelope.task.contains("parent_id=\"t_child\""));
    assert!(envelope.system.contains("<workflow template=\"worker-tree\""));
}

#[test]
fn test_single_task_has_no_tree() {
    let envelope = compose(&builder(AgentMode::Worker).build().unwrap());
    assert!(!envelope.task.contains("<task_tree>"));
    assert!(envelope.task.contains("<description>POST /login</description>"));
}

#[test]
fn test_commands_reference_matches_capabilities() {
    let manifest = builder(AgentMode::CoordinatedCoordinator)
        .profile(profile("tm_1", "Lead", "lead"))
        .build()
        .unwrap();
    let (envelope, capabilities) = PromptComposer::new()
        .compose_with_capabilities(&manifest, &ctx())
        .unwrap();

    assert!(!envelope.system.contains("name=\"session:spawn\""));
    assert!(envelope
        .system
        .contains("<capability name=\"can_spawn_sessions\" enabled=\"false\"/>"));
    for allowed in &capabilities.allowed_commands {
        assert!(
            envelope.system.contains(&format!("<command name=\"{allowed}\"")),
            "{allowed} missing from commands reference"
        );
    }
    assert_eq!(
        count(&envelope.system, "<command name="),
        capabilities.allowed_commands.len()
    );
}

#[test]
fn test_custom_workflow_beats_strategy() {
    let manifest = builder(AgentMode::Worker)
        .profile(profile("tm_1", "Ada", "backend").with_custom_workflow("Write tests first & ship"))
        .strategy("tree")
        .build()
        .unwrap();
    let envelope = compose(&manifest);
    assert!(envelope.system.contains(
        "<workflow source=\"custom\" profile_id=\"tm_1\">Write tests first &amp; ship</workflow>"
    ));
    assert!(!envelope.system.contains("template=\"worker-tree\""));
}

#[test]
fn test_profile_template_for_other_mode_is_ignored() {
    let manifest = builder(AgentMode::Worker)
        .profile(profile("tm_1", "Ada", "backend").with_workflow_template("coordinator-dag"))
        .build()
        .unwrap();
    let envelope = compose(&manifest);
    assert!(envelope.system.contains("<workflow template=\"worker-simple\""));
}

#[test]
fn test_context_block_rendered_in_task_prompt() {
    let manifest = builder(AgentMode::Worker)
        .context(TaskContext {
            codebase_context: Some("Axum service in crates/api".to_string()),
            project_standards: None,
            related_tasks: vec!["task_9".to_string()],
        })
        .build()
        .unwrap();
    let envelope = compose(&manifest);
    assert!(envelope
        .task
        .contains("<codebase_context>Axum service in crates/api</codebase_context>"));
    assert!(envelope.task.contains("<related_task id=\"task_9\"/>"));
    assert!(!envelope.system.contains("Axum"));
}

#[test]
fn test_user_text_is_escaped() {
    let manifest = builder(AgentMode::Worker)
        .task(TaskSpec::new("t2", "Fix <script> & \"quotes\""))
        .build()
        .unwrap();
    let envelope = compose(&manifest);
    assert!(envelope
        .task
        .contains("<title>Fix &lt;script&gt; &amp; &quot;quotes&quot;</title>"));
    assert!(!envelope.task.contains("<script>"));
}

#[test]
fn test_deep_parent_chain_loads_and_composes() {
    const DEPTH: usize = 10_000;
    let tasks: Vec<serde_json::Value> = (0..DEPTH)
        .map(|i| {
            if i == 0 {
                serde_json::json!({"id": "t0", "title": "Step 0"})
            } else {
                serde_json::json!({
                    "id": format!("t{i}"),
                    "title": format!("Step {i}"),
                    "parentId": format!("t{}", i - 1),
                })
            }
        })
        .collect();
    let raw = serde_json::json!({"mode": "worker", "projectId": "proj_1", "tasks": tasks});

    let manifest = Manifest::from_json(&raw.to_string()).expect("deep chain is a valid manifest");
    assert!(manifest.has_task_tree());

    let envelope = compose(&manifest);
    assert_eq!(count(&envelope.task, "<node id="), DEPTH);
    assert_eq!(count(&envelope.task, "</node>"), DEPTH - 1);
    assert!(envelope.task.contains("<node id=\"t9999\" title=\"Step 9999\"/>"));
    assert_eq!(count(&envelope.task, "<session_context>"), 1);
}

fn any_mode() -> impl Strategy<Value = AgentMode> {
    prop::sample::select(AgentMode::ALL.to_vec())
}

proptest! {
    /// Task text never leaks into the system prompt, identity text never
    /// leaks into the task prompt, and the session context appears once.
    #[test]
    fn prop_prompt_parts_stay_separate(
        mode in any_mode(),
        titles in prop::collection::vec("[a-z]{1,12}", 1..6),
        instructions in "[a-z ]{1,24}",
    ) {
        let mut b = builder(mode).profile(
            IdentityProfile::new("tm_1", "Ada", "backend").with_identity(format!("INSTR-{instructions}")),
        );
        for (i, title) in titles.iter().enumerate() {
            b = b.task(TaskSpec::new(format!("extra_{i}"), format!("TITLE-{title}")));
        }
        let manifest = b.build().unwrap();
        let envelope = PromptComposer::new().compose(&manifest, &ctx()).unwrap();

        prop_assert_eq!(count(&envelope.task, "<session_context>"), 1);
        prop_assert!(!envelope.system.contains("TITLE-"));
        prop_assert!(!envelope.system.contains("sess_1700000000000_abcd1234"));
        prop_assert!(!envelope.task.contains("INSTR-"));
        prop_assert!(envelope.system.contains("INSTR-"));
        prop_assert_eq!(count(&envelope.task, "<task id="), titles.len() + 1);

        let again = PromptComposer::new().compose(&manifest, &ctx()).unwrap();
        prop_assert_eq!(envelope, again);
    }
}
