//! Integration tests for the interview agent against a mock provider

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use ai_interviewer::interview::{
    AgentConfig, AgentError, Difficulty, InterviewType, InterviewerAgent, Role, SessionConfig,
    SESSION_NOT_SET,
};
use ai_interviewer::openai::ProviderError;
use common::spawn_mock_provider;

fn coding_session() -> SessionConfig {
    SessionConfig {
        company: "Acme".to_string(),
        position: "Backend Engineer".to_string(),
        interview_type: InterviewType::Coding,
        recruiter_material: None,
        difficulty: Some(Difficulty::Hard),
    }
}

/// Test that the first answered turn records system, user and assistant entries
#[tokio::test]
async fn test_first_turn_seeds_system_prompt_and_replies() {
    let provider = spawn_mock_provider().await;
    let mut agent = provider.agent();
    agent.set_session_data(coding_session());

    let reply = agent.process_input("hello").await.unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.response, "Interviewer reply to: hello");

    let roles: Vec<Role> = agent.transcript().turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(agent.turns(), 1);

    let instructions = provider.log.instructions();
    assert_eq!(instructions.len(), 1);
    assert!(instructions[0].contains("Backend Engineer"));
    assert!(instructions[0].contains("Acme"));
    assert!(instructions[0].contains("Hard"));
}

/// Test that later turns reuse the provider thread and assistant
#[tokio::test]
async fn test_thread_and_assistant_reused_across_turns() {
    let provider = spawn_mock_provider().await;
    let mut agent = provider.agent();
    agent.set_session_data(coding_session());

    agent.process_input("hello").await.unwrap();
    let second = agent.process_input("I would use a hash map").await.unwrap();

    assert_eq!(second.response, "Interviewer reply to: I would use a hash map");
    assert_eq!(provider.log.count("create_thread"), 1);
    assert_eq!(provider.log.count("create_assistant"), 1);
    assert_eq!(provider.log.count("create_run"), 2);

    // System prompt is only injected once
    let systems = agent
        .transcript()
        .turns()
        .iter()
        .filter(|t| t.role == Role::System)
        .count();
    assert_eq!(systems, 1);
    assert_eq!(agent.transcript().len(), 5);
}

/// Test that in-progress runs are polled until they finish
#[tokio::test]
async fn test_polls_until_run_completes() {
    let provider = spawn_mock_provider().await;
    provider.log.polls_before_done.store(3, Ordering::SeqCst);

    let mut agent = provider.agent();
    agent.set_session_data(coding_session());
    agent.process_input("hello").await.unwrap();

    assert_eq!(provider.log.count("retrieve_run"), 4);
    assert_eq!(provider.log.count("list_messages"), 1);
}

/// Test that input before configuration is answered locally
#[tokio::test]
async fn test_unconfigured_agent_never_calls_provider() {
    let provider = spawn_mock_provider().await;
    let mut agent = provider.agent();

    let reply = agent.process_input("hello").await.unwrap();

    assert_eq!(reply.status, 400);
    assert_eq!(reply.response, SESSION_NOT_SET);
    assert!(agent.transcript().is_empty());
    assert!(provider.log.calls().is_empty());
}

/// Test that a failed run reports the provider's error code and message
#[tokio::test]
async fn test_failed_run_surfaces_provider_reason() {
    let provider = spawn_mock_provider().await;
    provider.log.fail_runs.store(true, Ordering::SeqCst);

    let mut agent = provider.agent();
    agent.set_session_data(coding_session());

    let err = agent.process_input("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::RunFailed(_)));
    assert_eq!(err.status_code(), 502);
    assert_eq!(
        err.to_string(),
        "Model run failed: server_error: model overloaded"
    );
    assert_eq!(agent.turns(), 0);
    assert_eq!(provider.log.count("list_messages"), 0);
}

/// Test that a run exceeding max_run_wait is abandoned
#[tokio::test]
async fn test_run_wait_limit_times_out() {
    let provider = spawn_mock_provider().await;
    provider.log.polls_before_done.store(usize::MAX, Ordering::SeqCst);

    let config = AgentConfig {
        poll_interval: Duration::from_millis(5),
        max_run_wait: Some(Duration::from_millis(30)),
        ..AgentConfig::default()
    };
    let mut agent = InterviewerAgent::new(provider.client(), config);
    agent.set_session_data(coding_session());

    let err = agent.process_input("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::RunTimedOut { .. }));
    assert_eq!(err.status_code(), 504);
    assert!(provider.log.count("retrieve_run") >= 2);
}

/// Test summary gating and that the summary reuses the interview thread
#[tokio::test]
async fn test_summary_after_two_turns_uses_same_thread() {
    let provider = spawn_mock_provider().await;
    let mut agent = provider.agent();
    agent.set_session_data(coding_session());

    let early = agent.get_summary().await.unwrap();
    assert_eq!(early.response, "Not enough conversations");
    assert!(provider.log.calls().is_empty());

    agent.process_input("hello").await.unwrap();
    let still_early = agent.get_summary().await.unwrap();
    assert_eq!(still_early.response, "Not enough conversations");

    agent.process_input("my approach is BFS").await.unwrap();
    let summary = agent.get_summary().await.unwrap();

    assert_eq!(summary.status, 200);
    assert!(summary.response.starts_with("Interviewer reply to: Analyze the conversation"));
    assert_eq!(provider.log.count("create_thread"), 1);
    // Summary is not an interview turn
    assert_eq!(agent.turns(), 2);
}

/// Test that a new configuration drops the old thread and transcript
#[tokio::test]
async fn test_reconfigure_starts_fresh_thread() {
    let provider = spawn_mock_provider().await;
    let mut agent = provider.agent();

    agent.set_session_data(coding_session());
    agent.process_input("hello").await.unwrap();
    let first_thread = agent.thread_id().map(str::to_owned);

    let mut product = coding_session();
    product.interview_type = InterviewType::ProductSense;
    agent.set_session_data(product);

    assert!(agent.thread_id().is_none());
    assert_eq!(agent.turns(), 0);
    assert!(agent.transcript().is_empty());

    agent.process_input("hello again").await.unwrap();

    assert_eq!(provider.log.count("create_thread"), 2);
    assert_eq!(provider.log.count("create_assistant"), 2);
    assert_ne!(agent.thread_id().map(str::to_owned), first_thread);
}

/// Test that the code-review and question helpers bypass the thread
#[tokio::test]
async fn test_helper_prompts_use_chat_completions() {
    let provider = spawn_mock_provider().await;
    let agent = provider.agent();

    let review = agent
        .review_code("Reverse a list", "def rev(xs): return xs[::-1]")
        .await
        .unwrap();
    assert_eq!(review.status, 200);
    assert!(review.response.contains("xs[::-1]"));

    let question = agent.technical_question("graphs", "Easy").await.unwrap();
    assert!(question.response.contains("graphs"));

    assert_eq!(provider.log.count("chat_completion"), 2);
    assert_eq!(provider.log.count("create_thread"), 0);
}

/// Test that a failed turn leaves no trace and a retry records one clean turn
#[tokio::test]
async fn test_failed_turn_is_not_recorded() {
    let provider = spawn_mock_provider().await;
    provider.log.fail_runs.store(true, Ordering::SeqCst);

    let mut agent = provider.agent();
    agent.set_session_data(coding_session());

    assert!(agent.process_input("hello").await.is_err());
    assert!(agent.transcript().is_empty());
    assert_eq!(agent.turns(), 0);

    provider.log.fail_runs.store(false, Ordering::SeqCst);
    agent.process_input("hello").await.unwrap();

    let roles: Vec<Role> = agent.transcript().turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(agent.turns(), 1);
    assert_eq!(agent.transcript().last_reply(), Some("Interviewer reply to: hello"));
}

/// Test the behavioural question and STAR critique helpers
#[tokio::test]
async fn test_behavioral_question_and_critique() {
    let provider = spawn_mock_provider().await;
    let agent = provider.agent();

    let question = agent.behavioral_question("site reliability").await.unwrap();
    assert_eq!(question.status, 200);
    assert!(question.response.contains("behavioral interview for a site reliability role"));
    assert!(question.response.contains("STAR-formatted"));

    let critique = agent
        .critique_answer("I led the migration and cut costs by 30%")
        .await
        .unwrap();
    assert!(critique.response.contains("Critique this STAR answer: I led the migration"));
    assert!(critique.response.contains("specificity and metrics"));

    assert_eq!(provider.log.count("chat_completion"), 2);
    assert!(agent.transcript().is_empty());
}

/// Test that a completion with null content is an empty-response error
#[tokio::test]
async fn test_refused_completion_is_empty_response() {
    let provider = spawn_mock_provider().await;
    provider.log.refuse_completions.store(true, Ordering::SeqCst);
    let agent = provider.agent();

    let err = agent.critique_answer("I did things").await.unwrap_err();

    assert!(matches!(
        err,
        AgentError::Provider(ProviderError::EmptyResponse)
    ));
    assert_eq!(err.status_code(), 500);
}
