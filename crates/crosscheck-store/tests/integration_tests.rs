//! Integration tests for crosscheck-store
//!
//! These tests verify save/load cycles for every session record kind
//! against a SQLite file on disk.

use crosscheck_domain::traits::SessionStore;
use crosscheck_domain::{
    AgentError, AgentFactCheckReport, AgentOutcome, AgentResponse, AgentResult, Claim,
    ClaimType, ClaimVerification, ComparisonOutcome, QualityMetrics, Session, SessionStatus,
    Severity, Source,
};
use crosscheck_store::SqliteSessionStore;
use tempfile::TempDir;

fn sample_report(agent_id: &str) -> AgentFactCheckReport {
    let claim = Claim::new("The Eiffel Tower was completed in 1889.", ClaimType::Historical, agent_id);
    AgentFactCheckReport {
        agent_id: agent_id.to_string(),
        claims: vec![ClaimVerification {
            claim,
            verified: true,
            confidence: 10.0,
            sources: vec![Source::new(
                "Eiffel Tower",
                "https://en.wikipedia.org/wiki/Eiffel_Tower",
                1.0,
            )],
            warning: None,
        }],
        overall_score: 10.0,
        verified_count: 1,
        total_claims: 1,
        bias_score: None,
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteSessionStore::in_memory();
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_session_round_trip_with_metrics() {
    let dir = TempDir::new().unwrap();
    let mut store = SqliteSessionStore::open(dir.path().join("sessions.db")).unwrap();

    let mut session = Session::new("When was the Eiffel Tower completed?");
    session.transition(SessionStatus::Processing, "dispatching").unwrap();
    session.transition(SessionStatus::ResponsesSaved, "2 of 2 agents answered").unwrap();
    session.record_block(0);
    session.transition(SessionStatus::PipelineComplete, "compared").unwrap();
    session.record_block(1);
    session
        .complete(QualityMetrics {
            confidence: 0.9,
            consensus: 1.0,
            severity: Severity::Low,
            completeness: 1.0,
        })
        .unwrap();
    store.save_session(&session).unwrap();

    let loaded = store.load_session(session.id).unwrap().expect("session stored");
    assert_eq!(loaded, session);
    assert_eq!(loaded.block_range(), Some((0, 1)));
}

#[test]
fn test_session_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sessions.db");
    let session = Session::new("q");
    {
        let mut store = SqliteSessionStore::open(&path).unwrap();
        store.save_session(&session).unwrap();
    }
    let store = SqliteSessionStore::open(&path).unwrap();
    assert_eq!(store.load_session(session.id).unwrap().unwrap().question, "q");
}

#[test]
fn test_agent_results_replace_as_a_whole() {
    let mut store = SqliteSessionStore::in_memory().unwrap();
    let session = Session::new("q");

    let first = vec![
        AgentResult::new("a", AgentOutcome::Ok(AgentResponse::new("answer", 120))),
        AgentResult::new("b", AgentOutcome::Err(AgentError::timeout("no answer in 30s"))),
        AgentResult::new("c", AgentOutcome::Ok(AgentResponse::new("other answer", 80))),
    ];
    store.save_agent_results(session.id, &first).unwrap();
    assert_eq!(store.load_agent_results(session.id).unwrap(), first);

    let second = vec![first[1].clone()];
    store.save_agent_results(session.id, &second).unwrap();
    let loaded = store.load_agent_results(session.id).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(!loaded[0].is_ok());
}

#[test]
fn test_fact_check_reports_and_comparison() {
    let mut store = SqliteSessionStore::in_memory().unwrap();
    let session = Session::new("q");

    let reports = vec![sample_report("a"), sample_report("b")];
    store.save_fact_check_reports(session.id, &reports).unwrap();
    assert_eq!(store.load_fact_check_reports(session.id).unwrap(), reports);

    assert!(store.load_comparison(session.id).unwrap().is_none());
    let outcome = ComparisonOutcome::Unavailable {
        message: "no agent reports".to_string(),
    };
    store.save_comparison(session.id, &outcome).unwrap();
    assert_eq!(store.load_comparison(session.id).unwrap(), Some(outcome));
}
