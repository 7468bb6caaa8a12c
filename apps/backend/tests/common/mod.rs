#![allow(dead_code)]

// tests/common/mod.rs
pub mod websocket;

use std::sync::Arc;
use std::time::Duration;

use quiz_backend::domain::random::{ChaChaSource, RandomSource};
use quiz_backend::domain::AnswerOption;
use quiz_backend::repos::prizes::PrizeCreate;
use quiz_backend::repos::questions::{self, QuestionCreate};
use quiz_backend::services::catalog::Catalog;
use quiz_backend::services::round_scheduler::SchedulerConfig;
use quiz_backend::ws::protocol::{Participant, ServerMsg};
use quiz_backend::ws::registry::{ConnectionHandle, Outbound};
use quiz_backend::{build_state, AppState};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc::UnboundedReceiver;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// `n` questions; the correct option rotates A, B, C, D.
pub fn questions(n: usize) -> Vec<QuestionCreate> {
    (0..n)
        .map(|i| QuestionCreate {
            text: format!("Question {i}?"),
            option_a: format!("{i}-a"),
            option_b: format!("{i}-b"),
            option_c: format!("{i}-c"),
            option_d: format!("{i}-d"),
            correct_option: AnswerOption::ALL[i % 4],
        })
        .collect()
}

/// Prizes as `(name, units, priority)`.
pub fn prizes(rows: &[(&str, i32, i32)]) -> Vec<PrizeCreate> {
    rows.iter()
        .map(|(name, units, priority)| PrizeCreate {
            name: name.to_string(),
            prize_type: name.to_lowercase(),
            units: *units,
            priority: *priority,
        })
        .collect()
}

pub fn catalog(question_count: usize, prize_rows: &[(&str, i32, i32)]) -> Catalog {
    Catalog {
        questions: questions(question_count),
        prizes: prizes(prize_rows),
    }
}

/// Timers that never fire within a test; rounds move only on manual
/// advance/end, which keeps event order deterministic.
pub fn held_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        countdown_secs: 5,
        tick: Duration::from_secs(3600),
        settle: Duration::from_secs(3600),
    }
}

/// Real but short timers for end-to-end timing tests.
pub fn fast_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        countdown_secs: 2,
        tick: Duration::from_millis(40),
        settle: Duration::from_millis(20),
    }
}

pub async fn state_with(
    catalog: Catalog,
    scheduler: SchedulerConfig,
    rng: Arc<dyn RandomSource>,
) -> AppState {
    build_state()
        .with_catalog(catalog)
        .with_scheduler(scheduler)
        .with_rng(rng)
        .build()
        .await
        .expect("build in-memory state")
}

/// In-memory state with a seeded rng and held timers.
pub async fn test_state(catalog: Catalog) -> AppState {
    state_with(catalog, held_scheduler(), Arc::new(ChaChaSource::new(Some(7)))).await
}

/// Register a fake connection and return what it would receive.
pub fn connect(
    state: &AppState,
    session_id: i64,
    participant: Participant,
) -> UnboundedReceiver<Outbound> {
    let (handle, rx) = ConnectionHandle::channel();
    state.registry().register(session_id, participant, handle);
    rx
}

pub fn drain(rx: &mut UnboundedReceiver<Outbound>) -> Vec<Outbound> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

pub fn kinds(rx: &mut UnboundedReceiver<Outbound>) -> Vec<&'static str> {
    drain(rx).iter().map(|m| m.kind()).collect()
}

/// Receive until an event of `kind` shows up; returns everything seen,
/// the matching event last.
pub async fn recv_until(
    rx: &mut UnboundedReceiver<Outbound>,
    kind: &str,
    timeout: Duration,
) -> Vec<Outbound> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let msg = tokio::time::timeout_at(deadline, rx.recv())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {kind}"))
            .expect("connection channel closed");
        let done = msg.kind() == kind;
        seen.push(msg);
        if done {
            return seen;
        }
    }
}

pub async fn correct_option(db: &DatabaseConnection, question_id: i64) -> AnswerOption {
    questions::require_question(db, question_id)
        .await
        .expect("question exists")
        .correct_option
}

pub async fn wrong_option(db: &DatabaseConnection, question_id: i64) -> AnswerOption {
    let right = correct_option(db, question_id).await;
    AnswerOption::ALL
        .into_iter()
        .find(|o| *o != right)
        .expect("four options")
}

pub fn is_kind(msg: &ServerMsg, kind: &str) -> bool {
    msg.kind() == kind
}
