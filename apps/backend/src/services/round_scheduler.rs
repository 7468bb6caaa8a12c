//! Timed question sequencing for a round.
//!
//! Each running round owns exactly one countdown timer. Every emission
//! (tick, QUESTION_END, next QUESTION) happens under the round's state lock
//! after checking that the timer's generation is still current, so a
//! cancelled timer can never fire again and QUESTION_END for index `i`
//! always precedes QUESTION for `i + 1`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::domain::{DomainError, NotFoundKind};
use crate::ws::protocol::{QuestionView, RoleFilter, ServerMsg};
use crate::ws::registry::ConnectionRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Ticks per question; ticks count down from `countdown_secs - 1` to 0.
    pub countdown_secs: u32,
    pub tick: Duration,
    /// Pause between the last tick and QUESTION_END.
    pub settle: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 5,
            tick: Duration::from_secs(1),
            settle: Duration::from_millis(500),
        }
    }
}

/// Notified once per round, after its last QUESTION_END.
#[async_trait]
pub trait RoundListener: Send + Sync {
    async fn round_finished(&self, session_id: i64, round_id: i64);
}

/// Everything the scheduler needs to run a round.
#[derive(Debug, Clone)]
pub struct RoundPlan {
    pub session_id: i64,
    pub round_id: i64,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RoundPhase {
    InProgress { index: usize },
    AwaitingSpin,
}

/// Result of a manual advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Advance {
    NextQuestion { index: usize },
    RoundEnded,
}

struct TimerState {
    index: usize,
    generation: u64,
    cancel: CancellationToken,
    end_sent: bool,
    finished: bool,
}

struct RoundRun {
    session_id: i64,
    round_id: i64,
    questions: Vec<QuestionView>,
    state: Mutex<TimerState>,
}

struct Inner {
    registry: Arc<ConnectionRegistry>,
    listener: Arc<dyn RoundListener>,
    config: SchedulerConfig,
    runs: Mutex<HashMap<i64, Arc<RoundRun>>>,
    /// round id -> session id
    awaiting_spin: Mutex<HashMap<i64, i64>>,
}

#[derive(Clone)]
pub struct RoundScheduler {
    inner: Arc<Inner>,
}

impl RoundScheduler {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        listener: Arc<dyn RoundListener>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                listener,
                config,
                runs: Mutex::new(HashMap::new()),
                awaiting_spin: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Push the first QUESTION and start its countdown.
    pub async fn start(&self, plan: RoundPlan) -> Result<(), DomainError> {
        if plan.questions.is_empty() {
            let run = Arc::new(RoundRun {
                session_id: plan.session_id,
                round_id: plan.round_id,
                questions: Vec::new(),
                state: Mutex::new(TimerState::finished()),
            });
            finalize(&self.inner, &run).await;
            return Ok(());
        }

        let run = Arc::new(RoundRun {
            session_id: plan.session_id,
            round_id: plan.round_id,
            questions: plan.questions,
            state: Mutex::new(TimerState::idle()),
        });

        {
            let mut runs = self.inner.runs.lock();
            if runs.contains_key(&run.round_id) {
                return Err(DomainError::invalid_transition(format!(
                    "Round {} is already running",
                    run.round_id
                )));
            }
            runs.insert(run.round_id, Arc::clone(&run));
        }

        info!(
            session_id = run.session_id,
            round_id = run.round_id,
            questions = run.questions.len(),
            "round started"
        );
        let mut st = run.state.lock();
        begin_question(&self.inner, &run, &mut st, 0);
        Ok(())
    }

    /// Operator advance: cancel the pending countdown, close the current
    /// question, then open the next one or finish the round.
    pub async fn advance(&self, round_id: i64) -> Result<Advance, DomainError> {
        let run = self.running(round_id)?;
        let outcome = {
            let mut st = run.state.lock();
            if st.finished {
                return Err(not_running(round_id));
            }
            st.cancel.cancel();
            close_question(&self.inner, &run, &mut st);
            let next = st.index + 1;
            if next < run.questions.len() {
                begin_question(&self.inner, &run, &mut st, next);
                Advance::NextQuestion { index: next }
            } else {
                st.finished = true;
                Advance::RoundEnded
            }
        };
        debug!(round_id, ?outcome, "manual advance");
        if outcome == Advance::RoundEnded {
            finalize(&self.inner, &run).await;
        }
        Ok(outcome)
    }

    /// Operator end: cancel the countdown and finish the round now.
    pub async fn end_round(&self, round_id: i64) -> Result<(), DomainError> {
        let run = self.running(round_id)?;
        {
            let mut st = run.state.lock();
            if st.finished {
                return Err(not_running(round_id));
            }
            st.cancel.cancel();
            close_question(&self.inner, &run, &mut st);
            st.finished = true;
        }
        debug!(round_id, "manual end");
        finalize(&self.inner, &run).await;
        Ok(())
    }

    pub fn phase(&self, round_id: i64) -> Option<RoundPhase> {
        if let Some(run) = self.inner.runs.lock().get(&round_id) {
            let st = run.state.lock();
            if !st.finished {
                return Some(RoundPhase::InProgress { index: st.index });
            }
        }
        if self.inner.awaiting_spin.lock().contains_key(&round_id) {
            return Some(RoundPhase::AwaitingSpin);
        }
        None
    }

    pub fn is_running(&self, round_id: i64) -> bool {
        matches!(self.phase(round_id), Some(RoundPhase::InProgress { .. }))
    }

    /// The session's round whose questions are still being played, if any.
    pub fn running_round(&self, session_id: i64) -> Option<i64> {
        self.inner
            .runs
            .lock()
            .values()
            .find(|run| run.session_id == session_id && !run.state.lock().finished)
            .map(|run| run.round_id)
    }

    /// Forget the awaiting-spin marker once the round has been settled.
    pub fn clear(&self, round_id: i64) {
        self.inner.awaiting_spin.lock().remove(&round_id);
    }

    /// Cancel every timer of a session (used when the session finishes).
    pub fn cancel_session(&self, session_id: i64) {
        let mut runs = self.inner.runs.lock();
        runs.retain(|_, run| {
            if run.session_id != session_id {
                return true;
            }
            let mut st = run.state.lock();
            st.cancel.cancel();
            st.finished = true;
            false
        });
        drop(runs);
        self.inner
            .awaiting_spin
            .lock()
            .retain(|_, owner| *owner != session_id);
    }

    fn running(&self, round_id: i64) -> Result<Arc<RoundRun>, DomainError> {
        self.inner
            .runs
            .lock()
            .get(&round_id)
            .cloned()
            .ok_or_else(|| not_running(round_id))
    }
}

impl TimerState {
    fn idle() -> Self {
        Self {
            index: 0,
            generation: 0,
            cancel: CancellationToken::new(),
            end_sent: true,
            finished: false,
        }
    }

    fn finished() -> Self {
        Self {
            finished: true,
            ..Self::idle()
        }
    }
}

fn not_running(round_id: i64) -> DomainError {
    DomainError::not_found(
        NotFoundKind::Round,
        format!("Round {round_id} has no running question sequence"),
    )
}

/// Emit QUESTION for `index` and arm a fresh timer. Caller holds the state lock.
fn begin_question(inner: &Arc<Inner>, run: &Arc<RoundRun>, st: &mut TimerState, index: usize) {
    // One live timer per round: retire whatever was armed before.
    st.cancel.cancel();
    st.index = index;
    st.generation += 1;
    st.cancel = CancellationToken::new();
    st.end_sent = false;

    let question = run.questions[index].clone();
    inner.registry.broadcast(
        run.session_id,
        RoleFilter::All,
        ServerMsg::Question {
            round_id: run.round_id,
            index,
            total: run.questions.len(),
            question,
        },
    );

    let inner = Arc::clone(inner);
    let run = Arc::clone(run);
    let generation = st.generation;
    let cancel = st.cancel.clone();
    tokio::spawn(async move {
        run_timer(inner, run, generation, cancel).await;
    });
}

/// Emit the pending QUESTION_END, at most once per question. Caller holds the lock.
fn close_question(inner: &Inner, run: &RoundRun, st: &mut TimerState) {
    if st.end_sent {
        return;
    }
    st.end_sent = true;
    inner.registry.broadcast(
        run.session_id,
        RoleFilter::All,
        ServerMsg::QuestionEnd {
            round_id: run.round_id,
            index: st.index,
        },
    );
}

async fn run_timer(
    inner: Arc<Inner>,
    run: Arc<RoundRun>,
    generation: u64,
    cancel: CancellationToken,
) {
    let config = inner.config.clone();

    for remaining in (0..config.countdown_secs).rev() {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(config.tick) => {}
        }
        let st = run.state.lock();
        if !timer_is_current(&st, generation, &cancel) {
            return;
        }
        inner.registry.broadcast(
            run.session_id,
            RoleFilter::All,
            ServerMsg::Countdown {
                round_id: run.round_id,
                index: st.index,
                seconds: remaining,
            },
        );
    }

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(config.settle) => {}
    }

    let round_over = {
        let mut st = run.state.lock();
        if !timer_is_current(&st, generation, &cancel) {
            return;
        }
        close_question(&inner, &run, &mut st);
        let next = st.index + 1;
        if next < run.questions.len() {
            begin_question(&inner, &run, &mut st, next);
            false
        } else {
            st.finished = true;
            true
        }
    };

    if round_over {
        finalize(&inner, &run).await;
    }
}

fn timer_is_current(st: &TimerState, generation: u64, cancel: &CancellationToken) -> bool {
    !cancel.is_cancelled() && !st.finished && st.generation == generation
}

async fn finalize(inner: &Inner, run: &RoundRun) {
    let removed = {
        let mut runs = inner.runs.lock();
        match runs.get(&run.round_id) {
            Some(existing) if std::ptr::eq(Arc::as_ptr(existing), run) => {
                runs.remove(&run.round_id);
                true
            }
            Some(_) => false,
            None => run.questions.is_empty(),
        }
    };
    if !removed {
        warn!(round_id = run.round_id, "round finalize skipped; run was replaced");
        return;
    }
    inner
        .awaiting_spin
        .lock()
        .insert(run.round_id, run.session_id);
    info!(
        session_id = run.session_id,
        round_id = run.round_id,
        "round finished; awaiting spin"
    );
    inner
        .listener
        .round_finished(run.session_id, run.round_id)
        .await;
}
