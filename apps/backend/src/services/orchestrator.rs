//! Session lifecycle, round creation, spin-and-award and the operator views.
//!
//! This is the only component the HTTP layer talks to. Multi-row writes run
//! through `with_txn`; closures capture owned values and touch the database
//! only through the transaction handle.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::with_txn;
use crate::domain::{AnswerOption, RandomSource};
use crate::entities::sessions::SessionStatus;
use crate::errors::domain::{
    ConflictKind, DomainError, ExhaustedKind, NotFoundKind, ValidationKind,
};
use crate::repos::players::{self, Player};
use crate::repos::prizes::{self, Prize};
use crate::repos::rounds::{self, Round};
use crate::repos::sessions::{self, Session};
use crate::repos::{answers, questions};
use crate::services::answer_ledger::{AnswerLedger, AnswerOutcome};
use crate::services::prize_allocator::PrizeAllocator;
use crate::services::question_pool::QuestionPool;
use crate::services::round_scheduler::{
    Advance, RoundListener, RoundPlan, RoundScheduler, SchedulerConfig,
};
use crate::services::views::{CatalogStats, FinalResult, SessionSnapshot, SpinOutcome};
use crate::utils::join_code::{generate_join_code, normalize_join_code};
use crate::ws::protocol::{Participant, PlayerRef, PrizeRef, QuestionView, RoleFilter, ServerMsg};
use crate::ws::registry::ConnectionRegistry;

const JOIN_CODE_ATTEMPTS: usize = 8;

pub struct SessionOrchestrator {
    db: DatabaseConnection,
    registry: Arc<ConnectionRegistry>,
    rng: Arc<dyn RandomSource>,
    pool: QuestionPool,
    allocator: PrizeAllocator,
    ledger: AnswerLedger,
    scheduler: RoundScheduler,
    /// Serializes spins so two operator clicks cannot race on one round.
    spin_lock: Mutex<()>,
    /// Serializes round creation so round numbers stay gap-free.
    round_lock: Mutex<()>,
}

impl SessionOrchestrator {
    pub fn new(
        db: DatabaseConnection,
        registry: Arc<ConnectionRegistry>,
        rng: Arc<dyn RandomSource>,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let ledger = AnswerLedger::new();
        let notifier = Arc::new(RoundEndNotifier {
            db: db.clone(),
            registry: Arc::clone(&registry),
            ledger,
        });
        let scheduler = RoundScheduler::new(Arc::clone(&registry), notifier, scheduler_config);

        Self {
            db,
            pool: QuestionPool::new(Arc::clone(&rng)),
            registry,
            rng,
            allocator: PrizeAllocator::new(),
            ledger,
            scheduler,
            spin_lock: Mutex::new(()),
            round_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn scheduler(&self) -> &RoundScheduler {
        &self.scheduler
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // ---- session lifecycle -------------------------------------------------

    /// Start a fresh generation: restore prize units, clear question
    /// used-flags and open a new session in `waiting`.
    pub async fn create_session(&self, questions_per_round: u32) -> Result<Session, DomainError> {
        if questions_per_round == 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidQuestionsPerRound,
                "questions_per_round must be at least 1",
            ));
        }

        let rng = Arc::clone(&self.rng);
        let pool = self.pool.clone();
        let allocator = self.allocator;
        let session = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                allocator.reset_all(txn).await?;
                pool.reset_all(txn).await?;

                for _ in 0..JOIN_CODE_ATTEMPTS {
                    let code = generate_join_code(rng.as_ref());
                    if sessions::join_code_exists(txn, &code).await? {
                        continue;
                    }
                    return sessions::create_session(txn, &code, questions_per_round).await;
                }
                Err(DomainError::conflict(
                    ConflictKind::JoinCodeConflict,
                    "Could not allocate a unique join code",
                ))
            })
        })
        .await?;

        info!(
            session_id = session.id,
            join_code = %session.join_code,
            questions_per_round,
            "session created"
        );
        Ok(session)
    }

    /// `waiting -> running`; pushes GAME_STARTED with the current snapshot.
    pub async fn start_session(&self, session_id: i64) -> Result<Session, DomainError> {
        let moved = sessions::transition_status(
            &self.db,
            session_id,
            SessionStatus::Waiting,
            SessionStatus::Running,
        )
        .await?;
        if !moved {
            let session = sessions::require_session(&self.db, session_id).await?;
            return Err(DomainError::invalid_transition(format!(
                "Session {session_id} cannot start from status {}",
                session.status
            )));
        }

        let snapshot = self.session_snapshot(session_id).await?;
        let session = snapshot.session.clone();
        self.registry.broadcast(
            session_id,
            RoleFilter::All,
            ServerMsg::GameStarted { session: snapshot },
        );
        info!(session_id, "session started");
        Ok(session)
    }

    /// `running -> finished`. Returns whether this call made the transition;
    /// finishing an already finished session is a no-op.
    pub async fn finish_session(&self, session_id: i64) -> Result<bool, DomainError> {
        let moved = sessions::transition_status(
            &self.db,
            session_id,
            SessionStatus::Running,
            SessionStatus::Finished,
        )
        .await?;
        if !moved {
            let session = sessions::require_session(&self.db, session_id).await?;
            return match session.status {
                SessionStatus::Finished => Ok(false),
                other => Err(DomainError::invalid_transition(format!(
                    "Session {session_id} cannot finish from status {other}"
                ))),
            };
        }

        self.scheduler.cancel_session(session_id);
        self.registry
            .broadcast(session_id, RoleFilter::All, ServerMsg::GameFinished);
        info!(session_id, "session finished");
        Ok(true)
    }

    /// No active players left, or no prize with units left.
    pub async fn should_end_session(&self, session_id: i64) -> Result<bool, DomainError> {
        sessions::require_session(&self.db, session_id).await?;
        if players::count_active(&self.db, session_id).await? == 0 {
            return Ok(true);
        }
        Ok(!self.allocator.has_available(&self.db).await?)
    }

    pub async fn session_by_code(&self, join_code: &str) -> Result<Session, DomainError> {
        sessions::require_by_join_code(&self.db, &normalize_join_code(join_code)).await
    }

    // ---- players -----------------------------------------------------------

    pub async fn join_session(&self, join_code: &str, name: &str) -> Result<Player, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::EmptyName,
                "Name must not be empty",
            ));
        }

        let session = self.session_by_code(join_code).await?;
        if session.status != SessionStatus::Waiting {
            return Err(DomainError::invalid_transition(format!(
                "Session {} is {} and no longer accepts players",
                session.id, session.status
            )));
        }
        if players::find_by_session_and_name(&self.db, session.id, name)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                ConflictKind::DuplicateName,
                format!("Name '{name}' is already taken in this session"),
            ));
        }

        let player = players::create_player(&self.db, session.id, name).await?;
        info!(session_id = session.id, player_id = player.id, "player joined");
        Ok(player)
    }

    pub async fn player(&self, player_id: i64) -> Result<Player, DomainError> {
        players::require_player(&self.db, player_id).await
    }

    /// Delete a player together with their answers.
    pub async fn remove_player(&self, player_id: i64) -> Result<(), DomainError> {
        let player = players::require_player(&self.db, player_id).await?;
        if !players::delete_player(&self.db, player_id).await? {
            return Err(DomainError::not_found(
                NotFoundKind::Player,
                format!("Player {player_id} not found"),
            ));
        }
        info!(session_id = player.session_id, player_id, "player removed");
        Ok(())
    }

    /// Resolve the identity a real-time connection claims. A join code is
    /// always required, plus either a player of that session or the operator
    /// flag.
    pub async fn identify_connection(
        &self,
        join_code: &str,
        player_id: Option<i64>,
        operator: bool,
    ) -> Result<(Session, Participant), DomainError> {
        let participant = match (player_id, operator) {
            (_, true) => Participant::Operator,
            (Some(player_id), false) => Participant::Player { player_id },
            (None, false) => {
                return Err(DomainError::validation(
                    ValidationKind::MissingConnectionIdentity,
                    "Connection needs a player_id or the operator flag",
                ))
            }
        };

        let session = self.session_by_code(join_code).await?;
        if let Participant::Player { player_id } = participant {
            let player = players::require_player(&self.db, player_id).await?;
            if player.session_id != session.id {
                return Err(DomainError::validation(
                    ValidationKind::PlayerNotInSession,
                    format!("Player {player_id} does not belong to this session"),
                ));
            }
        }
        Ok((session, participant))
    }

    // ---- rounds ------------------------------------------------------------

    /// Draw the round's questions, allocate the next round number, announce
    /// NEW_ROUND and hand the round to the scheduler.
    pub async fn create_round(&self, session_id: i64) -> Result<Round, DomainError> {
        let _guard = self.round_lock.lock().await;

        let session = sessions::require_session(&self.db, session_id).await?;
        if session.status != SessionStatus::Running {
            return Err(DomainError::invalid_transition(format!(
                "Session {session_id} is {}; rounds need a running session",
                session.status
            )));
        }
        if let Some(round_id) = self.scheduler.running_round(session_id) {
            return Err(DomainError::invalid_transition(format!(
                "Round {round_id} is still in progress"
            )));
        }

        let count = session.questions_per_round as usize;
        let pool = self.pool.clone();
        let (round, drawn) = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                let drawn = pool.draw_unused(txn, count).await?;
                let ids: Vec<i64> = drawn.iter().map(|q| q.id).collect();
                let round_no = rounds::max_round_no(txn, session_id).await? + 1;
                let round = rounds::create_round(txn, session_id, round_no, &ids).await?;
                Ok((round, drawn))
            })
        })
        .await?;

        info!(
            session_id,
            round_id = round.id,
            round_no = round.round_no,
            "round created"
        );
        self.registry.broadcast(
            session_id,
            RoleFilter::All,
            ServerMsg::NewRound {
                round_id: round.id,
                round_no: round.round_no,
                question_count: drawn.len(),
            },
        );
        self.scheduler
            .start(RoundPlan {
                session_id,
                round_id: round.id,
                questions: drawn.iter().map(QuestionView::from).collect(),
            })
            .await?;
        Ok(round)
    }

    pub async fn advance_question(&self, round_id: i64) -> Result<Advance, DomainError> {
        rounds::require_round(&self.db, round_id).await?;
        self.scheduler.advance(round_id).await
    }

    pub async fn end_round(&self, round_id: i64) -> Result<(), DomainError> {
        rounds::require_round(&self.db, round_id).await?;
        self.scheduler.end_round(round_id).await
    }

    pub async fn round(&self, round_id: i64) -> Result<Round, DomainError> {
        rounds::require_round(&self.db, round_id).await
    }

    // ---- answers and winners -----------------------------------------------

    /// `option` is one of `A`, `B`, `C`, `D`, in either case.
    pub async fn record_answer(
        &self,
        player_id: i64,
        round_id: i64,
        question_id: i64,
        option: &str,
    ) -> Result<AnswerOutcome, DomainError> {
        let given = AnswerOption::from_str(option)?;
        self.ledger
            .record(&self.db, player_id, round_id, question_id, given)
            .await
    }

    pub async fn resolve_round_winners(&self, round_id: i64) -> Result<Vec<Player>, DomainError> {
        self.ledger.winners_of(&self.db, round_id).await
    }

    /// Pick one candidate uniformly, give them the best available prize and
    /// settle the round, all in one transaction. Then notify the winner and
    /// the room, and finish the session when nothing is left to play for.
    pub async fn spin_and_award(
        &self,
        session_id: i64,
        round_id: i64,
        candidates: &[i64],
    ) -> Result<SpinOutcome, DomainError> {
        let _guard = self.spin_lock.lock().await;

        if candidates.is_empty() {
            return Err(DomainError::exhausted(
                ExhaustedKind::NoWinners,
                format!("Round {round_id} has no winning candidates"),
            ));
        }
        let round = rounds::require_round(&self.db, round_id).await?;
        if round.session_id != session_id {
            return Err(DomainError::not_found(
                NotFoundKind::Round,
                format!("Round {round_id} does not belong to session {session_id}"),
            ));
        }
        if self.scheduler.is_running(round_id) {
            return Err(DomainError::invalid_transition(format!(
                "Round {round_id} is still in progress"
            )));
        }

        let winner_id = candidates[self.rng.next_index(candidates.len())];
        let allocator = self.allocator;
        let (winner, prize) = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                let round = rounds::require_round(txn, round_id).await?;
                if round.completed {
                    return Err(DomainError::invalid_transition(format!(
                        "Round {round_id} already has a winner"
                    )));
                }
                let session = sessions::require_session(txn, session_id).await?;
                if session.status != SessionStatus::Running {
                    return Err(DomainError::invalid_transition(format!(
                        "Session {session_id} is {}; no more prizes can be awarded",
                        session.status
                    )));
                }
                let candidate = players::require_player(txn, winner_id).await?;
                if candidate.session_id != session_id {
                    return Err(DomainError::validation(
                        ValidationKind::PlayerNotInSession,
                        format!("Player {winner_id} does not belong to session {session_id}"),
                    ));
                }

                let prize = award_best_available(allocator, txn).await?;
                if !players::deactivate_with_prize(txn, winner_id, &prize.name).await? {
                    return Err(DomainError::invalid_transition(format!(
                        "Player {winner_id} already won a prize"
                    )));
                }
                if !rounds::complete_with_winner(txn, round_id, winner_id, prize.id, &prize.name)
                    .await?
                {
                    return Err(DomainError::invalid_transition(format!(
                        "Round {round_id} already has a winner"
                    )));
                }
                let winner = players::require_player(txn, winner_id).await?;
                Ok((winner, prize))
            })
        })
        .await?;

        self.scheduler.clear(round_id);
        info!(
            session_id,
            round_id,
            player_id = winner.id,
            prize_id = prize.id,
            "prize awarded"
        );

        let prize_ref = PrizeRef::from(&prize);
        self.registry.send_to(
            session_id,
            Participant::Player {
                player_id: winner.id,
            },
            ServerMsg::YouWin {
                round_id,
                prize: prize_ref.clone(),
            },
        );
        self.registry.broadcast(
            session_id,
            RoleFilter::All,
            ServerMsg::WinnerAnnounced {
                round_id,
                player: PlayerRef {
                    id: winner.id,
                    name: winner.name.clone(),
                },
                prize: prize_ref,
            },
        );

        let session_finished = if self.should_end_session(session_id).await? {
            self.finish_session(session_id).await?
        } else {
            false
        };

        Ok(SpinOutcome {
            round_id,
            winner,
            prize,
            session_finished,
        })
    }

    // ---- operator views ----------------------------------------------------

    pub async fn session_snapshot(&self, session_id: i64) -> Result<SessionSnapshot, DomainError> {
        let session = sessions::require_session(&self.db, session_id).await?;
        Ok(SessionSnapshot {
            players: players::list_for_session(&self.db, session_id).await?,
            prizes: prizes::list_all(&self.db).await?,
            questions: questions::stats(&self.db).await?,
            session,
        })
    }

    /// Winners first, then everyone else in join order.
    pub async fn final_results(&self, session_id: i64) -> Result<Vec<FinalResult>, DomainError> {
        sessions::require_session(&self.db, session_id).await?;
        let mut roster = players::list_for_session(&self.db, session_id).await?;
        roster.sort_by_key(|p| (p.active, p.id));

        let ids: Vec<i64> = roster.iter().map(|p| p.id).collect();
        let participation = answers::rounds_participated(&self.db, &ids).await?;

        Ok(roster
            .into_iter()
            .map(|p| FinalResult {
                rounds_participated: participation.get(&p.id).copied().unwrap_or(0),
                id: p.id,
                name: p.name,
                prize_won: p.prize_won,
                active: p.active,
            })
            .collect())
    }

    /// Every prize in award order, depleted ones included.
    pub async fn prizes(&self) -> Result<Vec<Prize>, DomainError> {
        prizes::list_all(&self.db).await
    }

    pub async fn catalog_stats(&self) -> Result<CatalogStats, DomainError> {
        Ok(CatalogStats {
            prizes: prizes::stats(&self.db).await?,
            questions: questions::stats(&self.db).await?,
        })
    }
}

/// Best available prize, retrying once on the next best when the first pick
/// was depleted by a concurrent award.
async fn award_best_available<C: ConnectionTrait + Send + Sync>(
    allocator: PrizeAllocator,
    conn: &C,
) -> Result<Prize, DomainError> {
    let observed = next_best(allocator, conn).await?;
    award_observed(allocator, conn, observed, 1).await
}

async fn next_best<C: ConnectionTrait + Send + Sync>(
    allocator: PrizeAllocator,
    conn: &C,
) -> Result<Prize, DomainError> {
    allocator.best_available(conn).await?.ok_or_else(|| {
        DomainError::exhausted(ExhaustedKind::NoPrizesAvailable, "No prizes left to award")
    })
}

/// Award `observed`; on `Depleted`, re-read the pool and try the new best,
/// at most `retries` times.
async fn award_observed<C: ConnectionTrait + Send + Sync>(
    allocator: PrizeAllocator,
    conn: &C,
    observed: Prize,
    retries: u32,
) -> Result<Prize, DomainError> {
    let mut pick = observed;
    let mut left = retries;
    loop {
        match allocator.award(conn, pick.id).await {
            Ok(prize) => return Ok(prize),
            Err(err) if err.is_depleted() && left > 0 => {
                warn!(prize_id = pick.id, "prize depleted concurrently; retrying");
                left -= 1;
                pick = next_best(allocator, conn).await?;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Computes winners when the scheduler closes a round and pushes ROUND_END.
struct RoundEndNotifier {
    db: DatabaseConnection,
    registry: Arc<ConnectionRegistry>,
    ledger: AnswerLedger,
}

#[async_trait]
impl RoundListener for RoundEndNotifier {
    async fn round_finished(&self, session_id: i64, round_id: i64) {
        let winner_count = match self.ledger.winners_of(&self.db, round_id).await {
            Ok(winners) => winners.len(),
            Err(err) => {
                warn!(session_id, round_id, error = %err, "winner resolution failed");
                0
            }
        };
        self.registry.broadcast(
            session_id,
            RoleFilter::All,
            ServerMsg::RoundEnd {
                round_id,
                winner_count,
            },
        );
    }
}
