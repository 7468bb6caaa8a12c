pub mod answer_ledger;
pub mod catalog;
pub mod orchestrator;
pub mod prize_allocator;
pub mod question_pool;
pub mod round_scheduler;
pub mod views;

pub use answer_ledger::{AnswerLedger, AnswerOutcome};
pub use orchestrator::SessionOrchestrator;
pub use prize_allocator::PrizeAllocator;
pub use question_pool::QuestionPool;
pub use round_scheduler::{Advance, RoundListener, RoundPhase, RoundPlan, RoundScheduler, SchedulerConfig};
