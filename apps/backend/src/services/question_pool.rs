//! Per-generation question pool: random draws without replacement.

use std::sync::Arc;

use sea_orm::ConnectionTrait;
use tracing::{debug, info};

use crate::domain::random::{sample_distinct, RandomSource};
use crate::errors::domain::{DomainError, ExhaustedKind};
use crate::repos::questions::{self, Question};

#[derive(Clone)]
pub struct QuestionPool {
    rng: Arc<dyn RandomSource>,
}

impl QuestionPool {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Pick `count` unused questions uniformly and mark them used in the same
    /// step. Run it inside the caller's transaction so a concurrent draw
    /// cannot take the same ids.
    pub async fn draw_unused<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        count: usize,
    ) -> Result<Vec<Question>, DomainError> {
        let unused = questions::unused_ids(conn).await?;
        if unused.len() < count {
            return Err(DomainError::exhausted(
                ExhaustedKind::InsufficientQuestions,
                format!(
                    "Need {count} unused questions, only {} left",
                    unused.len()
                ),
            ));
        }

        let picked = sample_distinct(self.rng.as_ref(), &unused, count);
        let marked = questions::mark_used(conn, &picked).await?;
        if marked as usize != picked.len() {
            // Another draw reserved one of them in between.
            return Err(DomainError::exhausted(
                ExhaustedKind::InsufficientQuestions,
                "Questions were drawn concurrently; retry",
            ));
        }
        debug!(count, ids = ?picked, "questions drawn");
        questions::find_many(conn, &picked).await
    }

    pub async fn mark_used<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[i64],
    ) -> Result<u64, DomainError> {
        questions::mark_used(conn, ids).await
    }

    pub async fn reset_all<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<u64, DomainError> {
        let n = questions::reset_all(conn).await?;
        info!(questions = n, "question pool reset");
        Ok(n)
    }
}
