//! Priority-ordered prize pool with atomic award.

use sea_orm::ConnectionTrait;
use tracing::{debug, info};

use crate::errors::domain::{ConflictKind, DomainError};
use crate::repos::prizes::{self, Prize};

#[derive(Debug, Default, Clone, Copy)]
pub struct PrizeAllocator;

impl PrizeAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Lowest priority rank among prizes with units left.
    pub async fn best_available<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Option<Prize>, DomainError> {
        prizes::best_available(conn).await
    }

    pub async fn has_available<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<bool, DomainError> {
        prizes::has_available(conn).await
    }

    /// Take one unit of `prize_id`. Fails with `Depleted` when another award
    /// got the last unit first; the count never goes below zero.
    pub async fn award<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        prize_id: i64,
    ) -> Result<Prize, DomainError> {
        if !prizes::decrement_if_positive(conn, prize_id).await? {
            // Distinguish a missing prize from a lost race.
            let prize = prizes::require_prize(conn, prize_id).await?;
            debug!(prize_id, remaining = prize.remaining_units, "award lost race");
            return Err(DomainError::conflict(
                ConflictKind::Depleted,
                format!("Prize '{}' has no units left", prize.name),
            ));
        }
        let prize = prizes::require_prize(conn, prize_id).await?;
        info!(prize_id, remaining = prize.remaining_units, "prize unit awarded");
        Ok(prize)
    }

    /// Restore every prize to its initial units. New-session only.
    pub async fn reset_all<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<u64, DomainError> {
        let n = prizes::reset_all(conn).await?;
        info!(prizes = n, "prize pool reset");
        Ok(n)
    }
}
