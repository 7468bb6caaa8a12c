mod common;

use common::{catalog, test_state};
use quiz_backend::errors::domain::{ConflictKind, DomainError};
use quiz_backend::repos::prizes;
use quiz_backend::services::PrizeAllocator;

#[tokio::test]
async fn best_available_follows_priority_then_id() {
    let state = test_state(catalog(0, &[("Vino", 2, 2), ("Cesta", 1, 1), ("Cava", 2, 2)])).await;
    let db = state.db();
    let allocator = PrizeAllocator::new();

    let first = allocator.best_available(db).await.unwrap().unwrap();
    assert_eq!(first.name, "Cesta");

    allocator.award(db, first.id).await.unwrap();
    let next = allocator.best_available(db).await.unwrap().unwrap();
    assert_eq!(next.name, "Vino", "equal priority falls back to insertion order");
}

#[tokio::test]
async fn award_on_empty_prize_is_depleted_and_never_negative() {
    let state = test_state(catalog(0, &[("Cesta", 1, 1)])).await;
    let db = state.db();
    let allocator = PrizeAllocator::new();
    let prize = allocator.best_available(db).await.unwrap().unwrap();

    let awarded = allocator.award(db, prize.id).await.unwrap();
    assert_eq!(awarded.remaining_units, 0);

    let err = allocator.award(db, prize.id).await.unwrap_err();
    assert!(err.is_depleted(), "got {err:?}");
    assert_eq!(prizes::require_prize(db, prize.id).await.unwrap().remaining_units, 0);
    assert!(!allocator.has_available(db).await.unwrap());
    assert!(allocator.best_available(db).await.unwrap().is_none());
}

#[tokio::test]
async fn award_unknown_prize_is_not_found() {
    let state = test_state(catalog(0, &[])).await;
    let err = PrizeAllocator::new().award(state.db(), 999).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(..)), "got {err:?}");
}

#[tokio::test]
async fn concurrent_awards_hand_out_exactly_the_stock() {
    let state = test_state(catalog(0, &[("Cava", 3, 1)])).await;
    let prize_id = prizes::list_all(state.db()).await.unwrap()[0].id;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let db = state.db().clone();
        tasks.push(tokio::spawn(async move {
            PrizeAllocator::new().award(&db, prize_id).await
        }));
    }

    let mut awarded = 0;
    let mut depleted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => awarded += 1,
            Err(DomainError::Conflict(ConflictKind::Depleted, _)) => depleted += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(awarded, 3);
    assert_eq!(depleted, 7);
    assert_eq!(
        prizes::require_prize(state.db(), prize_id).await.unwrap().remaining_units,
        0
    );
}

#[tokio::test]
async fn reset_restores_initial_units() {
    let state = test_state(catalog(0, &[("Cava", 2, 1)])).await;
    let db = state.db();
    let allocator = PrizeAllocator::new();
    let prize_id = prizes::list_all(db).await.unwrap()[0].id;

    allocator.award(db, prize_id).await.unwrap();
    allocator.award(db, prize_id).await.unwrap();
    assert!(!allocator.has_available(db).await.unwrap());

    allocator.reset_all(db).await.unwrap();
    let prize = prizes::require_prize(db, prize_id).await.unwrap();
    assert_eq!(prize.remaining_units, prize.initial_units);
    assert_eq!(prize.remaining_units, 2);
}
