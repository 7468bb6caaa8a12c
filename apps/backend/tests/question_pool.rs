mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{catalog, test_state};
use quiz_backend::domain::ScriptedSource;
use quiz_backend::errors::domain::{DomainError, ExhaustedKind};
use quiz_backend::repos::questions;
use quiz_backend::services::QuestionPool;

fn pool() -> QuestionPool {
    QuestionPool::new(Arc::new(ScriptedSource::new([3, 1, 0])))
}

#[tokio::test]
async fn draws_are_distinct_and_marked_used() {
    let state = test_state(catalog(6, &[])).await;
    let db = state.db();

    let drawn = pool().draw_unused(db, 3).await.unwrap();
    let ids: HashSet<i64> = drawn.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), 3);

    let stats = questions::stats(db).await.unwrap();
    assert_eq!((stats.total, stats.used, stats.available), (6, 3, 3));

    let unused: HashSet<i64> = questions::unused_ids(db).await.unwrap().into_iter().collect();
    assert!(ids.is_disjoint(&unused));
}

#[tokio::test]
async fn questions_are_not_reused_within_a_generation() {
    let state = test_state(catalog(4, &[])).await;
    let db = state.db();
    let pool = pool();

    let first: HashSet<i64> = pool.draw_unused(db, 2).await.unwrap().iter().map(|q| q.id).collect();
    let second: HashSet<i64> = pool.draw_unused(db, 2).await.unwrap().iter().map(|q| q.id).collect();
    assert!(first.is_disjoint(&second));
    assert_eq!(questions::stats(db).await.unwrap().available, 0);
}

#[tokio::test]
async fn short_pool_fails_without_marking_anything() {
    let state = test_state(catalog(2, &[])).await;
    let db = state.db();

    let err = pool().draw_unused(db, 3).await.unwrap_err();
    assert!(
        matches!(err, DomainError::Exhausted(ExhaustedKind::InsufficientQuestions, _)),
        "got {err:?}"
    );
    assert_eq!(questions::stats(db).await.unwrap().used, 0);
}

#[tokio::test]
async fn reset_makes_every_question_eligible_again() {
    let state = test_state(catalog(3, &[])).await;
    let db = state.db();
    let pool = pool();

    pool.draw_unused(db, 3).await.unwrap();
    assert!(pool.draw_unused(db, 1).await.is_err());

    pool.reset_all(db).await.unwrap();
    assert_eq!(questions::stats(db).await.unwrap().available, 3);
    assert_eq!(pool.draw_unused(db, 3).await.unwrap().len(), 3);
}

#[tokio::test]
async fn drawn_questions_keep_their_content() {
    let state = test_state(catalog(1, &[])).await;
    let drawn = pool().draw_unused(state.db(), 1).await.unwrap();
    assert_eq!(drawn[0].text, "Question 0?");
    assert_eq!(drawn[0].option_c, "0-c");
}
