mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    catalog, connect, correct_option, drain, fast_scheduler, kinds, recv_until, state_with,
    test_state,
};
use quiz_backend::domain::ChaChaSource;
use quiz_backend::errors::domain::{DomainError, NotFoundKind};
use quiz_backend::services::Advance;
use quiz_backend::ws::protocol::{Participant, ServerMsg};

#[tokio::test]
async fn operator_driven_round_emits_events_in_order() {
    let state = test_state(catalog(2, &[("Cesta", 1, 1)])).await;
    let orch = state.orchestrator();
    let session = orch.create_session(2).await.unwrap();
    let ana = orch.join_session(&session.join_code, "Ana").await.unwrap();
    let bea = orch.join_session(&session.join_code, "Bea").await.unwrap();

    let mut operator = connect(&state, session.id, Participant::Operator);
    let mut ana_rx = connect(&state, session.id, Participant::Player { player_id: ana.id });
    let mut bea_rx = connect(&state, session.id, Participant::Player { player_id: bea.id });

    orch.start_session(session.id).await.unwrap();
    let round = orch.create_round(session.id).await.unwrap();
    for qid in &round.question_ids {
        let right = correct_option(state.db(), *qid).await;
        orch.record_answer(ana.id, round.id, *qid, right.as_str())
            .await
            .unwrap();
    }

    assert_eq!(
        orch.advance_question(round.id).await.unwrap(),
        Advance::NextQuestion { index: 1 }
    );
    assert_eq!(
        orch.advance_question(round.id).await.unwrap(),
        Advance::RoundEnded
    );
    let err = orch.advance_question(round.id).await.unwrap_err();
    assert!(
        matches!(err, DomainError::NotFound(NotFoundKind::Round, _)),
        "got {err:?}"
    );

    let played = drain(&mut operator);
    let played_kinds: Vec<&str> = played.iter().map(|m| m.kind()).collect();
    assert_eq!(
        played_kinds,
        vec![
            "GAME_STARTED",
            "NEW_ROUND",
            "QUESTION",
            "QUESTION_END",
            "QUESTION",
            "QUESTION_END",
            "ROUND_END",
        ]
    );
    match played.last().map(|m| &**m) {
        Some(ServerMsg::RoundEnd {
            round_id,
            winner_count,
        }) => {
            assert_eq!(*round_id, round.id);
            assert_eq!(*winner_count, 1);
        }
        other => panic!("expected ROUND_END, got {other:?}"),
    }
    for msg in &played {
        if let ServerMsg::Question { question, .. } = &**msg {
            let json = serde_json::to_value(question).unwrap();
            assert!(json.get("correct_option").is_none());
        }
    }
    drain(&mut ana_rx);
    drain(&mut bea_rx);

    orch.spin_and_award(session.id, round.id, &[ana.id]).await.unwrap();
    assert_eq!(kinds(&mut operator), vec!["WINNER_ANNOUNCED", "GAME_FINISHED"]);
    assert_eq!(
        kinds(&mut ana_rx),
        vec!["YOU_WIN", "WINNER_ANNOUNCED", "GAME_FINISHED"]
    );
    assert_eq!(kinds(&mut bea_rx), vec!["WINNER_ANNOUNCED", "GAME_FINISHED"]);
}

#[tokio::test]
async fn unattended_round_counts_down_and_ends() {
    let state = state_with(
        catalog(2, &[("Cesta", 1, 1)]),
        fast_scheduler(),
        Arc::new(ChaChaSource::new(Some(11))),
    )
    .await;
    let orch = state.orchestrator();
    let session = orch.create_session(2).await.unwrap();
    orch.start_session(session.id).await.unwrap();

    let mut operator = connect(&state, session.id, Participant::Operator);
    let round = orch.create_round(session.id).await.unwrap();

    let seen = recv_until(&mut operator, "ROUND_END", Duration::from_secs(5)).await;
    let labels: Vec<String> = seen
        .iter()
        .map(|m| match &**m {
            ServerMsg::Question { index, .. } => format!("Q{index}"),
            ServerMsg::Countdown { index, seconds, .. } => format!("T{index}:{seconds}"),
            ServerMsg::QuestionEnd { index, .. } => format!("E{index}"),
            other => other.kind().to_string(),
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            "NEW_ROUND", "Q0", "T0:1", "T0:0", "E0", "Q1", "T1:1", "T1:0", "E1", "ROUND_END",
        ]
    );

    assert!(!orch.scheduler().is_running(round.id));
    assert_eq!(orch.scheduler().running_round(session.id), None);
}

#[tokio::test]
async fn finishing_a_session_silences_its_timers() {
    let state = state_with(
        catalog(2, &[("Cesta", 1, 1)]),
        fast_scheduler(),
        Arc::new(ChaChaSource::new(Some(5))),
    )
    .await;
    let orch = state.orchestrator();
    let session = orch.create_session(2).await.unwrap();
    orch.start_session(session.id).await.unwrap();
    let mut operator = connect(&state, session.id, Participant::Operator);

    orch.create_round(session.id).await.unwrap();
    assert!(orch.finish_session(session.id).await.unwrap());
    tokio::time::sleep(Duration::from_millis(300)).await;

    let seen = kinds(&mut operator);
    assert_eq!(seen.last(), Some(&"GAME_FINISHED"));
    assert_eq!(seen.iter().filter(|k| **k == "GAME_FINISHED").count(), 1);
    assert!(!seen.contains(&"ROUND_END"));
}

#[tokio::test]
async fn reconnected_player_receives_targeted_events() {
    let state = test_state(catalog(1, &[("Cesta", 2, 1)])).await;
    let orch = state.orchestrator();
    let session = orch.create_session(1).await.unwrap();
    let ana = orch.join_session(&session.join_code, "Ana").await.unwrap();
    orch.join_session(&session.join_code, "Bea").await.unwrap();

    let who = Participant::Player { player_id: ana.id };
    let mut stale = connect(&state, session.id, who);
    let mut fresh = connect(&state, session.id, who);
    assert!(state.registry().is_player_connected(session.id, ana.id));

    orch.start_session(session.id).await.unwrap();
    let round = orch.create_round(session.id).await.unwrap();
    orch.end_round(round.id).await.unwrap();
    drain(&mut stale);
    drain(&mut fresh);

    orch.spin_and_award(session.id, round.id, &[ana.id]).await.unwrap();
    assert_eq!(kinds(&mut fresh), vec!["YOU_WIN", "WINNER_ANNOUNCED"]);
    assert_eq!(kinds(&mut stale), vec!["WINNER_ANNOUNCED"]);
}

#[tokio::test]
async fn closed_connections_do_not_block_broadcasts() {
    let state = test_state(catalog(1, &[("Cesta", 1, 1)])).await;
    let orch = state.orchestrator();
    let session = orch.create_session(1).await.unwrap();
    let ana = orch.join_session(&session.join_code, "Ana").await.unwrap();

    let gone = connect(&state, session.id, Participant::Player { player_id: ana.id });
    let mut operator = connect(&state, session.id, Participant::Operator);
    drop(gone);
    assert!(!state.registry().is_player_connected(session.id, ana.id));

    orch.start_session(session.id).await.unwrap();
    assert_eq!(kinds(&mut operator), vec!["GAME_STARTED"]);
}

#[tokio::test]
async fn identify_connection_checks_membership() {
    let state = test_state(catalog(1, &[])).await;
    let orch = state.orchestrator();
    let first = orch.create_session(1).await.unwrap();
    let ana = orch.join_session(&first.join_code, "Ana").await.unwrap();
    let second = orch.create_session(1).await.unwrap();

    let (session, who) = orch
        .identify_connection(&first.join_code, Some(ana.id), false)
        .await
        .unwrap();
    assert_eq!(session.id, first.id);
    assert_eq!(who, Participant::Player { player_id: ana.id });

    let (_, who) = orch
        .identify_connection(&second.join_code, None, true)
        .await
        .unwrap();
    assert_eq!(who, Participant::Operator);

    assert!(orch
        .identify_connection(&second.join_code, Some(ana.id), false)
        .await
        .is_err());
    assert!(orch
        .identify_connection(&first.join_code, None, false)
        .await
        .is_err());
}
