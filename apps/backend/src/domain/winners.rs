//! Round-winning predicate.

use std::collections::{BTreeMap, HashSet};

/// One persisted answer, reduced to what the predicate needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub player_id: i64,
    pub question_id: i64,
    pub is_correct: bool,
}

/// Players who answered every question of the round and got all of them right.
///
/// Answers to questions outside `question_ids` are ignored, and a player with
/// two answers for the same question is disqualified. Only players listed in
/// `eligible` are considered. A round with no questions has no winners.
/// The result is sorted by player id.
pub fn round_winners(question_ids: &[i64], eligible: &[i64], answers: &[AnswerRecord]) -> Vec<i64> {
    let questions: HashSet<i64> = question_ids.iter().copied().collect();
    if questions.is_empty() {
        return Vec::new();
    }
    let eligible: HashSet<i64> = eligible.iter().copied().collect();

    // player -> (distinct questions answered correctly, disqualified)
    let mut tally: BTreeMap<i64, (HashSet<i64>, bool)> = BTreeMap::new();
    for answer in answers {
        if !eligible.contains(&answer.player_id) || !questions.contains(&answer.question_id) {
            continue;
        }
        let entry = tally
            .entry(answer.player_id)
            .or_insert_with(|| (HashSet::new(), false));
        let first = entry.0.insert(answer.question_id);
        if !first || !answer.is_correct {
            entry.1 = true;
        }
    }

    tally
        .into_iter()
        .filter(|(_, (answered, disqualified))| !*disqualified && answered.len() == questions.len())
        .map(|(player_id, _)| player_id)
        .collect()
}
