//! Real-time wire vocabulary.
//!
//! Server events serialize as `{"type": "QUESTION", ...}`; the only client
//! message is the keep-alive `{"type": "ping"}`.

use serde::{Deserialize, Serialize};

use crate::repos::prizes::Prize;
use crate::repos::questions::Question;
use crate::services::views::SessionSnapshot;

/// Who sits at the other end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Participant {
    Player { player_id: i64 },
    Operator,
}

impl Participant {
    pub fn player_id(&self) -> Option<i64> {
        match self {
            Participant::Player { player_id } => Some(*player_id),
            Participant::Operator => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Participant::Operator)
    }
}

/// Audience selector for broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    All,
    Players,
    Operators,
}

impl RoleFilter {
    pub fn admits(self, participant: &Participant) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Players => !participant.is_operator(),
            RoleFilter::Operators => participant.is_operator(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

/// Question as shown to participants; the correct option is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    pub options: QuestionOptions,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            options: QuestionOptions {
                a: q.option_a.clone(),
                b: q.option_b.clone(),
                c: q.option_c.clone(),
                d: q.option_d.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeRef {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub prize_type: String,
}

impl From<&Prize> for PrizeRef {
    fn from(p: &Prize) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            prize_type: p.prize_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Ping,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMsg {
    Connected {
        session_id: i64,
        #[serde(flatten)]
        participant: Participant,
    },
    GameStarted {
        session: SessionSnapshot,
    },
    NewRound {
        round_id: i64,
        round_no: u32,
        question_count: usize,
    },
    Question {
        round_id: i64,
        index: usize,
        total: usize,
        question: QuestionView,
    },
    Countdown {
        round_id: i64,
        index: usize,
        seconds: u32,
    },
    QuestionEnd {
        round_id: i64,
        index: usize,
    },
    RoundEnd {
        round_id: i64,
        winner_count: usize,
    },
    WinnerAnnounced {
        round_id: i64,
        player: PlayerRef,
        prize: PrizeRef,
    },
    YouWin {
        round_id: i64,
        prize: PrizeRef,
    },
    GameFinished,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "error")]
    Error {
        code: String,
        message: String,
    },
}

impl ServerMsg {
    /// Wire name of the event, as found in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMsg::Connected { .. } => "CONNECTED",
            ServerMsg::GameStarted { .. } => "GAME_STARTED",
            ServerMsg::NewRound { .. } => "NEW_ROUND",
            ServerMsg::Question { .. } => "QUESTION",
            ServerMsg::Countdown { .. } => "COUNTDOWN",
            ServerMsg::QuestionEnd { .. } => "QUESTION_END",
            ServerMsg::RoundEnd { .. } => "ROUND_END",
            ServerMsg::WinnerAnnounced { .. } => "WINNER_ANNOUNCED",
            ServerMsg::YouWin { .. } => "YOU_WIN",
            ServerMsg::GameFinished => "GAME_FINISHED",
            ServerMsg::Pong => "pong",
            ServerMsg::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn events_use_screaming_type_tags() {
        let msg = ServerMsg::QuestionEnd {
            round_id: 3,
            index: 1,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "QUESTION_END", "round_id": 3, "index": 1})
        );
        assert_eq!(
            serde_json::to_value(ServerMsg::GameFinished).unwrap(),
            json!({"type": "GAME_FINISHED"})
        );
    }

    #[test]
    fn connected_flattens_participant() {
        let msg = ServerMsg::Connected {
            session_id: 5,
            participant: Participant::Player { player_id: 9 },
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "CONNECTED", "session_id": 5, "role": "player", "player_id": 9})
        );
    }

    #[test]
    fn question_view_has_no_correct_option() {
        let view = QuestionView {
            id: 1,
            text: "2 + 2?".into(),
            options: QuestionOptions {
                a: "3".into(),
                b: "4".into(),
                c: "5".into(),
                d: "22".into(),
            },
        };
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("correct_option").is_none());
        assert_eq!(value["options"]["B"], "4");
    }

    #[test]
    fn ping_parses_and_kind_matches_tag() {
        let parsed: ClientMsg = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(parsed, ClientMsg::Ping);
        assert_eq!(
            serde_json::to_value(ServerMsg::Pong).unwrap()["type"],
            ServerMsg::Pong.kind()
        );
    }
}
