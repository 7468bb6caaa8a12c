//! Pure quiz rules: no I/O, no database, no HTTP.

pub mod answer_option;
pub mod random;
pub mod winners;

pub use answer_option::AnswerOption;
pub use random::{sample_distinct, ChaChaSource, RandomSource, ScriptedSource};
pub use winners::{round_winners, AnswerRecord};
