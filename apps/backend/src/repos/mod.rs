//! Row-level persistence, generic over `ConnectionTrait` so every function
//! runs equally against a pooled connection or an open transaction.

pub mod answers;
pub mod players;
pub mod prizes;
pub mod questions;
pub mod rounds;
pub mod sessions;
