//! Join code generation for sessions.
//!
//! Join codes are 8-character strings over Crockford's Base32 alphabet.

use crate::domain::random::RandomSource;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const JOIN_CODE_LEN: usize = 8;

pub fn generate_join_code(rng: &dyn RandomSource) -> String {
    let mut s = String::with_capacity(JOIN_CODE_LEN);
    for _ in 0..JOIN_CODE_LEN {
        s.push(CROCKFORD[rng.next_index(CROCKFORD.len())] as char);
    }
    s
}

/// Upper-case and strip whitespace so codes typed by hand still match.
pub fn normalize_join_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
