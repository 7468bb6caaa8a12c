use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// One of the four options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] = [
        AnswerOption::A,
        AnswerOption::B,
        AnswerOption::C,
        AnswerOption::D,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }
}

impl FromStr for AnswerOption {
    type Err = DomainError;

    /// Accepts "A", "B", "C" or "D" in either case. Whitespace is significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            _ => Err(DomainError::validation(
                ValidationKind::InvalidOption,
                format!("Option must be one of A, B, C, D (got '{s}')"),
            )),
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_four_letters() {
        for opt in AnswerOption::ALL {
            assert_eq!(opt.as_str().parse::<AnswerOption>().unwrap(), opt);
        }
    }

    #[test]
    fn lower_case_letters_are_accepted() {
        assert_eq!("a".parse::<AnswerOption>().unwrap(), AnswerOption::A);
        assert_eq!("d".parse::<AnswerOption>().unwrap(), AnswerOption::D);
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["", "e", "E", "AB", " A", "b ", "1"] {
            let err = raw.parse::<AnswerOption>().unwrap_err();
            assert!(matches!(
                err,
                DomainError::Validation(ValidationKind::InvalidOption, _)
            ));
        }
    }
}
