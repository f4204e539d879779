use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// ストアが採番するBookのID。作成後は変わらない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_integer("id", s).map(Self)
    }
}

/// フォーム値を整数として解釈する。前後の空白は許さない。
pub(crate) fn parse_integer(field: &'static str, raw: &str) -> Result<i64, DomainError> {
    raw.parse::<i64>().map_err(|_| DomainError::InvalidInteger {
        field,
        value: raw.to_string(),
    })
}
