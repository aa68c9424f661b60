use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle states shared by bundles, content items and dataset versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Draft,
    InReview,
    Approved,
    Published,
}

impl State {
    pub const ALL: [State; 4] = [
        State::Draft,
        State::InReview,
        State::Approved,
        State::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Draft => "DRAFT",
            State::InReview => "IN_REVIEW",
            State::Approved => "APPROVED",
            State::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state value: {0}")]
pub struct UnknownState(pub String);

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(State::Draft),
            "IN_REVIEW" => Ok(State::InReview),
            "APPROVED" => Ok(State::Approved),
            "PUBLISHED" => Ok(State::Published),
            _ => Err(UnknownState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wire_names() {
        assert_eq!(serde_json::to_string(&State::InReview).unwrap(), "\"IN_REVIEW\"");
        let parsed: State = serde_json::from_str("\"PUBLISHED\"").unwrap();
        assert_eq!(parsed, State::Published);
    }

    #[test]
    fn test_state_from_str_is_case_insensitive() {
        assert_eq!("in_review".parse::<State>().unwrap(), State::InReview);
        assert!("ARCHIVED".parse::<State>().is_err());
    }
}
