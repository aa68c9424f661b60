use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::error::{BundleError, BundleResult};
use crate::models::State;

/// Which handler runs once a transition has been matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerTag {
    /// Generic cascade, content optional
    Cascade,
    /// All content must already be approved, then cascade
    Approval,
    /// Bundle must hold content, then cascade
    Publication,
}

impl HandlerTag {
    pub fn requires_content(&self) -> bool {
        matches!(self, HandlerTag::Approval | HandlerTag::Publication)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub target: State,
    pub allowed_sources: Vec<State>,
    pub handler: HandlerTag,
}

impl Transition {
    pub fn new(target: State, allowed_sources: &[State], handler: HandlerTag) -> Self {
        Self {
            target,
            allowed_sources: allowed_sources.to_vec(),
            handler,
        }
    }

    pub fn allows(&self, source: State) -> bool {
        self.allowed_sources.contains(&source)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("transition target {0} is not a valid state")]
    UnknownTarget(State),
    #[error("transition to {target} allows unknown source state {source_state}")]
    UnknownSource { target: State, source_state: State },
}

/// Immutable table of legal bundle transitions, indexed by target state.
///
/// Declaration order matters: when several entries for one target accept the
/// same source, the first declared entry wins.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionTable {
    states: Vec<State>,
    transitions: Vec<Transition>,
    #[serde(skip)]
    by_target: HashMap<State, Vec<usize>>,
}

impl TransitionTable {
    pub fn new(states: Vec<State>, transitions: Vec<Transition>) -> Result<Self, TableError> {
        for transition in &transitions {
            if !states.contains(&transition.target) {
                return Err(TableError::UnknownTarget(transition.target));
            }
            if let Some(source) = transition
                .allowed_sources
                .iter()
                .find(|source| !states.contains(source))
            {
                return Err(TableError::UnknownSource {
                    target: transition.target,
                    source_state: *source,
                });
            }
        }
        Ok(Self::build(states, transitions))
    }

    /// DRAFT <-> IN_REVIEW, IN_REVIEW -> APPROVED, APPROVED -> PUBLISHED,
    /// and APPROVED back to DRAFT or IN_REVIEW
    pub fn bundle_lifecycle() -> Self {
        Self::build(
            State::ALL.to_vec(),
            vec![
                Transition::new(
                    State::Draft,
                    &[State::InReview, State::Approved],
                    HandlerTag::Cascade,
                ),
                Transition::new(
                    State::InReview,
                    &[State::Draft, State::Approved],
                    HandlerTag::Cascade,
                ),
                Transition::new(State::Approved, &[State::InReview], HandlerTag::Approval),
                Transition::new(State::Published, &[State::Approved], HandlerTag::Publication),
            ],
        )
    }

    fn build(states: Vec<State>, transitions: Vec<Transition>) -> Self {
        let mut by_target: HashMap<State, Vec<usize>> = HashMap::new();
        for (index, transition) in transitions.iter().enumerate() {
            by_target.entry(transition.target).or_default().push(index);
        }
        Self {
            states,
            transitions,
            by_target,
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Find the entry that moves `source` to `target`
    pub fn resolve(&self, source: State, target: State) -> BundleResult<&Transition> {
        let candidates = match self.by_target.get(&target) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => {
                return Err(BundleError::transition(
                    "incorrect state value: no transitions found for target state",
                ))
            }
        };

        candidates
            .iter()
            .map(|&index| &self.transitions[index])
            .find(|transition| transition.allows(source))
            .ok_or_else(|| {
                BundleError::transition(format!("no valid transition from {source} to {target}"))
            })
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::bundle_lifecycle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LEGAL: [(State, State); 6] = [
        (State::InReview, State::Draft),
        (State::Approved, State::Draft),
        (State::Draft, State::InReview),
        (State::Approved, State::InReview),
        (State::InReview, State::Approved),
        (State::Approved, State::Published),
    ];

    fn any_state() -> impl Strategy<Value = State> {
        proptest::sample::select(State::ALL.to_vec())
    }

    #[test]
    fn test_lifecycle_handlers() {
        let table = TransitionTable::bundle_lifecycle();
        assert_eq!(
            table.resolve(State::InReview, State::Approved).unwrap().handler,
            HandlerTag::Approval
        );
        assert_eq!(
            table.resolve(State::Approved, State::Published).unwrap().handler,
            HandlerTag::Publication
        );
        assert_eq!(
            table.resolve(State::Draft, State::InReview).unwrap().handler,
            HandlerTag::Cascade
        );
    }

    #[test]
    fn test_unknown_target_message() {
        let table = TransitionTable::new(
            vec![State::Draft, State::InReview],
            vec![Transition::new(State::InReview, &[State::Draft], HandlerTag::Cascade)],
        )
        .unwrap();

        let err = table.resolve(State::InReview, State::Draft).unwrap_err();
        assert!(matches!(err, BundleError::Transition(_)));
        assert_eq!(
            err.to_string(),
            "incorrect state value: no transitions found for target state"
        );
    }

    #[test]
    fn test_no_valid_source_message() {
        let table = TransitionTable::bundle_lifecycle();
        let err = table.resolve(State::Draft, State::Published).unwrap_err();
        assert_eq!(err.to_string(), "no valid transition from DRAFT to PUBLISHED");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_first_declared_entry_wins() {
        let table = TransitionTable::new(
            State::ALL.to_vec(),
            vec![
                Transition::new(State::Approved, &[State::InReview], HandlerTag::Approval),
                Transition::new(
                    State::Approved,
                    &[State::InReview, State::Draft],
                    HandlerTag::Cascade,
                ),
            ],
        )
        .unwrap();

        assert_eq!(
            table.resolve(State::InReview, State::Approved).unwrap().handler,
            HandlerTag::Approval
        );
        assert_eq!(
            table.resolve(State::Draft, State::Approved).unwrap().handler,
            HandlerTag::Cascade
        );
    }

    #[test]
    fn test_construction_rejects_unknown_states() {
        let err = TransitionTable::new(
            vec![State::Draft],
            vec![Transition::new(State::InReview, &[State::Draft], HandlerTag::Cascade)],
        )
        .unwrap_err();
        assert_eq!(err, TableError::UnknownTarget(State::InReview));

        let err = TransitionTable::new(
            vec![State::Draft, State::InReview],
            vec![Transition::new(State::InReview, &[State::Published], HandlerTag::Cascade)],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::UnknownSource { .. }));
    }

    #[test]
    fn test_table_serializes_as_data() {
        let value = serde_json::to_value(TransitionTable::bundle_lifecycle()).unwrap();
        assert_eq!(value["transitions"][2]["target"], "APPROVED");
        assert_eq!(value["transitions"][2]["handler"], "approval");
        assert!(value.get("by_target").is_none());
    }

    proptest! {
        #[test]
        fn prop_only_declared_pairs_resolve(source in any_state(), target in any_state()) {
            let table = TransitionTable::bundle_lifecycle();
            let declared = LEGAL.contains(&(source, target));
            match table.resolve(source, target) {
                Ok(transition) => {
                    prop_assert!(declared);
                    prop_assert_eq!(transition.target, target);
                    prop_assert!(transition.allows(source));
                }
                Err(err) => {
                    prop_assert!(!declared);
                    prop_assert!(matches!(err, BundleError::Transition(_)), "unexpected error kind: {:?}", err);
                }
            }
        }
    }
}
