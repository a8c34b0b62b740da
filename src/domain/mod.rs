//! Domain logic for the workflow state machine
//!
//! - `states` - the closed state vocabulary and terminality
//! - `transitions` - the transition map (static edges + dynamic rules)
//! - `validation` - per-state entry preconditions

pub mod states;
pub mod transitions;
pub mod validation;

pub use states::{is_terminal_state, ALL_STATES};
pub use transitions::{
    assert_valid_transition, get_next_state, next_states, transition_rule, Rule,
    MAX_ARTICLE_ATTEMPTS,
};
pub use validation::validate_context_for_state;
