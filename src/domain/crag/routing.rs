//! Routing policy: decides the next step after grading
//!
//! Pure functions of three integers. The retry bound is enforced here and nowhere else:
//! `Rewrite` is only returned while `retry_count < max_retries`, and each rewrite
//! increments `retry_count`, so a run performs at most `max_retries + 1` retrieval cycles.

use serde::{Deserialize, Serialize};

/// Next step after grading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// Synthesize an answer from the relevant passages
    Generate,
    /// Reformulate the query and retrieve again
    Rewrite,
    /// Stop with the fixed refusal message
    NoAnswer,
}

impl RouteDecision {
    /// Whether this decision ends the run
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Rewrite)
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Rewrite => write!(f, "rewrite"),
            Self::NoAnswer => write!(f, "no_answer"),
        }
    }
}

/// What to do when no passage is relevant and the retry budget is spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Generate a hedged answer from whatever context is on hand
    #[default]
    Generate,
    /// Return the refusal message
    NoAnswer,
}

impl ExhaustionPolicy {
    /// Route under this policy.
    ///
    /// 1. any relevant passage -> `Generate`
    /// 2. none, budget left    -> `Rewrite`
    /// 3. none, budget spent   -> `Generate` or `NoAnswer` depending on the policy
    pub fn route(&self, relevant_count: usize, retry_count: u32, max_retries: u32) -> RouteDecision {
        if relevant_count >= 1 {
            RouteDecision::Generate
        } else if retry_count < max_retries {
            RouteDecision::Rewrite
        } else {
            match self {
                Self::Generate => RouteDecision::Generate,
                Self::NoAnswer => RouteDecision::NoAnswer,
            }
        }
    }
}

/// Route under the default policy (forced generation once retries are exhausted)
pub fn route(relevant_count: usize, retry_count: u32, max_retries: u32) -> RouteDecision {
    ExhaustionPolicy::default().route(relevant_count, retry_count, max_retries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routing_table() {
        let cases = [
            // (relevant, retry, max, expected)
            (1, 0, 2, RouteDecision::Generate),
            (0, 0, 2, RouteDecision::Rewrite),
            (0, 1, 2, RouteDecision::Rewrite),
            (0, 2, 2, RouteDecision::Generate),
            (0, 5, 2, RouteDecision::Generate),
            (3, 2, 2, RouteDecision::Generate),
            (0, 0, 0, RouteDecision::Generate),
        ];

        for (relevant, retry, max, expected) in cases {
            assert_eq!(
                route(relevant, retry, max),
                expected,
                "route({}, {}, {})",
                relevant,
                retry,
                max
            );
        }
    }

    #[test]
    fn test_no_answer_policy_only_changes_exhaustion() {
        let policy = ExhaustionPolicy::NoAnswer;

        assert_eq!(policy.route(1, 0, 2), RouteDecision::Generate);
        assert_eq!(policy.route(2, 2, 2), RouteDecision::Generate);
        assert_eq!(policy.route(0, 0, 2), RouteDecision::Rewrite);
        assert_eq!(policy.route(0, 2, 2), RouteDecision::NoAnswer);
        assert_eq!(policy.route(0, 7, 2), RouteDecision::NoAnswer);
    }

    #[test]
    fn test_rewrite_never_returned_once_budget_spent() {
        for policy in [ExhaustionPolicy::Generate, ExhaustionPolicy::NoAnswer] {
            for max in 0..6u32 {
                for retry in max..max + 4 {
                    assert!(policy.route(0, retry, max).is_terminal());
                }
            }
        }
    }

    #[test]
    fn test_policy_serde() {
        let policy: ExhaustionPolicy = serde_json::from_str(r#""no_answer""#).unwrap();
        assert_eq!(policy, ExhaustionPolicy::NoAnswer);
        assert_eq!(ExhaustionPolicy::default(), ExhaustionPolicy::Generate);
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(RouteDecision::NoAnswer.to_string(), "no_answer");
        assert!(!RouteDecision::Rewrite.is_terminal());
    }
}
