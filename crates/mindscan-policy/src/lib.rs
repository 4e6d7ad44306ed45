//! MindScan Policy
//!
//! Declarative aggregation of per-post predictions into a profile verdict.
//!
//! A [`RuleSet`] is an ordered cascade defined in YAML. Each rule has:
//! - A condition (`any_of`, `share_above`, `count_at_least`, `mode`)
//! - A display verdict and a severity
//!
//! The first enabled rule whose condition holds decides the verdict.

pub mod aggregator;
pub mod condition;
pub mod rule;
pub mod stats;

pub use aggregator::{aggregate, Aggregator, ProfileVerdict, FALLBACK_RULE};
pub use condition::Condition;
pub use rule::{Rule, RuleSet, Severity};
pub use stats::{LabelCount, LabelStats};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregator::{aggregate, Aggregator, ProfileVerdict};
    pub use crate::condition::Condition;
    pub use crate::rule::{Rule, RuleSet, Severity};
}
