pub mod assertions;
pub mod builders;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::ScoreAssertion;
pub use builders::MatchBuilder;
