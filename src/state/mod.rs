//! Per-URL priming state

mod prime_state;

pub use prime_state::PrimeOutcome;
