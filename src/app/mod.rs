mod runner;
mod summary;

pub use runner::{RunOutcome, run_load};
pub use summary::summarize;
