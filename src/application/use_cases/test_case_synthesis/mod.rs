//! Test case synthesis strategies.
//!
//! Both strategies turn an ordered requirement list into records in the same
//! order. The local strategy is synchronous and never fails; the remote one
//! delegates to a text-generation service and may skip items.

mod ids;
pub mod local;
mod prompts;
pub mod remote;

pub use ids::RecordIdAllocator;
pub use local::LocalSynthesizer;
pub use prompts::{build_test_case_prompt, TEST_CASE_SYSTEM_PROMPT};
pub use remote::{ItemOutcome, RemoteSynthesizer, RemoteSynthesis};
