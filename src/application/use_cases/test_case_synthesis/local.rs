//! Offline placeholder strategy.
//!
//! Every requirement gets exactly one structured record with fixed
//! preconditions, steps and expected result. The compliance tag is a uniform
//! random pick, so two runs over the same input differ unless the caller pins
//! the random source with [`LocalSynthesizer::with_rng`].

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::RecordIdAllocator;
use crate::domain::test_case::{ComplianceTag, StructuredFields, TestCaseFields, TestCaseRecord};

pub const PRECONDITIONS: &str = "System initialized, test user created";
pub const STEPS: &str = "Step 1: Do X; Step 2: Do Y";
pub const EXPECTED_RESULT: &str = "System behaves as per requirement";

const TITLE_PREFIX: &str = "Verify: ";
const TITLE_REQUIREMENT_CHARS: usize = 40;

pub struct LocalSynthesizer<R = StdRng> {
    rng: R,
}

impl LocalSynthesizer<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for LocalSynthesizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> LocalSynthesizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn synthesize(&mut self, requirements: &[String]) -> Vec<TestCaseRecord> {
        let mut ids = RecordIdAllocator::new();
        requirements
            .iter()
            .map(|requirement| TestCaseRecord {
                requirement_id: ids.next_requirement_id(),
                requirement: requirement.clone(),
                test_case_id: ids.next_test_case_id(),
                fields: TestCaseFields::Structured(StructuredFields {
                    title: title_for(requirement),
                    preconditions: PRECONDITIONS.to_string(),
                    steps: STEPS.to_string(),
                    expected_result: EXPECTED_RESULT.to_string(),
                    compliance_tag: self.pick_compliance_tag(),
                }),
                created_at: Utc::now(),
            })
            .collect()
    }

    fn pick_compliance_tag(&mut self) -> ComplianceTag {
        let index = self.rng.gen_range(0..ComplianceTag::ALL.len());
        ComplianceTag::ALL[index]
    }
}

/// `Verify: ` + the first 40 characters of the requirement + `...`.
pub fn title_for(requirement: &str) -> String {
    let head: String = requirement.chars().take(TITLE_REQUIREMENT_CHARS).collect();
    format!("{}{}...", TITLE_PREFIX, head)
}
