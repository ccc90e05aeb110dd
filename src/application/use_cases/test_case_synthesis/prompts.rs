pub const TEST_CASE_SYSTEM_PROMPT: &str = "You are a senior QA engineer reviewing regulated healthcare software. Write explicit, auditable test cases that an auditor can trace back to the requirement they verify.";

pub fn build_test_case_prompt(requirement: &str) -> String {
    format!(
        "Requirement: {}\n\nGenerate 1 test case with: Title, Preconditions, Steps, Expected Result, Compliance tags.",
        requirement
    )
}
