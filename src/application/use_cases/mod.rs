pub mod generate_test_cases;
pub mod requirement_extractor;
pub mod test_case_synthesis;
