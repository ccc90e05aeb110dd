pub mod use_cases;

pub use use_cases::generate_test_cases::GenerateTestCasesUseCase;
pub use use_cases::requirement_extractor::extract_requirements;
