pub mod app_config;
pub mod error;
pub mod llm_config;
pub mod test_case;
