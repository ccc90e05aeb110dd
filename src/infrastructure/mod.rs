#[path = "config/mod.rs"]
pub mod config_mod;
pub use config_mod as config;
pub mod document;
pub mod export;
pub mod llm_clients;
pub mod security;
pub mod session_store;
