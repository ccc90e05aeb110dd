use crate::application::GenerateTestCasesUseCase;
use crate::domain::app_config::AppConfig;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::infrastructure::session_store::SessionStore;
use std::sync::Arc;

pub struct AppState {
    pub generate_use_case: GenerateTestCasesUseCase,
    pub session: SessionStore,
}

impl AppState {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: AppConfig) -> Self {
        Self {
            generate_use_case: GenerateTestCasesUseCase::new(llm_client, config),
            session: SessionStore::new(),
        }
    }

    /// State wired to the real provider router.
    pub fn with_router(config: AppConfig) -> Self {
        Self::new(Arc::new(RouterClient::new()), config)
    }
}
