//! Generative strategy backed by a text-generation service.
//!
//! One independent request per requirement, fanned out up to
//! `max_concurrency` at a time. Results are reassembled in input order. A
//! failed or timed-out request skips that requirement and the batch carries
//! on; there is no retry.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::prompts::{build_test_case_prompt, TEST_CASE_SYSTEM_PROMPT};
use super::RecordIdAllocator;
use crate::domain::app_config::RemoteOptions;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::test_case::{
    FreeformFields, SkipReason, SkippedRequirement, TestCaseFields, TestCaseRecord,
};
use crate::infrastructure::llm_clients::LLMClient;

/// Result of processing a single requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Generated(TestCaseRecord),
    Skipped(SkippedRequirement),
}

/// Records for the requirements that succeeded plus the ones that were skipped,
/// both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSynthesis {
    pub records: Vec<TestCaseRecord>,
    pub skipped: Vec<SkippedRequirement>,
}

pub struct RemoteSynthesizer {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
    max_concurrency: usize,
    request_timeout: Duration,
}

impl RemoteSynthesizer {
    /// Fails with `ConfigError` when the config carries no usable credential,
    /// so a misconfigured run stops before any requirement is sent.
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        config: LLMConfig,
        options: &RemoteOptions,
    ) -> Result<Self> {
        if config.credential().is_none() {
            return Err(AppError::ConfigError(format!(
                "No API key configured for {}. Set OPENAI_API_KEY or REQ2TEST_LLM__API_KEY.",
                config.provider.key_name()
            )));
        }

        Ok(Self {
            llm_client,
            config,
            max_concurrency: options.max_concurrency.max(1),
            request_timeout: options.request_timeout(),
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub async fn synthesize(&self, requirements: &[String]) -> RemoteSynthesis {
        let ids = Mutex::new(RecordIdAllocator::new());

        let outcomes: Vec<ItemOutcome> = stream::iter(requirements.iter().enumerate())
            .map(|(position, requirement)| self.synthesize_one(position, requirement, &ids))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut synthesis = RemoteSynthesis::default();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Generated(record) => synthesis.records.push(record),
                ItemOutcome::Skipped(skipped) => synthesis.skipped.push(skipped),
            }
        }

        info!(
            requested = requirements.len(),
            generated = synthesis.records.len(),
            skipped = synthesis.skipped.len(),
            "Remote synthesis finished"
        );
        synthesis
    }

    async fn synthesize_one(
        &self,
        position: usize,
        requirement: &str,
        ids: &Mutex<RecordIdAllocator>,
    ) -> ItemOutcome {
        let user_prompt = build_test_case_prompt(requirement);
        debug!(position, model = %self.config.model, "Requesting test case");

        let response = tokio::time::timeout(
            self.request_timeout,
            self.llm_client
                .generate(&self.config, TEST_CASE_SYSTEM_PROMPT, &user_prompt),
        )
        .await;

        let reason = match response {
            Ok(Ok(details)) if !details.trim().is_empty() => {
                let (requirement_id, test_case_id) = {
                    let mut ids = ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    (ids.next_requirement_id(), ids.next_test_case_id())
                };
                return ItemOutcome::Generated(TestCaseRecord {
                    requirement_id,
                    requirement: requirement.to_string(),
                    test_case_id,
                    fields: TestCaseFields::Freeform(FreeformFields { details }),
                    created_at: Utc::now(),
                });
            }
            // A blank body carries no test case; it is skipped like a failed call.
            Ok(Ok(_)) => SkipReason::RequestFailed {
                message: AppError::LLMError("Empty response".to_string()).to_string(),
            },
            Ok(Err(err)) => SkipReason::RequestFailed {
                message: err.to_string(),
            },
            Err(_) => SkipReason::TimedOut {
                after_ms: self.request_timeout.as_millis() as u64,
            },
        };

        warn!(position, reason = %reason, "Skipping requirement, generation failed");
        ItemOutcome::Skipped(SkippedRequirement {
            position,
            requirement: requirement.to_string(),
            reason,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    pub(crate) enum Script {
        Reply { delay_ms: u64 },
        Blank,
        Fail,
        Hang,
    }

    /// Answers by looking up which scripted requirement the prompt carries.
    pub(crate) struct ScriptedClient {
        script: HashMap<String, Script>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub(crate) fn new(script: Vec<(&str, Script)>) -> Self {
            Self {
                script: script
                    .into_iter()
                    .map(|(requirement, step)| (requirement.to_string(), step))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn peak(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn generate(&self, _config: &LLMConfig, system: &str, user: &str) -> Result<String> {
            assert_eq!(system, TEST_CASE_SYSTEM_PROMPT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            let requirement = user
                .strip_prefix("Requirement: ")
                .and_then(|rest| rest.split("\n\n").next())
                .unwrap_or_default()
                .to_string();
            let step = self
                .script
                .get(&requirement)
                .copied()
                .unwrap_or(Script::Reply { delay_ms: 0 });

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let result = match step {
                Script::Reply { delay_ms } => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Ok(format!("Title: Verify {}", requirement))
                }
                Script::Blank => Ok("  \n".to_string()),
                Script::Fail => Err(AppError::LLMError("API error (429): rate limited".to_string())),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".to_string())
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    pub(crate) fn configured() -> LLMConfig {
        LLMConfig {
            api_key: Some("sk-test".to_string()),
            ..LLMConfig::default()
        }
    }

    fn options(max_concurrency: usize) -> RemoteOptions {
        RemoteOptions {
            max_concurrency,
            request_timeout_secs: 5,
        }
    }

    fn requirement(i: usize) -> String {
        format!("Requirement {} shall be traceable to a test.", i)
    }

    fn details(record: &TestCaseRecord) -> &str {
        match &record.fields {
            TestCaseFields::Freeform(fields) => &fields.details,
            TestCaseFields::Structured(_) => panic!("remote records are freeform"),
        }
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let result = RemoteSynthesizer::new(client.clone(), LLMConfig::default(), &options(1));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_order_preserved_when_responses_arrive_reversed() {
        let input: Vec<String> = (0..6).map(requirement).collect();
        let script: Vec<(&str, Script)> = input
            .iter()
            .enumerate()
            .map(|(i, text)| {
                (
                    text.as_str(),
                    Script::Reply {
                        delay_ms: (6 - i as u64) * 25,
                    },
                )
            })
            .collect();
        let client = Arc::new(ScriptedClient::new(script));
        let synthesizer = RemoteSynthesizer::new(client.clone(), configured(), &options(6)).unwrap();

        let synthesis = synthesizer.synthesize(&input).await;

        let produced: Vec<&str> = synthesis.records.iter().map(|r| r.requirement.as_str()).collect();
        let expected: Vec<&str> = input.iter().map(String::as_str).collect();
        assert_eq!(produced, expected);
        assert!(synthesis.skipped.is_empty());
        assert_eq!(details(&synthesis.records[0]), format!("Title: Verify {}", input[0]));
        assert!(client.peak() > 1);
    }

    #[tokio::test]
    async fn test_partial_failure_skips_only_failed_positions() {
        let input: Vec<String> = (0..5).map(requirement).collect();
        let client = Arc::new(ScriptedClient::new(vec![
            (input[1].as_str(), Script::Fail),
            (input[3].as_str(), Script::Fail),
        ]));
        let synthesizer = RemoteSynthesizer::new(client.clone(), configured(), &options(2)).unwrap();

        let synthesis = synthesizer.synthesize(&input).await;

        assert_eq!(client.calls(), 5);
        assert_eq!(synthesis.records.len(), input.len() - 2);
        let produced: Vec<&str> = synthesis.records.iter().map(|r| r.requirement.as_str()).collect();
        assert_eq!(produced, vec![input[0].as_str(), input[2].as_str(), input[4].as_str()]);

        let positions: Vec<usize> = synthesis.skipped.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 3]);
        assert!(matches!(
            &synthesis.skipped[0].reason,
            SkipReason::RequestFailed { message } if message.contains("429")
        ));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let input: Vec<String> = (0..8).map(requirement).collect();
        let script: Vec<(&str, Script)> = input
            .iter()
            .map(|text| (text.as_str(), Script::Reply { delay_ms: 20 }))
            .collect();
        let client = Arc::new(ScriptedClient::new(script));
        let synthesizer = RemoteSynthesizer::new(client.clone(), configured(), &options(3)).unwrap();

        let synthesis = synthesizer.synthesize(&input).await;

        assert_eq!(synthesis.records.len(), 8);
        assert!(client.peak() <= 3);
    }

    #[tokio::test]
    async fn test_timeout_is_an_ordinary_skip() {
        let input = vec![requirement(0), requirement(1)];
        let client = Arc::new(ScriptedClient::new(vec![(input[0].as_str(), Script::Hang)]));
        let synthesizer = RemoteSynthesizer::new(client, configured(), &options(2))
            .unwrap()
            .with_request_timeout(Duration::from_millis(50));

        let synthesis = synthesizer.synthesize(&input).await;

        assert_eq!(synthesis.records.len(), 1);
        assert_eq!(synthesis.records[0].requirement, input[1]);
        assert_eq!(
            synthesis.skipped[0].reason,
            SkipReason::TimedOut { after_ms: 50 }
        );
    }

    #[tokio::test]
    async fn test_every_item_failing_yields_empty_records() {
        let input = vec![requirement(0), requirement(1)];
        let client = Arc::new(ScriptedClient::new(vec![
            (input[0].as_str(), Script::Fail),
            (input[1].as_str(), Script::Fail),
        ]));
        let synthesizer = RemoteSynthesizer::new(client, configured(), &options(1)).unwrap();

        let synthesis = synthesizer.synthesize(&input).await;
        assert!(synthesis.records.is_empty());
        assert_eq!(synthesis.skipped.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_reply_is_skipped() {
        let input = vec![requirement(0), requirement(1)];
        let client = Arc::new(ScriptedClient::new(vec![(input[0].as_str(), Script::Blank)]));
        let synthesizer = RemoteSynthesizer::new(client, configured(), &options(2)).unwrap();

        let synthesis = synthesizer.synthesize(&input).await;
        assert_eq!(synthesis.records.len(), 1);
        assert_eq!(synthesis.records[0].requirement, input[1]);
        assert_eq!(synthesis.skipped[0].position, 0);
        assert!(matches!(
            &synthesis.skipped[0].reason,
            SkipReason::RequestFailed { message } if message.contains("Empty response")
        ));
    }

    #[tokio::test]
    async fn test_ids_unique_across_concurrent_items() {
        let input: Vec<String> = (0..40).map(requirement).collect();
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let synthesizer = RemoteSynthesizer::new(client, configured(), &options(8)).unwrap();

        let synthesis = synthesizer.synthesize(&input).await;
        let ids: HashSet<&str> = synthesis
            .records
            .iter()
            .flat_map(|r| [r.requirement_id.as_str(), r.test_case_id.as_str()])
            .collect();
        assert_eq!(ids.len(), 80);
    }
}
