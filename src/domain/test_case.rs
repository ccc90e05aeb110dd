use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Which synthesis strategy produced (or should produce) a result set.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Local,
    Remote,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Local => "local",
            GenerationMode::Remote => "remote",
        }
    }

    /// Column names of the tabular rendering, in export order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            GenerationMode::Local => &STRUCTURED_COLUMNS,
            GenerationMode::Remote => &FREEFORM_COLUMNS,
        }
    }
}

pub const STRUCTURED_COLUMNS: [&str; 9] = [
    "requirementId",
    "requirement",
    "testCaseId",
    "title",
    "preconditions",
    "steps",
    "expectedResult",
    "complianceTag",
    "createdAt",
];

pub const FREEFORM_COLUMNS: [&str; 5] = [
    "requirementId",
    "requirement",
    "testCaseId",
    "details",
    "createdAt",
];

/// Regulatory clause cited by a locally synthesized test case.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplianceTag {
    #[serde(rename = "IEC 62304 §5.1")]
    Iec62304,
    #[serde(rename = "21 CFR 11 §11.10")]
    Cfr21Part11,
    #[serde(rename = "HIPAA §164.312")]
    Hipaa,
}

impl ComplianceTag {
    pub const ALL: [ComplianceTag; 3] = [
        ComplianceTag::Iec62304,
        ComplianceTag::Cfr21Part11,
        ComplianceTag::Hipaa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceTag::Iec62304 => "IEC 62304 §5.1",
            ComplianceTag::Cfr21Part11 => "21 CFR 11 §11.10",
            ComplianceTag::Hipaa => "HIPAA §164.312",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == value)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredFields {
    pub title: String,
    pub preconditions: String,
    pub steps: String,
    pub expected_result: String,
    pub compliance_tag: ComplianceTag,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FreeformFields {
    pub details: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TestCaseFields {
    Structured(StructuredFields),
    Freeform(FreeformFields),
}

impl TestCaseFields {
    pub fn mode(&self) -> GenerationMode {
        match self {
            TestCaseFields::Structured(_) => GenerationMode::Local,
            TestCaseFields::Freeform(_) => GenerationMode::Remote,
        }
    }
}

/// One row of output. Never mutated once built.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub requirement_id: String,
    pub requirement: String,
    pub test_case_id: String,
    #[serde(flatten)]
    pub fields: TestCaseFields,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
}

impl TestCaseRecord {
    /// Cell values in the same order as `GenerationMode::columns`.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.requirement_id.clone(),
            self.requirement.clone(),
            self.test_case_id.clone(),
        ];
        match &self.fields {
            TestCaseFields::Structured(fields) => {
                cells.push(fields.title.clone());
                cells.push(fields.preconditions.clone());
                cells.push(fields.steps.clone());
                cells.push(fields.expected_result.clone());
                cells.push(fields.compliance_tag.as_str().to_string());
            }
            TestCaseFields::Freeform(fields) => cells.push(fields.details.clone()),
        }
        cells.push(format_timestamp(&self.created_at));
        cells
    }
}

/// Ordered records of a single run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub mode: GenerationMode,
    pub records: Vec<TestCaseRecord>,
}

impl ResultSet {
    pub fn new(mode: GenerationMode, records: Vec<TestCaseRecord>) -> Self {
        Self { mode, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.mode.columns()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    RequestFailed { message: String },
    TimedOut { after_ms: u64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::RequestFailed { message } => write!(f, "{}", message),
            SkipReason::TimedOut { after_ms } => {
                write!(f, "request timed out after {}ms", after_ms)
            }
        }
    }
}

/// A requirement that produced no record, with its zero-based input position.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRequirement {
    pub position: usize,
    pub requirement: String,
    pub reason: SkipReason,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub result_set: ResultSet,
    pub skipped: Vec<SkippedRequirement>,
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| AppError::ParseError(format!("Invalid timestamp '{}': {}", value, e)))
}

mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
