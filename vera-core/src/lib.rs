pub mod ai;
pub mod analyzer;
pub mod detector;
pub mod export;
pub mod impact;
pub mod models;
pub mod quality;
pub mod registry;
pub mod store;
pub mod trace;

// Re-export commonly used types
pub use ai::{AiClient, AiError, AiMode, QualityAnalysis, RequirementExtractor, TestStepsResponse};
pub use analyzer::ChangeAnalyzer;
pub use detector::{compute_diff, text_change_stats, ChangeSet, UNCHANGED_SIMILARITY_THRESHOLD};
pub use impact::{classify, compute_impact, HIGH_MODIFIED_RATIO, HIGH_TOTAL_CHANGES};
pub use models::{
    Baseline, ChangeRecord, ChangeReport, ChangeSummary, ChangeType, ImpactLevel, ImpactReport,
    ModifiedField, TestImpact, TestStep, TextChangeStats,
};
pub use quality::{
    aggregate_score, IssueCategory, QualityBand, QualityIssue, QualityReport, Severity,
};
pub use registry::{get_config_dir, get_registry_path, Project, Registry};
pub use store::{BackendType, BaselineStore, MemoryStore, SqliteStore, YamlStore};
pub use trace::{coverage_summary, generate_rtm, CoverageSummary, RtmEntry};
