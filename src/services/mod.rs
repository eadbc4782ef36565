// サービス層 - 機能別のビジネスロジック
// 各サービスは特定の責任を持ち、疎結合で設計されている

pub mod config;
pub mod monitoring;
pub mod record_service;
pub mod validation;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::{AppConfig, DefaultBatchConfig};
pub use monitoring::{NoOpProgressReporter, TracingProgressReporter};
pub use record_service::RecordService;
pub use validation::{validate_email, validate_name, validate_record, validate_status_transition};
