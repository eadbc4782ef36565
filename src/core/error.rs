// レコード処理専用のカスタムエラー型定義

use super::types::{RecordFailure, RecordId};
use thiserror::Error;

/// レコード処理のエラー型
///
/// レコード単位の失敗は `BatchReport::failures` に記録され、ここには現れない。
/// このエラーが返るのは呼び出し全体が成立しなかった場合のみ。
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("レコードID一覧の取得エラー: {source}")]
    IdListingError {
        #[source]
        source: anyhow::Error,
    },

    #[error("ストアエラー: {operation} - {source}")]
    StoreError {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("ワーカープールは停止済みです")]
    WorkerPoolClosed,

    #[error("レコード {id} は処理中のため変更できません")]
    RecordInUse { id: RecordId },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error(transparent)]
    ValidationError(#[from] ValidationError),

    #[error("{} 件のレコード処理に失敗しました: {}", .failures.len(), describe_failures(.failures))]
    PartialFailureError { failures: Vec<RecordFailure> },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },
}

fn describe_failures(failures: &[RecordFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ProcessingError {
    /// ID一覧取得エラーの作成
    pub fn id_listing(source: anyhow::Error) -> Self {
        Self::IdListingError { source }
    }

    /// ストアエラーの作成
    pub fn store(operation: impl Into<String>, source: anyhow::Error) -> Self {
        Self::StoreError {
            operation: operation.into(),
            source,
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// バリデーションエラーの作成
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError(ValidationError::new(field, reason))
    }

    /// 集約エラーの作成
    pub fn partial_failure(failures: Vec<RecordFailure>) -> Self {
        Self::PartialFailureError { failures }
    }

    /// 集約エラーに含まれる失敗ID
    pub fn failed_ids(&self) -> Vec<RecordId> {
        match self {
            Self::PartialFailureError { failures } => failures.iter().map(|f| f.id).collect(),
            _ => Vec::new(),
        }
    }

    /// 呼び出し側の入力に起因するエラーか
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::RecordInUse { .. })
    }
}

/// 処理の結果型
pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;

/// 検証結果 - バリデーション専用の結果型
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// バリデーション専用エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("バリデーションエラー: {field} - {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    /// 新しいバリデーションエラーを作成
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for ProcessingError {
    fn from(error: tokio::task::JoinError) -> Self {
        ProcessingError::TaskError { source: error }
    }
}
