// レコードとバッチ処理に関連するデータ型定義

use super::error::{ProcessingError, ProcessingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ストアが採番するレコード識別子
pub type RecordId = u64;

/// レコードの状態
///
/// 遷移は `Pending -> Processed` のみ。逆方向には戻らない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    #[serde(alias = "UNPROCESSED")]
    Pending,
    Processed,
}

impl RecordStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processed => "PROCESSED",
        }
    }

    pub const fn is_processed(&self) -> bool {
        matches!(self, Self::Processed)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 管理対象のレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 未保存のレコードは `None`。`save` で採番される
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: RecordStatus,
    pub email: String,
}

impl Record {
    /// 未保存（id なし、PENDING）のレコードを作成
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            status: RecordStatus::Pending,
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_processed(&self) -> bool {
        self.status.is_processed()
    }
}

/// 失敗が発生した処理段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// `find_by_id` の失敗
    Fetch,
    /// `save` の失敗
    Save,
    /// ワーカー上で作業単位が結果を返さずに終了した
    Worker,
}

/// レコード単位の失敗（失敗マニフェストの1行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub id: RecordId,
    pub stage: FailureStage,
    pub cause: String,
}

impl RecordFailure {
    pub fn new(id: RecordId, stage: FailureStage, cause: impl Into<String>) -> Self {
        Self {
            id,
            stage,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({:?}): {}", self.id, self.stage, self.cause)
    }
}

/// スキップ理由（エラーではない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// ID一覧取得後に削除された
    NotFound,
    /// 既に PROCESSED
    AlreadyProcessed,
    /// 重なって実行中の別の呼び出しが処理している
    InFlight,
}

/// 作業単位1件の結果
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Processed(Record),
    Skipped { id: RecordId, reason: SkipReason },
    Failed(RecordFailure),
}

/// 1回の process_all 呼び出しの集計結果
///
/// 呼び出しごとに新しく作られ、呼び出し元へ返された後は破棄される。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// この呼び出しで PROCESSED に遷移したレコード
    pub processed: Vec<Record>,
    /// レコード単位の失敗
    pub failures: Vec<RecordFailure>,
    /// 削除済み・処理済みでスキップした件数
    pub skipped: usize,
    /// ID一覧取得時点の対象件数
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl BatchReport {
    /// 失敗が1件もないか
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn failed_ids(&self) -> Vec<RecordId> {
        self.failures.iter().map(|f| f.id).collect()
    }

    /// 失敗が1件でもあれば全失敗IDを含む集約エラーにする
    pub fn into_strict(self) -> ProcessingResult<Vec<Record>> {
        if self.failures.is_empty() {
            Ok(self.processed)
        } else {
            Err(ProcessingError::partial_failure(self.failures))
        }
    }
}
