// レコード管理システムのトレイト定義
// 全ての抽象化インターフェースを定義

use super::types::{Record, RecordFailure, RecordId};
use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;

/// レコードの永続化を担うストアの抽象化トレイト
///
/// 永続化されたレコードの状態はストアだけが所有する。
#[automock]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 全レコードのIDを取得
    async fn find_all_ids(&self) -> Result<Vec<RecordId>>;

    /// 全レコードを取得
    async fn find_all(&self) -> Result<Vec<Record>>;

    /// IDでレコードを取得
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>>;

    /// レコードを保存（upsert）。`id` が無ければ採番して返す
    async fn save(&self, record: Record) -> Result<Record>;

    /// レコードを削除。存在しないIDは何もしない
    async fn delete_by_id(&self, id: RecordId) -> Result<()>;
}

// RecordStore for Box<dyn RecordStore>
#[async_trait]
impl RecordStore for Box<dyn RecordStore> {
    async fn find_all_ids(&self) -> Result<Vec<RecordId>> {
        self.as_ref().find_all_ids().await
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        self.as_ref().find_all().await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        self.as_ref().find_by_id(id).await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        self.as_ref().save(record).await
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<()> {
        self.as_ref().delete_by_id(id).await
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn find_all_ids(&self) -> Result<Vec<RecordId>> {
        self.as_ref().find_all_ids().await
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        self.as_ref().find_all().await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        self.as_ref().find_by_id(id).await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        self.as_ref().save(record).await
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<()> {
        self.as_ref().delete_by_id(id).await
    }
}

/// バッチ処理の設定を抽象化するトレイト
pub trait BatchConfig: Send + Sync {
    /// ワーカー数（プール作成時に一度だけ参照される）
    fn worker_count(&self) -> usize;

    /// 作業キュー・結果チャンネルのバッファサイズ
    fn queue_capacity(&self) -> usize;
}

/// 進捗報告の抽象化トレイト
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 処理開始時の報告
    async fn report_started(&self, total: usize);

    /// 進捗更新の報告
    async fn report_progress(&self, completed: usize, total: usize);

    /// レコード単位の失敗の報告
    async fn report_failure(&self, failure: &RecordFailure);

    /// 処理完了時の報告
    async fn report_completed(&self, processed: usize, skipped: usize, failed: usize);
}
