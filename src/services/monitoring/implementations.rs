// 進捗監視の具象実装

use crate::core::{ProgressReporter, RecordFailure};
use async_trait::async_trait;

const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// tracing による進捗報告実装
#[derive(Debug, Clone)]
pub struct TracingProgressReporter {
    progress_interval: usize,
}

impl Default for TracingProgressReporter {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl TracingProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 進捗ログを出す間隔（件数）を指定
    pub fn with_progress_interval(progress_interval: usize) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
        }
    }

    fn should_report(&self, completed: usize, total: usize) -> bool {
        completed % self.progress_interval == 0 || completed == total
    }
}

#[async_trait]
impl ProgressReporter for TracingProgressReporter {
    async fn report_started(&self, total: usize) {
        tracing::info!(total, "{total} 件のレコードを処理します");
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        if total > 0 && self.should_report(completed, total) {
            let percentage = (completed as f64 / total as f64) * 100.0;
            tracing::info!(completed, total, "進捗: {completed}/{total} ({percentage:.1}%)");
        }
    }

    async fn report_failure(&self, failure: &RecordFailure) {
        tracing::warn!(
            id = failure.id,
            stage = ?failure.stage,
            cause = %failure.cause,
            "レコード処理に失敗しました"
        );
    }

    async fn report_completed(&self, processed: usize, skipped: usize, failed: usize) {
        tracing::info!(
            processed,
            skipped,
            failed,
            "完了: 処理 {processed} 件, スキップ {skipped} 件, 失敗 {failed} 件"
        );
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _total: usize) {
        // 何もしない
    }

    async fn report_progress(&self, _completed: usize, _total: usize) {
        // 何もしない
    }

    async fn report_failure(&self, _failure: &RecordFailure) {
        // 何もしない
    }

    async fn report_completed(&self, _processed: usize, _skipped: usize, _failed: usize) {
        // 何もしない
    }
}
