// Collector - 呼び出し単位の結果収集機能

use crate::core::{ProgressReporter, Record, RecordFailure, RecordId, RecordOutcome, SkipReason};
use std::collections::HashSet;
use tokio::sync::mpsc;

/// 1回の呼び出しで収集した結果
///
/// Collector だけが所有し、ワーカーとは共有しない。
#[derive(Debug, Default)]
pub struct CollectedOutcomes {
    pub processed: Vec<Record>,
    pub failures: Vec<RecordFailure>,
    pub skipped: usize,
    /// チャンネルが閉じた時点で結果が届いていないID
    pub unreported: Vec<RecordId>,
}

/// Collector: 結果チャンネルが閉じるまで全結果を受信する
///
/// チャンネルは全ての送信側（投入側と全作業単位）がドロップされた時点で閉じる。
/// それまで戻らないため、途中経過が呼び出し元に見えることはない。
pub async fn collect_outcomes<R>(
    mut result_rx: mpsc::Receiver<(RecordId, RecordOutcome)>,
    ids: &[RecordId],
    reporter: &R,
) -> CollectedOutcomes
where
    R: ProgressReporter + ?Sized,
{
    let total = ids.len();
    let mut pending: HashSet<RecordId> = ids.iter().copied().collect();
    let mut collected = CollectedOutcomes::default();

    while let Some((id, outcome)) = result_rx.recv().await {
        if !pending.remove(&id) {
            tracing::warn!(id, "対象外または重複した結果を破棄しました");
            continue;
        }

        match outcome {
            RecordOutcome::Processed(record) => {
                tracing::debug!(id, "PROCESSED に遷移しました");
                collected.processed.push(record);
            }
            RecordOutcome::Skipped { reason, .. } => {
                log_skip(id, reason);
                collected.skipped += 1;
            }
            RecordOutcome::Failed(failure) => {
                reporter.report_failure(&failure).await;
                collected.failures.push(failure);
            }
        }

        // 進捗報告
        reporter.report_progress(total - pending.len(), total).await;
    }

    let mut unreported: Vec<RecordId> = pending.into_iter().collect();
    unreported.sort_unstable();
    collected.unreported = unreported;
    collected
}

fn log_skip(id: RecordId, reason: SkipReason) {
    match reason {
        SkipReason::NotFound => tracing::debug!(id, "削除済みのためスキップ"),
        SkipReason::AlreadyProcessed => tracing::debug!(id, "処理済みのためスキップ"),
        SkipReason::InFlight => tracing::debug!(id, "他の呼び出しが処理中のためスキップ"),
    }
}
