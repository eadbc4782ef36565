// BatchProcessor - 全レコード一括処理のオーケストレーション
// ID一覧の配信、ワーカープールでの並列処理、結果収集までを管理する

use super::claims::InFlightClaims;
use super::collector::{collect_outcomes, CollectedOutcomes};
use super::unit::process_record;
use super::worker_pool::WorkerPool;
use crate::core::{
    BatchConfig, BatchReport, FailureStage, ProcessingError, ProcessingResult, ProgressReporter,
    RecordFailure, RecordId, RecordOutcome, RecordStore, SkipReason,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const UNREPORTED_CAUSE: &str = "作業単位が結果を返さずに終了しました";

/// 全レコードを並列に PROCESSED へ遷移させる処理エンジン
///
/// ワーカープールはエンジンと同じ寿命で、呼び出しをまたいで共有される。
/// 結果の集計先は呼び出しごとに新しく作られ、フィールドには持たない。
/// 共有が必要な場合は `Arc<BatchProcessor>` でラップする。
pub struct BatchProcessor<S, R> {
    store: Arc<S>,
    reporter: Arc<R>,
    pool: WorkerPool,
    claims: InFlightClaims,
    result_buffer: usize,
}

impl<S, R> BatchProcessor<S, R>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
{
    /// 新しい処理エンジンを作成（ワーカープールもここで起動する）
    pub fn new<C: BatchConfig>(store: S, config: &C, reporter: R) -> ProcessingResult<Self> {
        let pool = WorkerPool::from_config(config)?;
        Ok(Self {
            store: Arc::new(store),
            reporter: Arc::new(reporter),
            pool,
            claims: InFlightClaims::new(),
            result_buffer: config.queue_capacity(),
        })
    }

    /// ストアへの参照を取得
    pub fn store(&self) -> &S {
        &self.store
    }

    /// レポーターへの参照を取得
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// 作業単位と共有する処理中IDの占有
    pub(crate) fn claims(&self) -> &InFlightClaims {
        &self.claims
    }

    /// ストアの全レコードを処理
    ///
    /// 対象はID一覧取得時点のレコードに固定される。全作業単位が終わるまで戻らない。
    /// ID一覧の取得失敗だけが `Err` になり、レコード単位の失敗は
    /// `BatchReport::failures` に入る。
    pub async fn process_all(&self) -> ProcessingResult<BatchReport> {
        let ids = self
            .store
            .find_all_ids()
            .await
            .map_err(ProcessingError::id_listing)?;

        self.process_ids(ids).await
    }

    /// 指定したIDのレコードを処理
    pub async fn process_ids(&self, mut ids: Vec<RecordId>) -> ProcessingResult<BatchReport> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        // 各IDの作業単位はちょうど1つ
        ids.sort_unstable();
        ids.dedup();
        let total = ids.len();

        tracing::info!(total, workers = self.pool.worker_count(), "バッチ処理を開始します");
        self.reporter.report_started(total).await;

        // 呼び出し専用の結果チャンネル
        let (result_tx, result_rx) = mpsc::channel(self.result_buffer);

        // 投入と収集を並行に進める（結果チャンネルが詰まって投入が止まらないように）
        let (dispatch_result, collected) = tokio::join!(
            self.dispatch(&ids, result_tx),
            collect_outcomes(result_rx, &ids, self.reporter.as_ref()),
        );

        let CollectedOutcomes {
            mut processed,
            mut failures,
            skipped,
            unreported,
        } = collected;

        let unreported_cause = match &dispatch_result {
            Ok(()) => UNREPORTED_CAUSE.to_string(),
            Err(error) => {
                tracing::error!(%error, "作業の投入が中断されました");
                error.to_string()
            }
        };
        for id in unreported {
            let failure = RecordFailure::new(id, FailureStage::Worker, unreported_cause.clone());
            self.reporter.report_failure(&failure).await;
            failures.push(failure);
        }

        processed.sort_by_key(|record| record.id);
        failures.sort_by_key(|failure| failure.id);

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        self.reporter
            .report_completed(processed.len(), skipped, failures.len())
            .await;
        tracing::info!(
            processed = processed.len(),
            skipped,
            failed = failures.len(),
            elapsed_ms,
            "バッチ処理が完了しました"
        );

        Ok(BatchReport {
            processed,
            failures,
            skipped,
            total,
            started_at,
            finished_at: Utc::now(),
            elapsed_ms,
        })
    }

    /// Producer: IDごとに1つの作業単位をプールへ投入
    ///
    /// `result_tx` はこの関数の終了時にドロップされる。残りの送信側は
    /// 各作業単位が持つクローンだけになり、全作業の完了でチャンネルが閉じる。
    async fn dispatch(
        &self,
        ids: &[RecordId],
        result_tx: mpsc::Sender<(RecordId, RecordOutcome)>,
    ) -> ProcessingResult<()> {
        for &id in ids {
            let store = Arc::clone(&self.store);
            let claims = self.claims.clone();
            let result_tx = result_tx.clone();

            self.pool
                .submit(async move {
                    let outcome = match claims.try_claim(id) {
                        Some(_claim) => process_record(store.as_ref(), id).await,
                        None => RecordOutcome::Skipped {
                            id,
                            reason: SkipReason::InFlight,
                        },
                    };

                    if result_tx.send((id, outcome)).await.is_err() {
                        tracing::warn!(id, "結果チャンネルが閉じられています");
                    }
                })
                .await?;
        }
        Ok(())
    }

    /// ワーカープールを停止（投入済みの作業は完了させる）
    pub async fn shutdown(self) -> ProcessingResult<()> {
        self.pool.shutdown().await
    }
}
