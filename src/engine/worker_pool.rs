// WorkerPool - 固定サイズの長寿命ワーカープール
// 単一の作業キューを複数のConsumerワーカーで共有する

use crate::core::{BatchConfig, ProcessingError, ProcessingResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// プールに投入する作業
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// 固定数のワーカーで作業を実行するプール
///
/// 作成時に一度だけサイズが決まり、呼び出しをまたいで再利用される。
/// 同時に実行される作業は常に `worker_count` 以下で、それを超える作業は
/// 作業キューで待たされる（キューが満杯なら `submit` が待機する）。
pub struct WorkerPool {
    job_tx: mpsc::Sender<Job>,
    handles: Vec<JoinHandle<()>>,
    worker_count: usize,
}

impl WorkerPool {
    /// ワーカーを起動してプールを作成
    ///
    /// tokio ランタイム内で呼び出す必要がある。
    pub fn new(worker_count: usize, queue_capacity: usize) -> ProcessingResult<Self> {
        if worker_count == 0 {
            return Err(ProcessingError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }
        if queue_capacity == 0 {
            return Err(ProcessingError::configuration(
                "キューサイズは1以上である必要があります",
            ));
        }

        let (job_tx, job_rx) = mpsc::channel::<Job>(queue_capacity);
        let handles = spawn_workers(job_rx, worker_count);

        tracing::debug!(worker_count, queue_capacity, "ワーカープールを起動しました");

        Ok(Self {
            job_tx,
            handles,
            worker_count,
        })
    }

    /// 設定からプールを作成
    pub fn from_config<C: BatchConfig>(config: &C) -> ProcessingResult<Self> {
        Self::new(config.worker_count(), config.queue_capacity())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 作業を投入する。キューが満杯の間は待機する
    pub async fn submit<F>(&self, job: F) -> ProcessingResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.job_tx
            .send(Box::pin(job))
            .await
            .map_err(|_| ProcessingError::WorkerPoolClosed)
    }

    /// キューを閉じ、投入済みの作業を全て実行し終えてからワーカーを終了する
    pub async fn shutdown(self) -> ProcessingResult<()> {
        drop(self.job_tx);
        for handle in self.handles {
            handle.await?;
        }
        tracing::debug!("ワーカープールを停止しました");
        Ok(())
    }
}

/// 単一Consumerワーカー
fn spawn_worker(worker_id: usize, job_rx: Arc<Mutex<mpsc::Receiver<Job>>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            // 次の作業を取得
            let job = {
                let mut rx = job_rx.lock().await;
                match rx.recv().await {
                    Some(job) => job,
                    None => break, // キュー終了
                }
            };

            // 作業がpanicしてもワーカーは残す
            if let Err(error) = tokio::spawn(job).await {
                tracing::error!(worker_id, %error, "作業が異常終了しました");
            }
        }
    })
}

/// Consumers: ワーカー群を起動
fn spawn_workers(job_rx: mpsc::Receiver<Job>, worker_count: usize) -> Vec<JoinHandle<()>> {
    let job_rx = Arc::new(Mutex::new(job_rx));
    (0..worker_count)
        .map(|worker_id| spawn_worker(worker_id, Arc::clone(&job_rx)))
        .collect()
}
