// バッチ設定の具象実装

use crate::core::{BatchConfig, ProcessingError, ProcessingResult};
use serde::{Deserialize, Serialize};

/// 作業キューのデフォルトサイズ
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// デフォルトのワーカー数（CPU数x2）
pub fn default_worker_count() -> usize {
    num_cpus::get().max(1) * 2
}

/// デフォルト設定実装
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultBatchConfig {
    worker_count: usize,
    queue_capacity: usize,
}

impl DefaultBatchConfig {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// 設定値の検証
    pub fn validate(&self) -> ProcessingResult<()> {
        if self.worker_count == 0 {
            return Err(ProcessingError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ProcessingError::configuration(
                "キューサイズは1以上である必要があります",
            ));
        }
        Ok(())
    }
}

impl Default for DefaultBatchConfig {
    fn default() -> Self {
        Self::new(default_worker_count())
    }
}

impl BatchConfig for DefaultBatchConfig {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}
