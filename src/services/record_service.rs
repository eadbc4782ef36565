// RecordService - 呼び出し層から使うレコード操作の窓口
// CRUDはストアへ、一括処理は BatchProcessor へ委譲する

use super::validation::{validate_record, validate_status_transition};
use crate::core::{
    BatchConfig, BatchReport, ProcessingError, ProcessingResult, ProgressReporter, Record,
    RecordId, RecordStatus, RecordStore,
};
use crate::engine::claims::ClaimGuard;
use crate::engine::BatchProcessor;

pub struct RecordService<S, R> {
    processor: BatchProcessor<S, R>,
}

impl<S, R> RecordService<S, R>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
{
    pub fn new<C: BatchConfig>(store: S, config: &C, reporter: R) -> ProcessingResult<Self> {
        Ok(Self {
            processor: BatchProcessor::new(store, config, reporter)?,
        })
    }

    pub fn from_processor(processor: BatchProcessor<S, R>) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &BatchProcessor<S, R> {
        &self.processor
    }

    fn store(&self) -> &S {
        self.processor.store()
    }

    /// 一括処理の作業単位と同じ占有を取る。処理中なら `RecordInUse`
    fn claim(&self, id: RecordId) -> ProcessingResult<ClaimGuard> {
        self.processor
            .claims()
            .try_claim(id)
            .ok_or(ProcessingError::RecordInUse { id })
    }

    pub async fn find_all(&self) -> ProcessingResult<Vec<Record>> {
        self.store()
            .find_all()
            .await
            .map_err(|e| ProcessingError::store("find_all", e))
    }

    pub async fn find_by_id(&self, id: RecordId) -> ProcessingResult<Option<Record>> {
        self.store()
            .find_by_id(id)
            .await
            .map_err(|e| ProcessingError::store("find_by_id", e))
    }

    /// 新規作成（クライアント指定のIDとステータスは無視する）
    pub async fn create(&self, mut record: Record) -> ProcessingResult<Record> {
        validate_record(&record)?;
        record.id = None;
        record.status = RecordStatus::Pending;

        let saved = self
            .store()
            .save(record)
            .await
            .map_err(|e| ProcessingError::store("create", e))?;
        tracing::info!(id = saved.id, "レコードを作成しました");
        Ok(saved)
    }

    /// 更新。対象が存在しなければ `None`
    ///
    /// 検証から保存までIDを占有し、その間に一括処理が割り込まないようにする。
    pub async fn update(&self, id: RecordId, record: Record) -> ProcessingResult<Option<Record>> {
        let _claim = self.claim(id)?;
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        validate_record(&record)?;
        validate_status_transition(current.status, record.status)?;

        let saved = self
            .store()
            .save(record.with_id(id))
            .await
            .map_err(|e| ProcessingError::store("update", e))?;
        tracing::info!(id, "レコードを更新しました");
        Ok(Some(saved))
    }

    /// 削除。対象が存在しなければ `false`
    pub async fn delete(&self, id: RecordId) -> ProcessingResult<bool> {
        let _claim = self.claim(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        self.store()
            .delete_by_id(id)
            .await
            .map_err(|e| ProcessingError::store("delete", e))?;
        tracing::info!(id, "レコードを削除しました");
        Ok(true)
    }

    /// 全 PENDING レコードを一括処理
    pub async fn process_all(&self) -> ProcessingResult<BatchReport> {
        self.processor.process_all().await
    }

    pub async fn shutdown(self) -> ProcessingResult<()> {
        self.processor.shutdown().await
    }
}
