// Unit - 単一レコード処理機能

use crate::core::{
    FailureStage, RecordFailure, RecordId, RecordOutcome, RecordStatus, RecordStore, SkipReason,
};

/// 単一レコードを PROCESSED に遷移させる
///
/// ストアのエラーはここで捕捉して `RecordOutcome::Failed` にする。
/// 呼び出し元に `Err` やpanicとして漏れることはない。
pub async fn process_record<S>(store: &S, id: RecordId) -> RecordOutcome
where
    S: RecordStore + ?Sized,
{
    // 再取得（ID一覧取得後に削除・更新されている可能性がある）
    let record = match store.find_by_id(id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return RecordOutcome::Skipped {
                id,
                reason: SkipReason::NotFound,
            }
        }
        Err(error) => {
            return RecordOutcome::Failed(RecordFailure::new(
                id,
                FailureStage::Fetch,
                format!("{error:#}"),
            ))
        }
    };

    if record.is_processed() {
        return RecordOutcome::Skipped {
            id,
            reason: SkipReason::AlreadyProcessed,
        };
    }

    let updated = record.with_id(id).with_status(RecordStatus::Processed);
    match store.save(updated).await {
        Ok(saved) => RecordOutcome::Processed(saved),
        Err(error) => RecordOutcome::Failed(RecordFailure::new(
            id,
            FailureStage::Save,
            format!("{error:#}"),
        )),
    }
}
