// 部分失敗の統合テスト
use crate::fixtures::{seeded_store, FaultyStore};
use anyhow::Result;
use record_batch::{
    core::FailureStage, services::NoOpProgressReporter, BatchProcessor, DefaultBatchConfig,
    ProcessingError, RecordStatus, RecordStore,
};

fn config() -> DefaultBatchConfig {
    DefaultBatchConfig::new(4).with_queue_capacity(8)
}

#[tokio::test]
async fn test_failed_records_are_listed_and_siblings_complete() -> Result<()> {
    let store = FaultyStore::new(seeded_store(30))
        .fail_save_for([7, 21])
        .fail_fetch_for([12]);
    let processor = BatchProcessor::new(store, &config(), NoOpProgressReporter::new())?;

    let report = processor.process_all().await?;

    assert_eq!(report.failed_ids(), vec![7, 12, 21]);
    assert_eq!(report.processed_count(), 27);
    assert_eq!(report.failures[0].stage, FailureStage::Save);
    assert_eq!(report.failures[1].stage, FailureStage::Fetch);
    assert!(report.failures[2].cause.contains("injected save failure"));

    // 失敗したレコードは PENDING のまま
    let store = processor.store().inner();
    assert_eq!(store.find_by_id(7).await?.unwrap().status, RecordStatus::Pending);
    assert_eq!(store.find_by_id(8).await?.unwrap().status, RecordStatus::Processed);
    Ok(())
}

#[tokio::test]
async fn test_strict_mode_names_every_failure() -> Result<()> {
    let store = FaultyStore::new(seeded_store(5)).fail_save_for([2, 4]);
    let processor = BatchProcessor::new(store, &config(), NoOpProgressReporter::new())?;

    let error = processor.process_all().await?.into_strict().unwrap_err();

    assert!(matches!(error, ProcessingError::PartialFailureError { .. }));
    assert_eq!(error.failed_ids(), vec![2, 4]);
    let message = error.to_string();
    assert!(message.contains("#2"));
    assert!(message.contains("#4"));
    Ok(())
}

#[tokio::test]
async fn test_failed_records_are_retried_on_next_call() -> Result<()> {
    let store = FaultyStore::new(seeded_store(3)).fail_fetch_for([2]);
    let processor = BatchProcessor::new(store, &config(), NoOpProgressReporter::new())?;

    let first = processor.process_all().await?;
    let second = processor.process_all().await?;

    assert_eq!(first.failed_ids(), vec![2]);
    assert_eq!(second.failed_ids(), vec![2]);
    assert_eq!(second.skipped, 2);
    Ok(())
}

#[tokio::test]
async fn test_panicking_unit_becomes_worker_failure() -> Result<()> {
    let store = FaultyStore::new(seeded_store(6)).panic_on_fetch_for([3]);
    let processor = BatchProcessor::new(store, &config(), NoOpProgressReporter::new())?;

    let report = processor.process_all().await?;

    assert_eq!(report.failed_ids(), vec![3]);
    assert_eq!(report.failures[0].stage, FailureStage::Worker);
    assert_eq!(report.processed_count(), 5);

    // ワーカーは生き残り、次の呼び出しも処理できる
    let again = processor.process_all().await?;
    assert_eq!(again.failed_ids(), vec![3]);
    Ok(())
}

#[tokio::test]
async fn test_listing_failure_fails_the_whole_call() -> Result<()> {
    let store = FaultyStore::new(seeded_store(3)).fail_listing();
    let processor = BatchProcessor::new(store, &config(), NoOpProgressReporter::new())?;

    let error = processor.process_all().await.unwrap_err();

    assert!(matches!(error, ProcessingError::IdListingError { .. }));
    assert_eq!(processor.store().total_saves(), 0);
    Ok(())
}
