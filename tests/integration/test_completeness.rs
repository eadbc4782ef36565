// 全件処理の完全性と冪等性の統合テスト
use crate::fixtures::{named, pending_record, seeded_store, FaultyStore};
use anyhow::Result;
use record_batch::{
    services::NoOpProgressReporter, storage::InMemoryRecordStore, BatchProcessor,
    DefaultBatchConfig, RecordStatus, RecordStore,
};

fn config(workers: usize) -> DefaultBatchConfig {
    DefaultBatchConfig::new(workers).with_queue_capacity(8)
}

#[tokio::test]
async fn test_mixed_statuses_only_pending_are_processed() -> Result<()> {
    let store = InMemoryRecordStore::with_records(vec![
        named("A", RecordStatus::Pending),
        named("B", RecordStatus::Processed),
        named("C", RecordStatus::Pending),
    ]);
    let processor = BatchProcessor::new(store.clone(), &config(2), NoOpProgressReporter::new())?;

    let report = processor.process_all().await?;

    let names: Vec<_> = report.processed.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert!(report.failures.is_empty());
    assert_eq!(report.skipped, 1);

    let stored = store.snapshot().await;
    assert!(stored.iter().all(|r| r.status == RecordStatus::Processed));
    Ok(())
}

#[tokio::test]
async fn test_every_record_is_saved_exactly_once() -> Result<()> {
    let store = FaultyStore::new(seeded_store(200));
    let processor = BatchProcessor::new(store, &config(8), NoOpProgressReporter::new())?;

    let report = processor.process_all().await?;

    assert_eq!(report.total, 200);
    assert_eq!(report.processed_count(), 200);
    assert!(report.is_clean());

    let ids: Vec<_> = report.processed.iter().filter_map(|r| r.id).collect();
    assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    for id in 1..=200 {
        assert_eq!(processor.store().save_count(id), 1, "record {id}");
    }
    Ok(())
}

#[tokio::test]
async fn test_batch_larger_than_pool_completes() -> Result<()> {
    let store = FaultyStore::new(seeded_store(1000))
        .with_delay(std::time::Duration::from_micros(200));
    let processor = BatchProcessor::new(store, &config(3), NoOpProgressReporter::new())?;

    let report = processor.process_all().await?;

    assert_eq!(report.processed_count(), 1000);
    assert!(report.failures.is_empty());
    assert!(processor.store().peak_in_flight() <= 3);
    assert!(processor
        .store()
        .inner()
        .snapshot()
        .await
        .iter()
        .all(|r| r.is_processed()));
    Ok(())
}

#[tokio::test]
async fn test_second_run_finds_nothing_to_do() -> Result<()> {
    let store = FaultyStore::new(seeded_store(50));
    let processor = BatchProcessor::new(store, &config(4), NoOpProgressReporter::new())?;

    let first = processor.process_all().await?;
    let second = processor.process_all().await?;

    assert_eq!(first.processed_count(), 50);
    assert_eq!(second.processed_count(), 0);
    assert_eq!(second.skipped, 50);
    assert!(second.failures.is_empty());
    assert_eq!(processor.store().total_saves(), 50);
    Ok(())
}

#[tokio::test]
async fn test_empty_store() -> Result<()> {
    let processor = BatchProcessor::new(
        InMemoryRecordStore::new(),
        &config(2),
        NoOpProgressReporter::new(),
    )?;

    let report = processor.process_all().await?;

    assert_eq!(report.total, 0);
    assert!(report.is_clean());
    assert!(report.processed.is_empty());
    assert!(processor.store().find_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_records_created_after_listing_are_not_in_the_batch() -> Result<()> {
    let store = FaultyStore::new(seeded_store(5)).insert_after_listing(pending_record(6));
    let processor = BatchProcessor::new(store, &config(2), NoOpProgressReporter::new())?;

    let report = processor.process_all().await?;

    assert_eq!(report.total, 5);
    assert_eq!(report.processed_count(), 5);
    assert!(report.processed.iter().all(|r| r.id != Some(6)));

    let late = processor.store().inner().find_by_id(6).await?.unwrap();
    assert_eq!(late.status, RecordStatus::Pending);
    assert_eq!(processor.store().save_count(6), 0);

    // 次の呼び出しで処理される
    let next = processor.process_all().await?;
    assert_eq!(next.processed.iter().filter_map(|r| r.id).collect::<Vec<_>>(), vec![6]);
    Ok(())
}
