use crate::core::{Record, RecordId, RecordStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// メモリ内のレコードストア
///
/// クローンは同じ内部状態を共有する。
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<BTreeMap<RecordId, Record>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のレコード群から作成（id なしのレコードは採番される）
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut map = BTreeMap::new();
        let mut max_id = 0;
        let mut unassigned = Vec::new();

        for record in records {
            match record.id {
                Some(id) => {
                    max_id = max_id.max(id);
                    map.insert(id, record);
                }
                None => unassigned.push(record),
            }
        }

        for record in unassigned {
            max_id += 1;
            map.insert(max_id, record.with_id(max_id));
        }

        Self {
            records: Arc::new(RwLock::new(map)),
            next_id: Arc::new(AtomicU64::new(max_id)),
        }
    }

    /// 保存件数を取得
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// 現在の全レコードのスナップショット
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.read().await.values().cloned().collect()
    }

    fn assign_id(&self) -> RecordId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_all_ids(&self) -> Result<Vec<RecordId>> {
        Ok(self.records.read().await.keys().copied().collect())
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        Ok(self.snapshot().await)
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        let id = match record.id {
            Some(id) => {
                // 明示IDで保存された場合も採番が追い越さないようにする
                self.next_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.assign_id(),
        };
        record.id = Some(id);

        self.records.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }
}
