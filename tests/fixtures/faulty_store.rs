use anyhow::{bail, Result};
use async_trait::async_trait;
use record_batch::{storage::InMemoryRecordStore, Record, RecordId, RecordStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 指定IDで失敗・panicを起こし、呼び出し状況を記録するストア
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: InMemoryRecordStore,
    fail_fetch: HashSet<RecordId>,
    fail_save: HashSet<RecordId>,
    panic_on_fetch: HashSet<RecordId>,
    fail_listing: bool,
    insert_after_listing: Mutex<Option<Record>>,
    delay: Option<Duration>,
    saves: Mutex<HashMap<RecordId, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: InMemoryRecordStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn fail_fetch_for(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.fail_fetch.extend(ids);
        self
    }

    pub fn fail_save_for(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.fail_save.extend(ids);
        self
    }

    pub fn panic_on_fetch_for(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.panic_on_fetch.extend(ids);
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// ID一覧を返した直後に、一覧に含まれないレコードを1件追加する
    pub fn insert_after_listing(self, record: Record) -> Self {
        *self.insert_after_listing.lock().unwrap() = Some(record);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }

    /// ID ごとの save 呼び出し回数
    pub fn save_count(&self, id: RecordId) -> usize {
        self.saves.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub fn total_saves(&self) -> usize {
        self.saves.lock().unwrap().values().sum()
    }

    /// 同時に実行中だった fetch/save の最大数
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        guard
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn find_all_ids(&self) -> Result<Vec<RecordId>> {
        if self.fail_listing {
            bail!("listing unavailable");
        }
        let ids = self.inner.find_all_ids().await?;

        let late = self.insert_after_listing.lock().unwrap().take();
        if let Some(record) = late {
            self.inner.save(record).await?;
        }
        Ok(ids)
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        let _guard = self.enter().await;
        if self.panic_on_fetch.contains(&id) {
            panic!("injected panic for record {id}");
        }
        if self.fail_fetch.contains(&id) {
            bail!("injected fetch failure for record {id}");
        }
        self.inner.find_by_id(id).await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let _guard = self.enter().await;
        let id = record.id.unwrap_or_default();
        *self.saves.lock().unwrap().entry(id).or_default() += 1;

        if self.fail_save.contains(&id) {
            bail!("injected save failure for record {id}");
        }
        self.inner.save(record).await
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<()> {
        self.inner.delete_by_id(id).await
    }
}
