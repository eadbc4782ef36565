use crate::core::{Record, RecordId, RecordStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// ジャーナルの1行
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum JournalEntry {
    Save { record: Record },
    Delete { id: RecordId },
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<RecordId, Record>,
    last_id: RecordId,
    journal: Option<File>,
}

/// JSONファイルに永続化するレコードストア
///
/// 本体はレコード配列のJSONスナップショット。変更は `<path>.journal` に
/// 1行1件（JSON Lines）で追記し、ファイル全体は書き直さない。
/// ジャーナルは `open` と `compact` でスナップショットへ畳み込まれる。
/// スナップショットは一時ファイル経由で置き換えるため、途中で落ちても壊れない。
#[derive(Debug, Clone)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    journal_path: PathBuf,
    state: Arc<Mutex<StoreState>>,
}

impl JsonFileRecordStore {
    /// ファイルを開く（存在しなければ空のストア）
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let journal_path = sibling(&path, ".journal");

        let mut records = BTreeMap::new();
        let mut unassigned = Vec::new();
        for record in Self::load_snapshot(&path).await? {
            match record.id {
                Some(id) => {
                    records.insert(id, record);
                }
                None => unassigned.push(record),
            }
        }

        let replayed = Self::replay_journal(&journal_path, &mut records).await?;

        let mut state = StoreState {
            last_id: records.keys().next_back().copied().unwrap_or(0),
            records,
            journal: None,
        };
        for record in unassigned {
            state.last_id += 1;
            let id = state.last_id;
            state.records.insert(id, record.with_id(id));
        }

        tracing::debug!(
            path = %path.display(),
            records = state.records.len(),
            replayed,
            "レコードストアを読み込みました"
        );

        let store = Self {
            path,
            journal_path,
            state: Arc::new(Mutex::new(state)),
        };
        if replayed > 0 {
            store.compact().await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// ジャーナルをスナップショットへ畳み込み、ジャーナルを削除する
    pub async fn compact(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        self.write_snapshot(&state.records).await?;

        state.journal = None;
        if tokio::fs::try_exists(&self.journal_path).await? {
            tokio::fs::remove_file(&self.journal_path)
                .await
                .with_context(|| format!("Failed to remove: {}", self.journal_path.display()))?;
        }
        tracing::debug!(path = %self.path.display(), "ジャーナルを畳み込みました");
        Ok(())
    }

    async fn load_snapshot(path: &Path) -> Result<Vec<Record>> {
        if !tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to access: {}", path.display()))?
        {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read record file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse record file: {}", path.display()))
    }

    /// ジャーナルを適用し、適用した件数を返す
    ///
    /// 書き込み途中で落ちた最終行は読み飛ばす。それ以外の不正な行はエラー。
    async fn replay_journal(
        path: &Path,
        records: &mut BTreeMap<RecordId, Record>,
    ) -> Result<usize> {
        if !tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to access: {}", path.display()))?
        {
            return Ok(0);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read journal: {}", path.display()))?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();

        let mut applied = 0;
        for (index, line) in lines.iter().enumerate() {
            let entry = match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entry,
                Err(error) if index + 1 == lines.len() => {
                    tracing::warn!(%error, path = %path.display(), "ジャーナル末尾の不完全な行を無視します");
                    break;
                }
                Err(error) => {
                    return Err(error).with_context(|| {
                        format!("Failed to parse journal {} line {}", path.display(), index + 1)
                    })
                }
            };

            match entry {
                JournalEntry::Save { record } => {
                    if let Some(id) = record.id {
                        records.insert(id, record);
                    }
                }
                JournalEntry::Delete { id } => {
                    records.remove(&id);
                }
            }
            applied += 1;
        }
        Ok(applied)
    }

    async fn write_snapshot(&self, records: &BTreeMap<RecordId, Record>) -> Result<()> {
        self.ensure_parent_dir().await?;

        let values: Vec<&Record> = records.values().collect();
        let json = serde_json::to_vec_pretty(&values)?;

        let tmp_path = sibling(&self.path, ".tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write: {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace: {}", self.path.display()))?;
        Ok(())
    }

    /// ジャーナルへ1件追記
    async fn append(&self, state: &mut StoreState, entry: &JournalEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        if state.journal.is_none() {
            self.ensure_parent_dir().await?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.journal_path)
                .await
                .with_context(|| format!("Failed to open journal: {}", self.journal_path.display()))?;
            state.journal = Some(file);
        }

        if let Some(journal) = state.journal.as_mut() {
            let written = async {
                journal.write_all(&line).await?;
                journal.flush().await
            }
            .await;
            if let Err(error) = written {
                // 次回の追記でファイルを開き直す
                state.journal = None;
                return Err(error).with_context(|| {
                    format!("Failed to append journal: {}", self.journal_path.display())
                });
            }
        }
        Ok(())
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn find_all_ids(&self) -> Result<Vec<RecordId>> {
        Ok(self.state.lock().await.records.keys().copied().collect())
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        Ok(self.state.lock().await.records.values().cloned().collect())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.state.lock().await.records.get(&id).cloned())
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        let mut state = self.state.lock().await;

        let previous_last_id = state.last_id;
        let id = match record.id {
            Some(id) => {
                state.last_id = state.last_id.max(id);
                id
            }
            None => {
                state.last_id += 1;
                state.last_id
            }
        };
        record.id = Some(id);

        let entry = JournalEntry::Save {
            record: record.clone(),
        };
        if let Err(error) = self.append(&mut state, &entry).await {
            state.last_id = previous_last_id;
            return Err(error);
        }

        state.records.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<()> {
        let mut state = self.state.lock().await;

        if !state.records.contains_key(&id) {
            return Ok(());
        }
        self.append(&mut state, &JournalEntry::Delete { id }).await?;
        state.records.remove(&id);
        Ok(())
    }
}
