// 処理中レコードの占有管理
// 重なって実行された process_all 同士が同じレコードを二重に処理しないようにする

use crate::core::RecordId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// 現在いずれかの作業単位が処理中のレコードID集合
#[derive(Debug, Clone, Default)]
pub struct InFlightClaims {
    ids: Arc<Mutex<HashSet<RecordId>>>,
}

impl InFlightClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// IDを占有する。既に他の作業単位が占有していれば `None`
    pub fn try_claim(&self, id: RecordId) -> Option<ClaimGuard> {
        let inserted = self
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);

        inserted.then(|| ClaimGuard {
            id,
            ids: Arc::clone(&self.ids),
        })
    }

    pub fn is_claimed(&self, id: RecordId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}

/// ドロップ時に占有を解放する
#[derive(Debug)]
pub struct ClaimGuard {
    id: RecordId,
    ids: Arc<Mutex<HashSet<RecordId>>>,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
