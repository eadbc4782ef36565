// レコード管理と全件一括処理のライブラリ
//
// - core: ドメイン型・トレイト・エラー
// - storage: RecordStore の実装（メモリ / JSONファイル）
// - engine: ワーカープールと一括処理エンジン
// - services: 設定・進捗報告・検証・RecordService
// - cli: コマンドライン層

pub mod cli;
pub mod core;
pub mod engine;
pub mod services;
pub mod storage;

pub use crate::core::{
    BatchConfig, BatchReport, ProcessingError, ProcessingResult, ProgressReporter, Record,
    RecordFailure, RecordId, RecordOutcome, RecordStatus, RecordStore,
};
pub use engine::{BatchProcessor, WorkerPool};
pub use services::{AppConfig, DefaultBatchConfig, RecordService};
