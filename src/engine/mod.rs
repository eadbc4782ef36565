// エンジン層 - 並列処理とオーケストレーション
// ワーカープール上で作業単位を実行し、呼び出し単位で結果を集約する

pub mod batch_processor;
pub mod claims;
pub mod collector;
pub mod unit;
pub mod worker_pool;

// 公開API - 主要エンジンクラス
pub use batch_processor::BatchProcessor;
pub use unit::process_record;
pub use worker_pool::WorkerPool;
