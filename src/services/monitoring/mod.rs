// 進捗監視機能
// バッチの開始・進捗・失敗・完了をログへ報告

pub mod implementations;

// 公開API
pub use implementations::{NoOpProgressReporter, TracingProgressReporter};
