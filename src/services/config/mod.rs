// 設定管理機能
// バッチ設定とアプリケーション設定ファイル

pub mod app_config;
pub mod implementations;

// 公開API
pub use app_config::AppConfig;
pub use implementations::DefaultBatchConfig;
