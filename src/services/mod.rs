// サービス層 - 機能別のビジネスロジック
// 設定・進捗報告・タスク本体の実行をそれぞれ担当する

pub mod config;
pub mod monitoring;
pub mod processing;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::{DefaultExportConfig, CONVERTER_ENV};
pub use monitoring::{LogProgressReporter, NoOpProgressReporter};
pub use processing::ExportTaskExecutor;
