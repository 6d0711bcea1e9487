// タスク実行機能
// 変換タスクと書き換えタスクの本体

pub mod worker;

// 公開API
pub use worker::ExportTaskExecutor;
