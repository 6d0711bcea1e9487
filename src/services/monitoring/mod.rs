// 進捗監視機能
// イメージセット単位の進捗、タスク失敗の通知

pub mod implementations;

// 公開API
pub use implementations::{LogProgressReporter, NoOpProgressReporter};
