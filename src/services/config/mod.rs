// 設定管理機能
// 並列数、外部ツールのパス、変換フォーマットなど

pub mod implementations;

// 公開API
pub use implementations::{DefaultExportConfig, CONVERTER_ENV};
