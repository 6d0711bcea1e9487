// エンジン層 - 並列処理とオーケストレーション
// サービス層を組み合わせて高レベルな処理を提供

pub mod api;
mod consumer; // TaskQueue内部でのみ使用
pub mod exporter;
pub mod queue;

// 公開API - 主要エンジンクラス
pub use api::{
    create_default_exporter, create_quiet_exporter, export_with_exporter, DefaultAssetExporter,
};
pub use exporter::AssetExporter;
pub use queue::TaskQueue;
