pub mod cli;
pub mod core;
pub mod engine;
pub mod file_scanner;
pub mod services;
pub mod tools;

// 公開API - よく使う型をクレート直下から参照できるようにする
pub use crate::core::{
    AssetCategory, ExportConfig, ExportError, ExportResult, ExportSummary, TaskExecutor, TaskId,
    TaskOutcome, TaskReport, TaskSpec, TaskState, ToolRunner,
};
pub use engine::{create_default_exporter, create_quiet_exporter, AssetExporter, TaskQueue};
pub use file_scanner::FileScanner;
pub use services::{DefaultExportConfig, ExportTaskExecutor};
pub use tools::ProcessToolRunner;
