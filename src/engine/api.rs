// 高レベル公開API
// AssetExporterを簡単に使用できるようにするための便利な関数

use super::AssetExporter;
use crate::{
    core::{error::ExportResult, ExportConfig, ExportSummary, ProgressReporter, TaskExecutor},
    services::{DefaultExportConfig, ExportTaskExecutor, LogProgressReporter, NoOpProgressReporter},
    tools::ProcessToolRunner,
};
use std::path::Path;

/// 外部プロセスで変換・置換を行う標準構成のエクスポーター
pub type DefaultAssetExporter<R> = AssetExporter<
    ExportTaskExecutor<ProcessToolRunner, DefaultExportConfig>,
    DefaultExportConfig,
    R,
>;

/// 設定済みAssetExporterでプロジェクトを処理
pub async fn export_with_exporter<X, C, R>(
    project_root: &Path,
    exporter: &AssetExporter<X, C, R>,
) -> ExportResult<ExportSummary>
where
    X: TaskExecutor + 'static,
    C: ExportConfig,
    R: ProgressReporter,
{
    exporter.export(project_root).await
}

/// AssetExporter作成のヘルパー関数
///
/// 進捗は tracing のイベントとして出力される
pub fn create_default_exporter(
    config: DefaultExportConfig,
) -> DefaultAssetExporter<LogProgressReporter> {
    AssetExporter::new(
        ExportTaskExecutor::new(ProcessToolRunner::new(), config.clone()),
        config,
        LogProgressReporter::new(),
    )
}

/// AssetExporter作成のヘルパー関数（静音版）
pub fn create_quiet_exporter(
    config: DefaultExportConfig,
) -> DefaultAssetExporter<NoOpProgressReporter> {
    AssetExporter::new(
        ExportTaskExecutor::new(ProcessToolRunner::new(), config.clone()),
        config,
        NoOpProgressReporter::new(),
    )
}
