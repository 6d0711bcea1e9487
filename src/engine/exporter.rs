// AssetExporter - 依存性注入によるアセット変換エンジン
// カタログ -> イメージセット -> 画像 の順に走査し、画像ごとに変換と書き換えを投入する

use super::queue::TaskQueue;
use crate::{
    core::{
        AssetCategory, DiscoveredPath, ExportConfig, ExportResult, ExportSummary,
        ProgressReporter, TaskExecutor, TaskOutcome, TaskSpec,
    },
    file_scanner::FileScanner,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// アセット変換エンジン
///
/// 全ての依存関係をコンストラクタで受け取る。集計は `export` の呼び出し内で
/// ドレインした報告からのみ行う。
pub struct AssetExporter<X, C, R> {
    executor: Arc<X>,
    config: Arc<C>,
    reporter: Arc<R>,
}

impl<X, C, R> AssetExporter<X, C, R>
where
    X: TaskExecutor + 'static,
    C: ExportConfig,
    R: ProgressReporter,
{
    pub fn new(executor: X, config: C, reporter: R) -> Self {
        Self {
            executor: Arc::new(executor),
            config: Arc::new(config),
            reporter: Arc::new(reporter),
        }
    }

    /// プロジェクト配下の全アセットを変換する
    ///
    /// カタログが1つも見つからない場合は `NoAssetsFound` を返す。
    /// それより下の階層で何も見つからない枝は読み飛ばす。
    pub async fn export(&self, project_root: &Path) -> ExportResult<ExportSummary> {
        let catalogs = FileScanner::locate(AssetCategory::Catalog, project_root)?;
        let mut queue = TaskQueue::new(Arc::clone(&self.executor), self.config.as_ref())?;
        let mut summary = ExportSummary::default();

        for catalog in &catalogs {
            let Some(image_sets) = Self::locate_or_skip(AssetCategory::ImageSet, catalog)? else {
                summary.catalogs_skipped += 1;
                continue;
            };
            summary.catalogs_scanned += 1;

            for image_set in &image_sets {
                self.export_image_set(&mut queue, &image_set.path, &mut summary)
                    .await?;
            }
        }

        queue.shutdown().await?;
        info!(
            catalogs = summary.catalogs_scanned,
            image_sets = summary.image_sets_scanned,
            images = summary.images_found,
            converted = summary.converted_resources(),
            failures = summary.failures,
            "変換処理が完了しました"
        );
        Ok(summary)
    }

    /// 1つのイメージセットの全画像を投入し、ドレインして集計に反映する
    async fn export_image_set(
        &self,
        queue: &mut TaskQueue,
        image_set: &Path,
        summary: &mut ExportSummary,
    ) -> ExportResult<()> {
        let Some(images) = Self::locate_or_skip(AssetCategory::ImageFile, image_set)? else {
            summary.image_sets_skipped += 1;
            return Ok(());
        };
        summary.image_sets_scanned += 1;
        summary.images_found += images.len();

        self.reporter
            .report_image_set_started(image_set, images.len())
            .await;

        for image in &images {
            let conversion = queue.submit(TaskSpec::convert(&image.path)).await?;
            queue
                .submit(TaskSpec::patch(image_set, &image.path, conversion))
                .await?;
        }

        let mut succeeded = 0;
        let mut failed = 0;
        for report in queue.drain().await {
            summary.record(&report);
            match &report.outcome {
                TaskOutcome::Succeeded(_) => succeeded += 1,
                TaskOutcome::Failed { error } => {
                    failed += 1;
                    self.reporter
                        .report_task_failed(report.spec.kind.image_path(), error)
                        .await;
                }
                TaskOutcome::Cancelled => failed += 1,
            }
        }

        self.reporter
            .report_image_set_completed(image_set, succeeded, failed)
            .await;
        Ok(())
    }

    /// 回復可能なエラー (該当なし) なら `None`。それ以外のエラーはそのまま返す
    fn locate_or_skip(
        category: AssetCategory,
        root: &Path,
    ) -> ExportResult<Option<Vec<DiscoveredPath>>> {
        match FileScanner::locate_discovered(category, root) {
            Ok(paths) => Ok(Some(paths)),
            Err(e) if e.is_recoverable() => {
                debug!(root = %root.display(), %category, "該当するアセットがないため読み飛ばします");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// 設定への参照を取得（読み取り専用アクセス）
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}
