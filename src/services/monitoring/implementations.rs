// 進捗監視の具象実装

use crate::core::ProgressReporter;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

/// tracing のイベントとして進捗を出力する実装
///
/// 標準出力には何も書かない。表示するかどうかはサブスクライバーの
/// フィルタ次第。
#[derive(Debug, Default, Clone)]
pub struct LogProgressReporter;

impl LogProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for LogProgressReporter {
    async fn report_image_set_started(&self, image_set: &Path, images: usize) {
        debug!(image_set = %image_set.display(), images, "イメージセットの処理を開始");
    }

    async fn report_task_failed(&self, image_path: &Path, error: &str) {
        warn!(image = %image_path.display(), error, "タスクが失敗しました");
    }

    async fn report_image_set_completed(&self, image_set: &Path, succeeded: usize, failed: usize) {
        info!(
            image_set = %image_set.display(),
            succeeded,
            failed,
            "イメージセットの処理が完了"
        );
    }
}

/// 何もしない進捗報告実装（テスト用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_image_set_started(&self, _image_set: &Path, _images: usize) {
        // 何もしない
    }

    async fn report_task_failed(&self, _image_path: &Path, _error: &str) {
        // 何もしない
    }

    async fn report_image_set_completed(
        &self,
        _image_set: &Path,
        _succeeded: usize,
        _failed: usize,
    ) {
        // 何もしない
    }
}
