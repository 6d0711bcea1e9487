// アセット変換処理のトレイト定義
// 全ての抽象化インターフェースを定義

use super::error::ExportResult;
use super::types::{TaskOutcome, TaskSpec, ToolOutput};
use async_trait::async_trait;
use mockall::automock;
use std::path::{Path, PathBuf};

/// 変換処理の設定を抽象化するトレイト
#[automock]
pub trait ExportConfig: Send + Sync {
    /// 最大同時実行タスク数（ワーカー数）を取得
    fn max_concurrent_tasks(&self) -> usize;

    /// 作業チャンネルのバッファサイズを取得
    fn channel_buffer_size(&self) -> usize;

    /// 画像変換ツールのパス
    fn converter_path(&self) -> PathBuf;

    /// 変換先フォーマット名。出力ファイルの拡張子としても使う
    fn target_format(&self) -> String;

    /// 変換品質 (0-100)
    fn quality(&self) -> u8;

    /// メタデータファイル名（拡張子なし）
    fn metadata_file_name(&self) -> String;

    /// メタデータファイルの拡張子
    fn metadata_extension(&self) -> String;

    /// 外部の置換ツール。未設定ならプロセス内で置換する
    fn substitution_tool(&self) -> Option<PathBuf>;
}

// ExportConfig for Box<dyn ExportConfig>
impl ExportConfig for Box<dyn ExportConfig> {
    fn max_concurrent_tasks(&self) -> usize {
        self.as_ref().max_concurrent_tasks()
    }

    fn channel_buffer_size(&self) -> usize {
        self.as_ref().channel_buffer_size()
    }

    fn converter_path(&self) -> PathBuf {
        self.as_ref().converter_path()
    }

    fn target_format(&self) -> String {
        self.as_ref().target_format()
    }

    fn quality(&self) -> u8 {
        self.as_ref().quality()
    }

    fn metadata_file_name(&self) -> String {
        self.as_ref().metadata_file_name()
    }

    fn metadata_extension(&self) -> String {
        self.as_ref().metadata_extension()
    }

    fn substitution_tool(&self) -> Option<PathBuf> {
        self.as_ref().substitution_tool()
    }
}

/// 進捗報告の抽象化トレイト
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// イメージセットの処理開始
    async fn report_image_set_started(&self, image_set: &Path, images: usize);

    /// タスク失敗の報告
    async fn report_task_failed(&self, image_path: &Path, error: &str);

    /// イメージセットの処理完了
    async fn report_image_set_completed(&self, image_set: &Path, succeeded: usize, failed: usize);
}

/// 外部プロセス起動の抽象化トレイト
#[automock]
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// プログラムを実行し、終了まで待って標準出力を返す
    ///
    /// 起動失敗と異常終了はどちらもエラーとして扱う
    async fn run(&self, program: &Path, args: &[String]) -> ExportResult<ToolOutput>;
}

/// タスク本体の実行を抽象化するトレイト
#[automock]
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, spec: &TaskSpec) -> TaskOutcome;
}
