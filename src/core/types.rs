// アセット変換処理に関連するデータ型定義

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 走査対象となるアセットの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    /// アセットカタログ (`*.xcassets` ディレクトリ)
    Catalog,
    /// イメージセット (`*.imageset` ディレクトリ)
    ImageSet,
    /// 旧形式の起動画像 (`*.launchimage` ディレクトリ)
    LaunchImage,
    /// 内容から画像と判定される通常ファイル
    ImageFile,
}

impl AssetCategory {
    /// コンテナ種別のディレクトリ拡張子。画像ファイルには拡張子の条件がない
    pub const fn directory_extension(&self) -> Option<&'static str> {
        match self {
            Self::Catalog => Some("xcassets"),
            Self::ImageSet => Some("imageset"),
            Self::LaunchImage => Some("launchimage"),
            Self::ImageFile => None,
        }
    }

    pub const fn is_container(&self) -> bool {
        self.directory_extension().is_some()
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.directory_extension() {
            Some(extension) => f.write_str(extension),
            None => f.write_str("images"),
        }
    }
}

/// 走査で発見されたパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPath {
    pub path: PathBuf,
    pub category: AssetCategory,
}

/// キューが払い出すタスク識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// タスクの種類と対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// 画像を変換して同じディレクトリに新しい拡張子で書き出す
    Convert { image_path: PathBuf },
    /// イメージセットのメタデータ内のファイル名を書き換える
    Patch {
        asset_set_path: PathBuf,
        image_path: PathBuf,
    },
}

impl TaskKind {
    pub fn image_path(&self) -> &Path {
        match self {
            Self::Convert { image_path } | Self::Patch { image_path, .. } => image_path,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Convert { .. } => "convert",
            Self::Patch { .. } => "patch",
        }
    }
}

/// キューに投入するタスク記述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub kind: TaskKind,
    /// 完了（成否は問わない）を待つ先行タスク
    pub depends_on: Option<TaskId>,
}

impl TaskSpec {
    pub fn convert(image_path: impl Into<PathBuf>) -> Self {
        Self {
            kind: TaskKind::Convert {
                image_path: image_path.into(),
            },
            depends_on: None,
        }
    }

    /// 変換タスクの完了を待つ書き換えタスクを作成
    pub fn patch(
        asset_set_path: impl Into<PathBuf>,
        image_path: impl Into<PathBuf>,
        conversion: TaskId,
    ) -> Self {
        Self {
            kind: TaskKind::Patch {
                asset_set_path: asset_set_path.into(),
                image_path: image_path.into(),
            },
            depends_on: Some(conversion),
        }
    }
}

/// タスクの状態遷移: Pending -> Running -> Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
}

/// 成功したタスクの出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
    Converted {
        stdout: Vec<u8>,
        destination: PathBuf,
    },
    Patched {
        metadata_path: PathBuf,
        replacements: usize,
    },
}

/// 個別タスクの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded(TaskOutput),
    Failed { error: String },
    /// 開始前にキャンセルされ、本体は実行されなかった
    Cancelled,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// 完了したタスクの報告。投入したタスクごとに必ず1件だけ生成される
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub id: TaskId,
    pub spec: TaskSpec,
    pub outcome: TaskOutcome,
    pub started_at: Instant,
    pub finished_at: Instant,
}

/// 外部ツールの実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    /// 標準エラー出力（不正なUTF-8は置換済み）
    pub stderr: String,
}

/// 実行全体のサマリー
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub catalogs_scanned: usize,
    pub catalogs_skipped: usize,
    pub image_sets_scanned: usize,
    pub image_sets_skipped: usize,
    pub images_found: usize,
    pub conversions_succeeded: usize,
    pub patches_succeeded: usize,
    pub failures: usize,
}

impl ExportSummary {
    /// ドレイン済みの報告を集計に反映
    pub fn record(&mut self, report: &TaskReport) {
        match (&report.spec.kind, report.outcome.is_success()) {
            (TaskKind::Convert { .. }, true) => self.conversions_succeeded += 1,
            (TaskKind::Patch { .. }, true) => self.patches_succeeded += 1,
            (_, false) => self.failures += 1,
        }
    }

    /// 変換と書き換えの両方が成功したリソース数
    pub fn converted_resources(&self) -> usize {
        self.patches_succeeded
    }
}
