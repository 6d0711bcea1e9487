// Custom error types for asset export
// アセット変換処理のエラー型定義

use super::types::{AssetCategory, TaskId};
use thiserror::Error;

/// アセット変換固有のエラー型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("ディレクトリを走査できません: {path} - {source}")]
    DiscoveryUnavailable {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("アセットが見つかりません: {path} ({category})")]
    NoAssetsFound {
        path: String,
        category: AssetCategory,
    },

    #[error("外部ツールエラー: {tool} - {message}")]
    ExternalToolFailure { tool: String, message: String },

    #[error("変換後のファイルが存在しません: {path}")]
    ConvertedFileMissing { path: String },

    #[error("メタデータファイルの入出力エラー: {path} - {source}")]
    MetadataIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    PlatformUnavailable { message: String },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("未登録のタスクに依存しています: {id}")]
    UnknownDependency { id: TaskId },

    #[error("タスクキューは既に閉じられています")]
    QueueClosed,

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl ExportError {
    /// 走査不能エラーの作成
    pub fn discovery_unavailable(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DiscoveryUnavailable {
            path: path.into(),
            source,
        }
    }

    /// 該当アセットなしエラーの作成
    pub fn no_assets_found(path: impl Into<String>, category: AssetCategory) -> Self {
        Self::NoAssetsFound {
            path: path.into(),
            category,
        }
    }

    /// 外部ツールエラーの作成
    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalToolFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn converted_file_missing(path: impl Into<String>) -> Self {
        Self::ConvertedFileMissing { path: path.into() }
    }

    pub fn metadata_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::MetadataIo {
            path: path.into(),
            source,
        }
    }

    /// 実行環境エラーの作成
    pub fn platform_unavailable(message: impl Into<String>) -> Self {
        Self::PlatformUnavailable {
            message: message.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// 該当アセットなしかどうか
    pub fn is_no_assets_found(&self) -> bool {
        matches!(self, Self::NoAssetsFound { .. })
    }

    /// エラーが回復可能かどうかを判定
    ///
    /// 回復可能なエラーは該当する枝やタスクだけを諦め、処理全体は継続する
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NoAssetsFound { .. } => true,
            Self::ExternalToolFailure { .. } => true,
            Self::ConvertedFileMissing { .. } => true,
            Self::MetadataIo { .. } => true,
            Self::TaskError { .. } => true,
            Self::DiscoveryUnavailable { .. } => false,
            Self::PlatformUnavailable { .. } => false,
            Self::ConfigurationError { .. } => false,
            Self::UnknownDependency { .. } => false,
            Self::QueueClosed => false,
        }
    }
}

impl From<tokio::task::JoinError> for ExportError {
    fn from(error: tokio::task::JoinError) -> Self {
        ExportError::TaskError { source: error }
    }
}

/// アセット変換処理の結果型
pub type ExportResult<T> = std::result::Result<T, ExportError>;
