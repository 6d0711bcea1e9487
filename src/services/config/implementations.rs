// 設定管理の具象実装

use crate::core::{ExportConfig, ExportError, ExportResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 環境変数で変換ツールを差し替える
pub const CONVERTER_ENV: &str = "HEIC_EXPORT_CONVERTER";

const DEFAULT_CONVERTER: &str = "/usr/bin/sips";

/// デフォルト設定実装
///
/// TOMLファイルから読み込む場合、省略した項目はデフォルト値になる
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultExportConfig {
    max_concurrent: usize,
    buffer_size: usize,
    converter: PathBuf,
    target_format: String,
    quality: u8,
    metadata_file_name: String,
    metadata_extension: String,
    substitution_tool: Option<PathBuf>,
}

impl DefaultExportConfig {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            max_concurrent: cpu_count.max(1) * 2,
            ..Self::default()
        }
    }

    /// TOMLファイルから設定を読み込む
    pub fn from_toml_file(path: &Path) -> ExportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExportError::configuration(format!("{} を読み込めません: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ExportResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ExportError::configuration(format!("TOMLの解析に失敗しました: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_converter(mut self, converter: impl Into<PathBuf>) -> Self {
        self.converter = converter.into();
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_substitution_tool(mut self, tool: Option<PathBuf>) -> Self {
        self.substitution_tool = tool;
        self
    }

    /// 設定値の検証
    pub fn validate(&self) -> ExportResult<()> {
        if self.max_concurrent == 0 {
            return Err(ExportError::configuration(
                "並列タスク数は1以上である必要があります",
            ));
        }
        if self.buffer_size == 0 {
            return Err(ExportError::configuration(
                "バッファサイズは1以上である必要があります",
            ));
        }
        if self.quality > 100 {
            return Err(ExportError::configuration(
                "品質は0から100の範囲で指定してください",
            ));
        }
        if self.target_format.is_empty() || self.metadata_file_name.is_empty() {
            return Err(ExportError::configuration(
                "変換フォーマットとメタデータファイル名は空にできません",
            ));
        }
        Ok(())
    }
}

impl Default for DefaultExportConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get().max(1) * 2,
            buffer_size: 100,
            converter: PathBuf::from(DEFAULT_CONVERTER),
            target_format: "heic".to_string(),
            quality: 100,
            metadata_file_name: "Contents".to_string(),
            metadata_extension: "json".to_string(),
            substitution_tool: None,
        }
    }
}

impl ExportConfig for DefaultExportConfig {
    fn max_concurrent_tasks(&self) -> usize {
        self.max_concurrent
    }

    fn channel_buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn converter_path(&self) -> PathBuf {
        self.converter.clone()
    }

    fn target_format(&self) -> String {
        self.target_format.clone()
    }

    fn quality(&self) -> u8 {
        self.quality
    }

    fn metadata_file_name(&self) -> String {
        self.metadata_file_name.clone()
    }

    fn metadata_extension(&self) -> String {
        self.metadata_extension.clone()
    }

    fn substitution_tool(&self) -> Option<PathBuf> {
        self.substitution_tool.clone()
    }
}
