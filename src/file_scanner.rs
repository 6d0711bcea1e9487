// アセット走査 - ディレクトリツリーからカテゴリに一致するパスを列挙

use crate::core::{AssetCategory, DiscoveredPath, ExportError, ExportResult};
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub struct FileScanner;

impl FileScanner {
    /// `root` 以下を再帰的に走査し、カテゴリに一致するパスを返す
    ///
    /// 一致が0件なら `NoAssetsFound`、ルート自体を走査できなければ
    /// `DiscoveryUnavailable` を返す。結果はパス順にソートされる。
    pub fn locate(category: AssetCategory, root: &Path) -> ExportResult<Vec<PathBuf>> {
        let metadata = std::fs::metadata(root).map_err(|e| {
            ExportError::discovery_unavailable(root.display().to_string(), e.into())
        })?;
        if !metadata.is_dir() {
            return Err(ExportError::discovery_unavailable(
                root.display().to_string(),
                anyhow::anyhow!("ディレクトリではありません"),
            ));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                // 配下の読めないエントリは飛ばして走査を続ける
                Err(error) => {
                    warn!(root = %root.display(), %error, "エントリを読み込めません");
                    continue;
                }
            };

            if Self::matches(category, &entry) {
                paths.push(entry.into_path());
            }
        }

        if paths.is_empty() {
            return Err(ExportError::no_assets_found(
                root.display().to_string(),
                category,
            ));
        }

        paths.sort();
        debug!(root = %root.display(), %category, count = paths.len(), "アセットを発見");
        Ok(paths)
    }

    /// `locate` と同じだが、カテゴリ付きで返す
    pub fn locate_discovered(
        category: AssetCategory,
        root: &Path,
    ) -> ExportResult<Vec<DiscoveredPath>> {
        Ok(Self::locate(category, root)?
            .into_iter()
            .map(|path| DiscoveredPath { path, category })
            .collect())
    }

    fn matches(category: AssetCategory, entry: &DirEntry) -> bool {
        match category.directory_extension() {
            Some(expected) => {
                entry.file_type().is_dir()
                    && entry
                        .path()
                        .extension()
                        .is_some_and(|extension| extension == expected)
            }
            None => entry.file_type().is_file() && Self::is_image_content(entry.path()),
        }
    }

    /// 拡張子ではなくファイルの内容で画像かどうかを判定
    ///
    /// 先頭のシグネチャだけでなく、デコーダがヘッダから寸法を読めることまで確認する
    pub fn is_image_content(path: &Path) -> bool {
        let reader = match ImageReader::open(path).and_then(|reader| reader.with_guessed_format()) {
            Ok(reader) => reader,
            Err(_) => return false,
        };
        if reader.format().is_none() {
            return false;
        }

        reader.into_dimensions().is_ok()
    }
}
