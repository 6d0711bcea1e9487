// 画像変換ツール (sips) のコマンドライン

use std::path::{Path, PathBuf};

/// 変換先のパス: 同じディレクトリ・同じベース名で拡張子だけを差し替える
pub fn conversion_destination(source: &Path, target_format: &str) -> PathBuf {
    source.with_extension(target_format)
}

/// `-s format <fmt> -s formatOptions <quality> <source> --out <destination>`
pub fn converter_arguments(
    source: &Path,
    destination: &Path,
    target_format: &str,
    quality: u8,
) -> Vec<String> {
    vec![
        "-s".to_string(),
        "format".to_string(),
        target_format.to_string(),
        "-s".to_string(),
        "formatOptions".to_string(),
        quality.to_string(),
        source.to_string_lossy().into_owned(),
        "--out".to_string(),
        destination.to_string_lossy().into_owned(),
    ]
}
