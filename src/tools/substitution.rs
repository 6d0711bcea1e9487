// メタデータファイル内のファイル名置換
// 既定はプロセス内でのリテラル置換。外部の行エディタ (sed) を使う場合の引数組み立ても提供

use crate::core::{ExportError, ExportResult};
use std::path::{Path, PathBuf};

/// 置換前後のファイル名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameSubstitution {
    pub replacing: String,
    pub substitution: String,
}

impl FileNameSubstitution {
    /// 画像パスから `icon.png` -> `icon.heic` の組を作る
    ///
    /// ファイル名がUTF-8でなければ `None`
    pub fn for_image(image_path: &Path, target_format: &str) -> Option<Self> {
        let replacing = image_path.file_name()?.to_str()?.to_string();
        let substitution = image_path
            .with_extension(target_format)
            .file_name()?
            .to_str()?
            .to_string();

        Some(Self {
            replacing,
            substitution,
        })
    }
}

/// イメージセット直下のメタデータファイル (`Contents.json`) のパス
pub fn metadata_path(asset_set: &Path, file_name: &str, extension: &str) -> PathBuf {
    asset_set.join(file_name).with_extension(extension)
}

/// 全ての出現箇所をリテラルに置換し、置換後の文字列と置換回数を返す
pub fn replace_literal(content: &str, replacing: &str, substitution: &str) -> (String, usize) {
    if replacing.is_empty() {
        return (content.to_string(), 0);
    }

    let count = content.matches(replacing).count();
    if count == 0 {
        return (content.to_string(), 0);
    }

    (content.replace(replacing, substitution), count)
}

/// ファイルを書き換える。一致がなければファイルには触れない
///
/// 同じディレクトリの一時ファイルに書いてから置き換えるため、
/// 読み手が途中まで書かれた内容を見ることはない。
/// 同じファイルへの並行呼び出しは呼び出し側で直列化すること。
pub async fn replace_in_file(path: &Path, rule: &FileNameSubstitution) -> ExportResult<usize> {
    let io_error = |e| ExportError::metadata_io(path.display().to_string(), e);
    let content = tokio::fs::read_to_string(path).await.map_err(io_error)?;

    let (patched, count) = replace_literal(&content, &rule.replacing, &rule.substitution);
    if count == 0 {
        return Ok(0);
    }

    let staging = staging_path(path);
    if let Err(e) = tokio::fs::write(&staging, patched).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(io_error(e));
    }
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(io_error(e));
    }

    Ok(count)
}

/// `Contents.json` -> `.Contents.json.heic_export.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    name.push(".heic_export.tmp");
    path.with_file_name(name)
}

/// `-i '' -e 's/<replacing>/<substitution>/g' <path>`
pub fn line_editor_arguments(rule: &FileNameSubstitution, path: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        String::new(),
        "-e".to_string(),
        format!(
            "s/{}/{}/g",
            escape_pattern(&rule.replacing),
            escape_replacement(&rule.substitution)
        ),
        path.to_string_lossy().into_owned(),
    ]
}

/// 基本正規表現のメタ文字と区切り文字をエスケープ
pub fn escape_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '/' | '.' | '*' | '[' | ']' | '^' | '$') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 置換文字列で特別な意味を持つ文字をエスケープ
pub fn escape_replacement(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '/' | '&') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
