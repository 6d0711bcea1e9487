// テストユーティリティとフェイク実装
// 変換ツールの代わりとプロジェクトツリーの組み立て
#![allow(dead_code)]

use async_trait::async_trait;
use heic_export::core::{ExportError, ExportResult, ToolOutput, ToolRunner};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const MINIMAL_PNG_DATA: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// HEIFコンテナ風の先頭バイト列。画像としては判定されない
pub const FAKE_HEIC_DATA: &[u8] = b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00mif1heic";

/// 変換ツールの代わりに変換先へダミーのHEICを書き出す
///
/// `failing` に含まれるファイル名は異常終了として扱う
#[derive(Clone, Default)]
pub struct FakeConverter {
    failing: HashSet<String>,
    invocations: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// 変換を試みたソース画像
    pub fn invocations(&self) -> Vec<PathBuf> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolRunner for FakeConverter {
    async fn run(&self, _program: &Path, args: &[String]) -> ExportResult<ToolOutput> {
        // <tool> -s format heic -s formatOptions 100 <source> --out <destination>
        let source = PathBuf::from(&args[6]);
        let destination = PathBuf::from(&args[8]);
        self.invocations.lock().unwrap().push(source.clone());

        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.contains(&file_name) {
            return Err(ExportError::external_tool(
                "sips",
                "exited with status 13: Error: Cannot do format conversion",
            ));
        }

        tokio::fs::write(&destination, FAKE_HEIC_DATA)
            .await
            .map_err(|e| ExportError::external_tool("sips", e.to_string()))?;

        Ok(ToolOutput {
            stdout: format!("{}\n  {}\n", source.display(), destination.display()).into_bytes(),
            stderr: String::new(),
        })
    }
}

/// `Contents.json` の内容を作る
pub fn contents_json(images: &[&str]) -> String {
    let entries: Vec<Value> = images
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "filename": name,
                "idiom": "universal",
                "scale": format!("{}x", i + 1),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "images": entries,
        "info": { "author": "xcode", "version": 1 },
    }))
    .unwrap()
}

/// `<root>/<catalog>/<set>` にPNGと `Contents.json` を作成
pub fn create_image_set(root: &Path, catalog: &str, set: &str, images: &[&str]) -> PathBuf {
    let image_set = root.join(catalog).join(set);
    fs::create_dir_all(&image_set).unwrap();
    for image in images {
        fs::write(image_set.join(image), MINIMAL_PNG_DATA).unwrap();
    }
    fs::write(image_set.join("Contents.json"), contents_json(images)).unwrap();
    image_set
}

/// メタデータに記載されたファイル名の一覧
pub fn metadata_file_names(image_set: &Path) -> Vec<String> {
    let content = fs::read_to_string(image_set.join("Contents.json")).unwrap();
    let value: Value = serde_json::from_str(&content).unwrap();

    value["images"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["filename"].as_str().map(str::to_string))
        .collect()
}
