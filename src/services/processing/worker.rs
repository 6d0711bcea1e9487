// Worker - 変換タスク・書き換えタスクの本体

use crate::core::{
    ExportConfig, ExportError, ExportResult, TaskExecutor, TaskKind, TaskOutcome, TaskOutput,
    TaskSpec, ToolRunner,
};
use crate::tools::converter::{conversion_destination, converter_arguments};
use crate::tools::substitution::{
    line_editor_arguments, metadata_path, replace_in_file, replace_literal, FileNameSubstitution,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// `TaskSpec` を外部ツールとファイル操作で実行する
///
/// 同じイメージセットの書き換えタスクは1つのメタデータファイルを共有するので、
/// ファイルごとのロックで読み込みから書き戻しまでを直列化する。
pub struct ExportTaskExecutor<R, C> {
    runner: R,
    config: C,
    metadata_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R, C> ExportTaskExecutor<R, C>
where
    R: ToolRunner,
    C: ExportConfig,
{
    pub fn new(runner: R, config: C) -> Self {
        Self {
            runner,
            config,
            metadata_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn metadata_lock(&self, metadata_path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .metadata_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(metadata_path.to_path_buf()).or_default())
    }

    /// 画像を変換し、同じディレクトリに新しい拡張子で書き出す
    async fn convert(&self, image_path: &Path) -> ExportResult<TaskOutput> {
        let format = self.config.target_format();
        let destination = conversion_destination(image_path, &format);
        let args = converter_arguments(image_path, &destination, &format, self.config.quality());

        let output = self
            .runner
            .run(&self.config.converter_path(), &args)
            .await?;

        Ok(TaskOutput::Converted {
            stdout: output.stdout,
            destination,
        })
    }

    /// メタデータ内の元ファイル名を変換後のファイル名に置き換える
    ///
    /// 変換後のファイルが存在しなければ何も書き換えずに失敗する
    async fn patch(&self, asset_set: &Path, image_path: &Path) -> ExportResult<TaskOutput> {
        let format = self.config.target_format();
        let converted = conversion_destination(image_path, &format);
        if !tokio::fs::try_exists(&converted).await.unwrap_or(false) {
            return Err(ExportError::converted_file_missing(
                converted.display().to_string(),
            ));
        }

        let rule = FileNameSubstitution::for_image(image_path, &format).ok_or_else(|| {
            ExportError::metadata_io(
                image_path.display().to_string(),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "ファイル名がUTF-8ではありません",
                ),
            )
        })?;
        let metadata_path = metadata_path(
            asset_set,
            &self.config.metadata_file_name(),
            &self.config.metadata_extension(),
        );

        let lock = self.metadata_lock(&metadata_path);
        let _guard = lock.lock().await;

        let replacements = match self.config.substitution_tool() {
            Some(tool) => {
                let content = tokio::fs::read_to_string(&metadata_path)
                    .await
                    .map_err(|e| ExportError::metadata_io(metadata_path.display().to_string(), e))?;
                let (_, expected) = replace_literal(&content, &rule.replacing, &rule.substitution);

                self.runner
                    .run(&tool, &line_editor_arguments(&rule, &metadata_path))
                    .await?;
                expected
            }
            None => replace_in_file(&metadata_path, &rule).await?,
        };

        debug!(
            metadata = %metadata_path.display(),
            replacing = %rule.replacing,
            substitution = %rule.substitution,
            replacements,
            "メタデータを書き換えました"
        );

        Ok(TaskOutput::Patched {
            metadata_path,
            replacements,
        })
    }
}

#[async_trait]
impl<R, C> TaskExecutor for ExportTaskExecutor<R, C>
where
    R: ToolRunner,
    C: ExportConfig,
{
    async fn execute(&self, spec: &TaskSpec) -> TaskOutcome {
        let result = match &spec.kind {
            TaskKind::Convert { image_path } => self.convert(image_path).await,
            TaskKind::Patch {
                asset_set_path,
                image_path,
            } => self.patch(asset_set_path, image_path).await,
        };

        match result {
            Ok(output) => TaskOutcome::Succeeded(output),
            Err(error) => TaskOutcome::Failed {
                error: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockToolRunner;
    use crate::core::{TaskId, ToolOutput};
    use crate::services::DefaultExportConfig;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CONTENTS_JSON: &str =
        r#"{"images":[{"filename":"icon.png","scale":"1x"},{"filename":"other.png"}]}"#;

    fn image_set() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let image_set = temp_dir.path().join("icon.imageset");
        fs::create_dir(&image_set).unwrap();
        fs::write(image_set.join("Contents.json"), CONTENTS_JSON).unwrap();
        fs::write(image_set.join("icon.png"), b"png").unwrap();
        (temp_dir, image_set)
    }

    #[tokio::test]
    async fn test_convert_invokes_converter() {
        let mut runner = MockToolRunner::new();
        runner
            .expect_run()
            .withf(|program: &Path, args: &[String]| {
                program == Path::new("/usr/bin/sips")
                    && args[2] == "heic"
                    && args[5] == "100"
                    && args[6] == "/a/icon.png"
                    && args[8] == "/a/icon.heic"
            })
            .times(1)
            .returning(|_, _| {
                Ok(ToolOutput {
                    stdout: b"/a/icon.png\n".to_vec(),
                    stderr: String::new(),
                })
            });

        let executor = ExportTaskExecutor::new(runner, DefaultExportConfig::default());
        let outcome = executor.execute(&TaskSpec::convert("/a/icon.png")).await;

        assert_eq!(
            outcome,
            TaskOutcome::Succeeded(TaskOutput::Converted {
                stdout: b"/a/icon.png\n".to_vec(),
                destination: PathBuf::from("/a/icon.heic"),
            })
        );
    }

    #[tokio::test]
    async fn test_convert_failure_is_reported() {
        let mut runner = MockToolRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _| Err(ExportError::external_tool("sips", "exited with status 1")));

        let executor = ExportTaskExecutor::new(runner, DefaultExportConfig::default());
        let outcome = executor.execute(&TaskSpec::convert("/a/icon.png")).await;

        match outcome {
            TaskOutcome::Failed { error } => assert!(error.contains("sips")),
            other => panic!("Expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_patch_rewrites_metadata_in_process() {
        let (_temp_dir, image_set) = image_set();
        fs::write(image_set.join("icon.heic"), b"heic").unwrap();

        let mut runner = MockToolRunner::new();
        runner.expect_run().never();

        let executor = ExportTaskExecutor::new(runner, DefaultExportConfig::default());
        let spec = TaskSpec::patch(&image_set, image_set.join("icon.png"), TaskId::new(0));
        let outcome = executor.execute(&spec).await;

        assert_eq!(
            outcome,
            TaskOutcome::Succeeded(TaskOutput::Patched {
                metadata_path: image_set.join("Contents.json"),
                replacements: 1,
            })
        );
        let patched = fs::read_to_string(image_set.join("Contents.json")).unwrap();
        assert!(patched.contains("icon.heic"));
        assert!(!patched.contains("icon.png"));
        assert!(patched.contains("other.png"));
    }

    #[tokio::test]
    async fn test_patch_without_converted_file_leaves_metadata_untouched() {
        let (_temp_dir, image_set) = image_set();

        let executor =
            ExportTaskExecutor::new(MockToolRunner::new(), DefaultExportConfig::default());
        let spec = TaskSpec::patch(&image_set, image_set.join("icon.png"), TaskId::new(0));
        let outcome = executor.execute(&spec).await;

        match outcome {
            TaskOutcome::Failed { error } => assert!(error.contains("icon.heic")),
            other => panic!("Expected failure, got {other:?}"),
        }
        assert_eq!(
            fs::read_to_string(image_set.join("Contents.json")).unwrap(),
            CONTENTS_JSON
        );
    }

    #[tokio::test]
    async fn test_patch_with_external_substitution_tool() {
        let (_temp_dir, image_set) = image_set();
        fs::write(image_set.join("icon.heic"), b"heic").unwrap();
        let expected_metadata = image_set.join("Contents.json");
        let expected_path = expected_metadata.to_string_lossy().into_owned();

        let mut runner = MockToolRunner::new();
        runner
            .expect_run()
            .withf(move |program: &Path, args: &[String]| {
                program == Path::new("/usr/bin/sed")
                    && args[3] == r"s/icon\.png/icon.heic/g"
                    && args[4] == expected_path
            })
            .times(1)
            .returning(|_, _| Ok(ToolOutput::default()));

        let config = DefaultExportConfig::default()
            .with_substitution_tool(Some(PathBuf::from("/usr/bin/sed")));
        let executor = ExportTaskExecutor::new(runner, config);
        let spec = TaskSpec::patch(&image_set, image_set.join("icon.png"), TaskId::new(0));

        assert_eq!(
            executor.execute(&spec).await,
            TaskOutcome::Succeeded(TaskOutput::Patched {
                metadata_path: expected_metadata,
                replacements: 1,
            })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_patches_of_one_image_set_keep_every_substitution() {
        const IMAGES: usize = 12;
        let temp_dir = TempDir::new().unwrap();
        let image_set = temp_dir.path().join("icon.imageset");
        fs::create_dir(&image_set).unwrap();

        let names: Vec<String> = (1..=IMAGES).map(|i| format!("icon@{i}x")).collect();
        let entries: Vec<String> = names
            .iter()
            .map(|name| format!(r#"{{"filename":"{name}.png","idiom":"universal"}}"#))
            .collect();
        fs::write(
            image_set.join("Contents.json"),
            format!(r#"{{"images":[{}],"info":{{"version":1}}}}"#, entries.join(",")),
        )
        .unwrap();
        for name in &names {
            fs::write(image_set.join(format!("{name}.png")), b"png").unwrap();
            fs::write(image_set.join(format!("{name}.heic")), b"heic").unwrap();
        }

        let mut runner = MockToolRunner::new();
        runner.expect_run().never();
        let executor = Arc::new(ExportTaskExecutor::new(
            runner,
            DefaultExportConfig::default(),
        ));

        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let executor = Arc::clone(&executor);
                let spec = TaskSpec::patch(
                    &image_set,
                    image_set.join(format!("{name}.png")),
                    TaskId::new(0),
                );
                tokio::spawn(async move { executor.execute(&spec).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(
                handle.await.unwrap(),
                TaskOutcome::Succeeded(TaskOutput::Patched {
                    metadata_path: image_set.join("Contents.json"),
                    replacements: 1,
                })
            );
        }

        let patched = fs::read_to_string(image_set.join("Contents.json")).unwrap();
        let metadata: serde_json::Value = serde_json::from_str(&patched).unwrap();
        let file_names: Vec<&str> = metadata["images"]
            .as_array()
            .unwrap()
            .iter()
            .map(|image| image["filename"].as_str().unwrap())
            .collect();
        let expected: Vec<String> = names.iter().map(|name| format!("{name}.heic")).collect();
        assert_eq!(file_names, expected);
        assert!(!patched.contains(".png"));
    }

    #[tokio::test]
    async fn test_patch_with_missing_metadata_fails() {
        let temp_dir = TempDir::new().unwrap();
        let image_set = temp_dir.path().join("icon.imageset");
        fs::create_dir(&image_set).unwrap();
        fs::write(image_set.join("icon.png"), b"png").unwrap();
        fs::write(image_set.join("icon.heic"), b"heic").unwrap();

        let executor =
            ExportTaskExecutor::new(MockToolRunner::new(), DefaultExportConfig::default());
        let spec = TaskSpec::patch(&image_set, image_set.join("icon.png"), TaskId::new(0));

        assert!(!executor.execute(&spec).await.is_success());
    }
}
