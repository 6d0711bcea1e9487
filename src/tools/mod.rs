//! 外部ツールの起動と、変換・置換ツールのコマンドライン組み立て。

pub mod converter;
pub mod substitution;

use crate::core::{ExportError, ExportResult, ToolOutput, ToolRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// 子プロセスとしてツールを起動する `ToolRunner` 実装
///
/// タイムアウトは設けない。ツールが止まればそのタスクも止まる。
#[derive(Debug, Default, Clone)]
pub struct ProcessToolRunner;

impl ProcessToolRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for ProcessToolRunner {
    async fn run(&self, program: &Path, args: &[String]) -> ExportResult<ToolOutput> {
        let tool = program_name(program);
        debug!(%tool, ?args, "外部ツールを起動");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExportError::external_tool(&tool, format!("failed to spawn: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ExportError::external_tool(
                tool,
                format!("exited with status {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}

/// ツールの実体を解決する
///
/// パス区切りを含む場合はそのファイルが存在すること、コマンド名だけなら
/// `PATH` から見つかることを要求する。
pub fn resolve_tool(tool: &Path, role: &str) -> ExportResult<PathBuf> {
    if tool.components().count() > 1 || tool.is_absolute() {
        return if tool.is_file() {
            Ok(tool.to_path_buf())
        } else {
            Err(unavailable(tool, role))
        };
    }

    which::which(tool).map_err(|_| unavailable(tool, role))
}

fn unavailable(tool: &Path, role: &str) -> ExportError {
    ExportError::platform_unavailable(format!(
        "The {role} is unavailable on this system: {}",
        tool.display()
    ))
}

fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string_lossy().into_owned())
}
