use crate::cli::Cli;
use crate::core::ExportConfig;
use crate::engine::create_default_exporter;
use crate::services::DefaultExportConfig;
use crate::tools::resolve_tool;
use anyhow::{Context, Result};
use tracing::info;

/// 何も変換されなかった場合のメッセージ
pub const NO_ASSETS_MESSAGE: &str = "No assets have been found at this path.";

pub fn success_message(converted: usize) -> String {
    format!("Successfully converted and replaced {converted} resources")
}

/// 設定ファイル -> コマンドライン引数（環境変数を含む）の順に上書きして設定を作る
pub fn build_config(cli: &Cli) -> Result<DefaultExportConfig> {
    let mut config = match &cli.config {
        Some(path) => DefaultExportConfig::from_toml_file(path)?,
        None => DefaultExportConfig::default(),
    };

    if let Some(threads) = cli.threads {
        config = config.with_max_concurrent(threads);
    }
    if let Some(converter) = &cli.converter {
        config = config.with_converter(converter);
    }
    if let Some(tool) = &cli.substitution_tool {
        config = config.with_substitution_tool(Some(tool.clone()));
    }

    config.validate()?;
    Ok(config)
}

/// Execute export command
///
/// 成功時は標準出力に出す1行を返す。変換ツールが使えない場合は何も走査しない。
pub async fn execute_export(cli: &Cli) -> Result<String> {
    let config = build_config(cli)?;

    let converter = resolve_tool(&config.converter_path(), "HEIC converter")?;
    let substitution_tool = config
        .substitution_tool()
        .map(|tool| resolve_tool(&tool, "substitution tool"))
        .transpose()?;
    let config = config
        .with_converter(converter)
        .with_substitution_tool(substitution_tool);

    info!(
        project = %cli.project_path.display(),
        workers = config.max_concurrent_tasks(),
        converter = %config.converter_path().display(),
        "変換を開始します"
    );

    let exporter = create_default_exporter(config);
    match exporter.export(&cli.project_path).await {
        Ok(summary) if summary.converted_resources() > 0 => {
            Ok(success_message(summary.converted_resources()))
        }
        Ok(_) => anyhow::bail!(NO_ASSETS_MESSAGE),
        Err(error) if error.is_no_assets_found() => anyhow::bail!(NO_ASSETS_MESSAGE),
        Err(error) => Err(error)
            .with_context(|| format!("{} を変換できませんでした", cli.project_path.display())),
    }
}
