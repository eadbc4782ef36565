use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use record_batch::{
    cli::{execute, init_tracing, Cli, CommandStatus},
    core::BatchConfig,
    services::{RecordService, TracingProgressReporter},
    storage::JsonFileRecordStore,
    ProcessingError,
};

/// 入力が不正（検証エラー・処理中レコードの変更）
const EXIT_CLIENT_ERROR: u8 = 2;
/// ストア障害などそれ以外のエラー
const EXIT_FAILURE: u8 = 4;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(status) => status.exit_code(),
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("Error: {error:#}");
            ExitCode::from(exit_code_for(&error))
        }
    }
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    let client_error = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ProcessingError>())
        .any(ProcessingError::is_client_error);

    if client_error {
        EXIT_CLIENT_ERROR
    } else {
        EXIT_FAILURE
    }
}

async fn run(cli: Cli) -> Result<CommandStatus> {
    let config = cli.resolve_config()?;
    init_tracing(&config.log_level);

    tracing::debug!(
        store = %config.store_path.display(),
        workers = config.batch.worker_count(),
        "設定を読み込みました"
    );

    let store = JsonFileRecordStore::open(&config.store_path).await?;
    let service = RecordService::new(store, &config.batch, TracingProgressReporter::new())?;

    let mut stdout = std::io::stdout();
    let status = execute(cli.command, &service, &mut stdout).await?;

    service.processor().store().compact().await?;
    service.shutdown().await?;
    Ok(status)
}
