pub mod process;
pub mod records;

pub use process::*;
pub use records::*;

use super::args::Commands;
use crate::core::{ProgressReporter, RecordStatus, RecordStore};
use crate::services::RecordService;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

/// コマンドの終了状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    NotFound,
    PartialFailure,
}

impl CommandStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::PartialFailure => ExitCode::from(1),
            Self::NotFound => ExitCode::from(3),
        }
    }
}

/// サブコマンドを実行し、結果を `out` へJSONで出力
pub async fn execute<S, R, W>(
    command: Commands,
    service: &RecordService<S, R>,
    out: &mut W,
) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    match command {
        Commands::List => execute_list(service, out).await,
        Commands::Get { id } => execute_get(service, id, out).await,
        Commands::Create {
            name,
            description,
            email,
        } => {
            let record = record_from_args(name, description, email, RecordStatus::Pending);
            execute_create(service, record, out).await
        }
        Commands::Update {
            id,
            name,
            description,
            email,
            status,
        } => {
            let record = record_from_args(name, description, email, status.into());
            execute_update(service, id, record, out).await
        }
        Commands::Delete { id } => execute_delete(service, id, out).await,
        Commands::Process { strict } => execute_process(service, strict, out).await,
    }
}

pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
