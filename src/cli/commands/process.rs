// 一括処理コマンド

use super::{write_json, CommandStatus};
use crate::core::{ProgressReporter, RecordStore};
use crate::services::RecordService;
use anyhow::Result;
use std::io::Write;

/// 全 PENDING レコードを処理してレポートを出力
///
/// レポートは常に出力する。`strict` の場合、失敗が1件でもあれば
/// 失敗IDをエラー出力して `CommandStatus::PartialFailure` を返す。
pub async fn execute_process<S, R, W>(
    service: &RecordService<S, R>,
    strict: bool,
    out: &mut W,
) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    let report = service.process_all().await?;
    write_json(out, &report)?;

    if strict {
        if let Err(error) = report.into_strict() {
            eprintln!("Error: {error}");
            return Ok(CommandStatus::PartialFailure);
        }
    }

    Ok(CommandStatus::Success)
}
