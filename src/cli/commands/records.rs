// レコードのCRUDコマンド

use super::{write_json, CommandStatus};
use crate::core::{ProgressReporter, Record, RecordId, RecordStatus, RecordStore};
use crate::services::RecordService;
use anyhow::Result;
use std::io::Write;

pub async fn execute_list<S, R, W>(service: &RecordService<S, R>, out: &mut W) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    let records = service.find_all().await?;
    write_json(out, &records)?;
    Ok(CommandStatus::Success)
}

pub async fn execute_get<S, R, W>(
    service: &RecordService<S, R>,
    id: RecordId,
    out: &mut W,
) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    match service.find_by_id(id).await? {
        Some(record) => {
            write_json(out, &record)?;
            Ok(CommandStatus::Success)
        }
        None => Ok(not_found(id)),
    }
}

pub async fn execute_create<S, R, W>(
    service: &RecordService<S, R>,
    record: Record,
    out: &mut W,
) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    let created = service.create(record).await?;
    write_json(out, &created)?;
    Ok(CommandStatus::Success)
}

pub async fn execute_update<S, R, W>(
    service: &RecordService<S, R>,
    id: RecordId,
    record: Record,
    out: &mut W,
) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    match service.update(id, record).await? {
        Some(updated) => {
            write_json(out, &updated)?;
            Ok(CommandStatus::Success)
        }
        None => Ok(not_found(id)),
    }
}

pub async fn execute_delete<S, R, W>(
    service: &RecordService<S, R>,
    id: RecordId,
    out: &mut W,
) -> Result<CommandStatus>
where
    S: RecordStore + 'static,
    R: ProgressReporter + 'static,
    W: Write,
{
    if service.delete(id).await? {
        write_json(out, &serde_json::json!({ "deleted": id }))?;
        Ok(CommandStatus::Success)
    } else {
        Ok(not_found(id))
    }
}

/// コマンド引数からレコードを組み立てる
pub fn record_from_args(
    name: String,
    description: String,
    email: String,
    status: RecordStatus,
) -> Record {
    Record::new(name, description, email).with_status(status)
}

fn not_found(id: RecordId) -> CommandStatus {
    eprintln!("Record not found: {id}");
    CommandStatus::NotFound
}
