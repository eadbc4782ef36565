// レコード検証機能

use crate::core::{Record, RecordStatus, ValidationError, ValidationResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("Invalid email regex")
});

/// 保存前のレコード検証
pub fn validate_record(record: &Record) -> ValidationResult<()> {
    validate_name(&record.name)?;
    validate_email(&record.email)?;
    Ok(())
}

pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "名前は必須です"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::new("email", "メールアドレスは必須です"));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::new(
            "email",
            format!("メールアドレスの形式が不正です: {email}"),
        ));
    }
    Ok(())
}

/// ステータス遷移の検証（PROCESSED から PENDING へは戻せない）
pub fn validate_status_transition(
    current: RecordStatus,
    next: RecordStatus,
) -> ValidationResult<()> {
    if current.is_processed() && !next.is_processed() {
        return Err(ValidationError::new(
            "status",
            format!("{current} から {next} へは変更できません"),
        ));
    }
    Ok(())
}
