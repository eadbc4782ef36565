use crate::core::RecordStatus;
use crate::services::AppConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "record_batch")]
#[command(about = "Manage records and mark every pending record as processed in parallel")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Record store file (overrides the configuration file)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Number of workers for batch processing
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 設定ファイルを読み込み、コマンドライン引数で上書きする
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(store) = &self.store {
            config = config.with_store_path(store);
        }
        if let Some(workers) = self.workers {
            config = config.with_worker_count(workers);
        }
        if let Some(log_level) = &self.log_level {
            config = config.with_log_level(log_level);
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all records
    List,

    /// Show a single record
    Get {
        /// Record id
        id: u64,
    },

    /// Create a new record (always starts as PENDING)
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long)]
        email: String,
    },

    /// Replace an existing record
    Update {
        /// Record id
        id: u64,

        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long)]
        email: String,

        /// New status (PROCESSED records cannot go back to PENDING)
        #[arg(long, value_enum, default_value = "pending")]
        status: StatusArg,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: u64,
    },

    /// Mark every pending record as processed
    Process {
        /// Exit with an error if any record failed
        #[arg(long)]
        strict: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Pending,
    Processed,
}

impl From<StatusArg> for RecordStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => RecordStatus::Pending,
            StatusArg::Processed => RecordStatus::Processed,
        }
    }
}
