//! CLI definitions for staffdesk.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use staffdesk_admin::ReferenceOptions;

#[derive(Debug, Parser)]
#[command(
    name = "staffdesk",
    version,
    about = "Employee, leave, and user records from the command line",
    infer_subcommands = true,
    after_help = "Examples:\n  staffdesk stub --token dev                      # local backend with demo data\n  STAFFDESK_TOKEN=dev staffdesk list employees --search doe --sort lastName\n  staffdesk create leave --set employeeId=1 --set startDate=2024-06-03 --set endDate=2024-06-07"
)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = "staffdesk.toml")]
    pub config: PathBuf,
    /// Backend base URL (overrides backend.url).
    #[arg(long, global = true)]
    pub backend: Option<String>,
    /// Show debug logs.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of a collection.
    List {
        /// employees, leaves, or users.
        entity: String,
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Rows per page (overrides list.page_size).
        #[arg(long)]
        page_size: Option<u32>,
        /// Search term.
        #[arg(long)]
        search: Option<String>,
        /// Sort column; repeat the same column to sort descending.
        #[arg(long = "sort", value_name = "FIELD")]
        sort: Vec<String>,
    },
    /// Show one record.
    Get {
        entity: String,
        id: i64,
    },
    /// Create a record.
    #[command(
        after_help = "Examples:\n  staffdesk create employee --set firstName=Jane --set lastName=Doe --set email=jane@x.io --set phoneNumber=5550100"
    )]
    Create {
        entity: String,
        /// Field assignment, repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Update a record; unset fields keep their current value.
    Update {
        entity: String,
        id: i64,
        /// Field assignment, repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Delete a record.
    Delete {
        entity: String,
        id: i64,
    },
    /// List pick-list entries (id and label) of a collection.
    Options {
        entity: String,
        /// Maximum entries.
        #[arg(long, default_value_t = ReferenceOptions::DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Run the in-process stub backend.
    Stub {
        /// Listen address.
        #[arg(long, default_value = "127.0.0.1:3000")]
        listen: String,
        /// Require this bearer token.
        #[arg(long)]
        token: Option<String>,
        /// Start without demo data.
        #[arg(long)]
        empty: bool,
    },
}
