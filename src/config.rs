//! Process configuration.
//!
//! Every setting can be given as a flag or through the environment. The
//! configuration is read once at startup and never reloaded.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "teller", version, about = "Audited web service")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Enables request auditing when set to any non-empty value
    #[arg(long, env = "LOGGER_ENABLE")]
    pub logger_enable: Option<String>,

    /// Directory holding the audit log files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Directory for uploaded file storage, created at startup
    #[arg(long, env = "FILES_DIR", default_value = "files")]
    pub files_dir: PathBuf,
}

impl Config {
    /// Absent or empty toggle means auditing is off.
    pub fn logging_enabled(&self) -> bool {
        self.logger_enable.as_deref().is_some_and(|v| !v.is_empty())
    }
}
