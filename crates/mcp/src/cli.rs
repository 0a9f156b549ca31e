use crate::logging::LogFormat;
use clap::Args;
use std::path::PathBuf;

/// Flags every adapter binary accepts.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Optional TOML file with configuration keys; environment variables override it
    #[arg(short, long, env = "TOOLRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (logs are written to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
