use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scribe-relay",
    version,
    about = "Speech token, config and transcript rewrite relay"
)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1:7071")]
    pub listen_addr: String,
    /// Optional TOML file overriding upstream and endpoint settings.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write JSON logs to a daily-rolling file in this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub log_to_stderr: bool,
}
