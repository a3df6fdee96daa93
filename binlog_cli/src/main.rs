mod cli_client;
mod cli_options;
mod pretty_util;

use std::env::current_dir;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use common::config::{read_config, RepConfig};
use common::err::decode_error::ReError;
use common::err::CResult;
use common::log::tracing_factory::{OutputType, TracingFactory, TracingFactoryOptions};

use crate::cli_client::CliClient;
use crate::cli_options::CliArgs;

#[tokio::main]
async fn main() -> CResult<()> {
    let args = CliArgs::parse();
    let format = args.format()?;

    let rep_config = load_config(&args)?;

    let log_opt = TracingFactoryOptions::new(args.debug, OutputType::Log, rep_config.base.get_log_dir());
    let _log_factory = TracingFactory::init_log_with_options(log_opt);

    let mut binlog_config = rep_config.binlog;
    // merge binlog settings
    args.merge(&mut binlog_config)?;
    info!(
        "binlog source {}:{}, {} tables",
        binlog_config.get_host(),
        binlog_config.get_port(),
        binlog_config.tables.len()
    );

    let client = CliClient::new(format, binlog_config);
    let slave = client.build_slave()?;

    let shutdown = slave.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, stopping");
            shutdown.cancel();
        }
    });

    // the stream blocks on socket reads
    let rs = tokio::task::spawn_blocking(move || client.run(slave))
        .await
        .map_err(|e| ReError::String(e.to_string()))?;
    if let Err(e) = &rs {
        error!("binlog cli exited: {}", e);
    }
    rs
}

/// Reads the config file when one is found, else the defaults.
fn load_config(args: &CliArgs) -> CResult<RepConfig> {
    match get_config_path(args) {
        Some(path) => read_config(path),
        None => Ok(RepConfig::default()),
    }
}

/// `--config`, else `./conf/replayer.toml` when it exists.
fn get_config_path(args: &CliArgs) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    let mut pwd = current_dir().unwrap_or_else(|_| "/".into());
    pwd.push("conf");
    pwd.push("replayer");
    pwd.set_extension("toml");

    if pwd.exists() {
        Some(pwd)
    } else {
        None
    }
}
