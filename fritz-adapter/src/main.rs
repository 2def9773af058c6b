#[macro_use]
extern crate tracing;

use anyhow::Result;
use clap::Parser;
use fritz_adapter::{Command, Config, FritzAdapter, Timer};
use fritz_client::DeviceEvent;
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

/// Polls the smart home devices of a fritz box. Device events are printed as
/// JSON lines, commands are read from stdin as `<ain> <property> <value>`.
#[derive(Parser)]
struct Args {
    #[clap(short, long, action, help = "log api requests and device updates")]
    debug: bool,
    #[clap(short, long, action, help = "yaml config file")]
    config: Option<PathBuf>,
    #[clap(long, env = "FRITZ_HOST")]
    host: Option<String>,
    #[clap(long, env = "FRITZ_USER")]
    user: Option<String>,
    #[clap(long, env = "FRITZ_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[clap(long, help = "poll interval, e.g. \"0mins 10secs\"", value_parser = fritz_adapter::duration::duration_parse)]
    poll_interval: Option<chrono::Duration>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(file) => Config::from_yaml_file(file)?,
            None => Config::default(),
        };
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(user) = self.user {
            config.username = Some(user);
        }
        if let Some(password) = self.password {
            config.password = Some(password);
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        config.debug |= self.debug;
        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Args::parse().into_config()?;

    let log_level = if config.debug {
        "info,fritz_client=trace,fritz_adapter=debug,reqwest=debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::builder().parse_lossy(log_level))
        .with(tracing_forest::ForestLayer::default())
        .init();

    run(config)
}

fn run(config: Config) -> Result<()> {
    let (events_tx, events_rx) = flume::unbounded::<DeviceEvent>();
    let _printer = std::thread::spawn(move || {
        for event in events_rx {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(err) => error!("Cannot serialize {event:?}: {err}"),
            }
        }
    });

    let timer = Timer::with_interval(config.poll_interval);
    let mut adapter = FritzAdapter::start(config, events_tx)?;

    // `commands_tx` stays alive until `run` returns, so polling continues
    // after stdin is closed
    let (commands_tx, commands_rx) = flume::unbounded::<Command>();
    let stdin_tx = commands_tx.clone();
    let _reader = std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    error!("Cannot read stdin: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(cmd) => {
                    if stdin_tx.send(cmd).is_err() {
                        break;
                    }
                }
                Err(err) => warn!("{err}"),
            }
        }
        debug!("stdin closed");
    });

    adapter.run(&timer, commands_rx);
    Ok(())
}
