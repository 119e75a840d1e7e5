use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use dummy_optnode::highlight::HighlightState;
use dummy_optnode::network::NeSession;
use dummy_optnode::status::{self, StatusEvent};
use dummy_optnode::topology::{DescriptorPaths, TopologyModel};
use dummy_optnode::{Config, Error, Result};

/// Emulated optical network elements for an OpenFlow controller
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding ll1.txt, ll2.txt, och_link.txt and idex.txt
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// NE to start; repeat for several, default is every NE
    #[arg(long = "ne")]
    nes: Vec<String>,
    /// Controller host
    #[arg(long)]
    host: Option<String>,
    /// Controller port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(host) = args.host {
        config.controller_host = host;
    }
    if let Some(port) = args.port {
        config.controller_port = port;
    }
    debug!("Configuration: {:?}", config);

    let model = TopologyModel::load(&DescriptorPaths::in_dir(&config.data_dir))?;

    let nes: Vec<String> = if args.nes.is_empty() {
        model.ne_ids().map(str::to_string).collect()
    } else {
        args.nes
    };

    let (events, mut rx) = status::channel();
    let mut sessions = Vec::new();
    for ne in &nes {
        match NeSession::new(&model, ne, config.clone(), events.clone()) {
            Ok(session) => sessions.push(session),
            Err(e) => warn!("{} is not started: {}", ne, e),
        }
    }
    drop(events);
    if sessions.is_empty() {
        return Err(Error::topology("no NE can be started"));
    }

    let highlights: HashMap<String, Arc<HighlightState>> = sessions
        .iter()
        .map(|s| (s.ne().to_string(), s.highlights()))
        .collect();
    let reporter = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            report(&event, &highlights);
        }
    });

    let results = join_all(sessions.iter().map(NeSession::run)).await;
    for (session, result) in sessions.iter().zip(results) {
        if let Err(e) = result {
            warn!("{} session ended: {}", session.ne(), e);
        }
    }

    reporter.abort();
    Ok(())
}

fn report(event: &StatusEvent, highlights: &HashMap<String, Arc<HighlightState>>) {
    match event {
        StatusEvent::FlowMod { ne, dpid, summary, at } => {
            info!("[{}] {} DPID={}\n{}", at.format("%H:%M:%S"), ne, dpid, summary)
        }
        StatusEvent::Refresh { ne } => {
            if let Some(state) = highlights.get(ne) {
                let snapshot = state.snapshot();
                debug!("{} highlights new={:?} old={:?}", ne, snapshot.new, snapshot.old);
            }
        }
        other => {
            if let Some(text) = other.status_text() {
                debug!("{} status: {:?}", other.ne(), text);
            }
        }
    }
}
