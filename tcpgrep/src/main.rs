#![warn(clippy::all)]

#[macro_use]
extern crate log;

use clap::{crate_version, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libtcpgrep::{
    Config, Dispatcher, Error, FrameSource, PatternMatcher, PcapFileSource, TextSink,
};
use libtcpgrep_live::{default_interface, LiveCaptureSource};

/// Print TCP segments whose payload contains a pattern
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<String>,

    /// Network interface to capture from (default: first capture device)
    #[arg(short, long)]
    interface: Option<String>,

    /// Read frames from a pcap/pcap-ng file instead of a live interface
    #[arg(long, value_name = "FILE")]
    input: Option<String>,

    /// BPF capture filter expression
    #[arg(short, long)]
    filter: Option<String>,

    /// Do not put the interface in promiscuous mode
    #[arg(long)]
    no_promisc: bool,

    /// Pattern to search for (case-insensitive substring)
    pattern: String,
}

fn load_config(config: &mut Config, filename: &str) -> Result<(), io::Error> {
    debug!("Loading configuration {filename}");
    let path = Path::new(&filename);
    let file = File::open(path)?;
    config.load_config(file)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_env("TCPGREP_LOG")
        .unwrap_or_else(|_| EnvFilter::from_default_env().add_directive(Level::INFO.into()));
    tracing_subscriber::fmt()
        // keep stdout for matched payloads
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .compact()
        .init();

    info!("tcpgrep {}", crate_version!());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("tcpgrep: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let mut config = Config::default();
    if let Some(filename) = &args.config {
        load_config(&mut config, filename)?;
    }
    // command-line arguments override the configuration file
    if args.no_promisc {
        config.set("live.promisc", false);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|_| Error::Generic("could not set the signal handler"))?;

    let matcher = PatternMatcher::new(&args.pattern);
    let mut dispatcher = Dispatcher::new(matcher, TextSink::new(io::stdout()));

    let mut source: Box<dyn FrameSource> = match &args.input {
        Some(filename) => {
            info!("reading frames from {filename}");
            let file = File::open(Path::new(filename))?;
            Box::new(PcapFileSource::new(filename, file, &config)?)
        }
        None => {
            let interface = match &args.interface {
                Some(name) => name.clone(),
                None => default_interface()?,
            };
            let live = LiveCaptureSource::open(
                &interface,
                args.filter.as_deref(),
                &config,
                running.clone(),
            )?;
            println!("listening on {interface}");
            Box::new(live)
        }
    };

    dispatcher.run(source.as_mut(), running)?;

    let stats = dispatcher.stats();
    info!(
        "done: {} frames, {} matched, {} capture errors",
        stats.frames, stats.matched, stats.capture_errors
    );
    Ok(())
}
