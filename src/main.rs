mod cli;
mod scan;

use std::process::exit;
use std::time::{Duration, Instant};

use clap::Parser;
use cli::{Cli, ScanType};
use scan::connect::ConnectScanner;
use scan::device::DeviceScanner;
use scan::syn::SynScanner;
use scan::{ports, ScanError, Scanner, TargetIterator};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn build_scanner(
    ti: TargetIterator,
    scan_type: ScanType,
    timeout: Duration,
    workers: usize,
) -> Result<Box<dyn Scanner>, ScanError> {
    match scan_type {
        ScanType::Stealth => Ok(Box::new(SynScanner::new(ti, timeout, workers)?)),
        ScanType::Connect => Ok(Box::new(ConnectScanner::new(ti, timeout, workers))),
        ScanType::Device => Ok(Box::new(DeviceScanner::new(ti, timeout))),
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(if args.verbose { "debug" } else { "info" }))
        .with_target(false)
        .init();

    if args.targets.is_empty() {
        println!("Please specify a target");
        exit(1);
    }

    let ports = match &args.ports {
        Some(selection) => match ports::parse_selection(selection) {
            Ok(ports) => ports,
            Err(e) => {
                println!("{e}");
                exit(1);
            }
        },
        None => ports::default_ports(),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Scan cancelled. Requesting stop...");
            on_interrupt.cancel();
        }
    });

    let started = Instant::now();
    if !args.json {
        println!("\nStarting scan at {}\n", chrono::Local::now());
    }

    let timeout = Duration::from_millis(args.timeout_ms);
    for target in &args.targets {
        let ti = TargetIterator::new(target);

        let mut scanner = match build_scanner(ti, args.scan_type, timeout, args.workers) {
            Ok(scanner) => scanner,
            Err(e) => {
                println!("{e}");
                exit(1);
            }
        };

        debug!("starting scanner");
        if let Err(e) = scanner.start().await {
            println!("{e}");
            exit(1);
        }

        debug!(%target, "scanning target");
        let results = match scanner.scan(cancel.clone(), &ports).await {
            Ok(results) => results,
            Err(e) => {
                println!("{e}");
                exit(1);
            }
        };

        for result in results {
            if args.json {
                scanner.output_result_json(&result);
            } else if !args.up_only || result.is_up() {
                scanner.output_result(&result);
            }
        }
    }

    if !args.json {
        println!("Scan complete in {:?}.", started.elapsed());
    }
}
