//! Local-network device sweeps: ARP table identity plus a single liveness
//! probe per host.

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{self, JoinSet};
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;

use super::result::pad;
use super::targets::TargetIterator;
use super::{arp, oui, ScanError, ScanResult, Scanner};

const MAX_INFLIGHT: usize = 128;

/// Nothing listens on tcpmux in practice, which is the point: any answer at
/// all (even a refusal) proves the host is there.
const LIVENESS_PORT: u16 = 1;

pub struct DeviceScanner {
    timeout: Duration,
    ti: TargetIterator,
}

impl DeviceScanner {
    pub fn new(ti: TargetIterator, timeout: Duration) -> Self {
        Self { timeout, ti }
    }
}

#[async_trait]
impl Scanner for DeviceScanner {
    async fn start(&mut self) -> Result<(), ScanError> {
        Ok(())
    }

    async fn scan(
        &mut self,
        cancel: CancellationToken,
        _ports: &[u16],
    ) -> Result<Vec<ScanResult>, ScanError> {
        let inflight = Arc::new(Semaphore::new(MAX_INFLIGHT));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let mut hosts = JoinSet::new();

        while let Some(ip) = self.ti.next()? {
            if cancel.is_cancelled() {
                break;
            }
            let Ok(permit) = inflight.clone().acquire_owned().await else {
                break;
            };
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            let limit = self.timeout;
            hosts.spawn(async move {
                let _permit = permit;
                if cancel.is_cancelled() {
                    return;
                }
                let result = scan_device(ip, limit).await;
                if !cancel.is_cancelled() {
                    let _ = result_tx.send(result);
                }
            });
        }
        drop(result_tx);

        let mut results = Vec::new();
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }
        while hosts.join_next().await.is_some() {}

        Ok(results)
    }

    fn output_result(&self, result: &ScanResult) {
        println!("Scan results for host {}", result.host);

        let status = if result.is_up() { "UP" } else { "DOWN" };
        println!("\t{} {}", pad("Status:", 24), status);

        if let Some(latency) = result.latency {
            println!("\t{} {:?}", pad("Latency:", 24), latency);
        }
        if let Some(mac) = &result.mac {
            println!("\t{} {}", pad("MAC:", 24), mac);
        }
        if let Some(manufacturer) = &result.manufacturer {
            println!("\t{} {}", pad("Manufacturer:", 24), manufacturer);
        }
        if let Some(name) = &result.name {
            println!("\t{} {}", pad("Name:", 24), name);
        }
        println!();
    }
}

async fn scan_device(ip: Ipv4Addr, limit: Duration) -> ScanResult {
    let mut result = ScanResult::new(ip);

    if let Some(mac) = arp::search(ip) {
        result.mac = Some(mac.to_string());
        result.manufacturer = oui::lookup(mac).map(str::to_string);
        result.name = task::spawn_blocking(move || dns_lookup::lookup_addr(&IpAddr::V4(ip)).ok())
            .await
            .ok()
            .flatten();
    }

    let started = Instant::now();
    match timeout(limit, TcpStream::connect(SocketAddrV4::new(ip, LIVENESS_PORT))).await {
        Ok(Ok(stream)) => {
            result.latency = Some(started.elapsed());
            drop(stream);
        }
        // A refusal (or any other immediate error) is still proof of life;
        // only silence means down.
        Ok(Err(e)) if e.kind() != ErrorKind::TimedOut => {
            result.latency = Some(started.elapsed());
        }
        _ => {}
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_refusal_counts_as_up() {
        let result = scan_device(Ipv4Addr::LOCALHOST, Duration::from_millis(500)).await;
        assert!(result.is_up());
        assert!(result.open.is_empty());
    }

    #[tokio::test]
    async fn scan_reports_one_record_per_host() {
        let ti = TargetIterator::new("127.0.0.1");
        let mut scanner = DeviceScanner::new(ti, Duration::from_millis(500));
        scanner.start().await.unwrap();
        let results = scanner.scan(CancellationToken::new(), &[]).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].host, Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn cancellation_before_dispatch_yields_no_results() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ti = TargetIterator::new("127.0.0.1");
        let mut scanner = DeviceScanner::new(ti, Duration::from_millis(200));
        scanner.start().await.unwrap();
        let results = scanner.scan(cancel, &[]).await.unwrap();
        assert!(results.is_empty());
    }
}
