//! Full-handshake TCP scanning through a bounded worker pool.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::result::{spawn_aggregator, OutcomeSender};
use super::targets::TargetIterator;
use super::{PortState, ScanError, ScanResult, Scanner};

/// One probe owned by a pool worker. Dropping `outcome` (on completion or on
/// a cancelled job) is what lets the owning host scan finish.
struct PortJob {
    ip: Ipv4Addr,
    port: u16,
    outcome: OutcomeSender,
    cancel: CancellationToken,
}

pub struct ConnectScanner {
    timeout: Duration,
    workers: usize,
    ti: TargetIterator,
    job_tx: Option<mpsc::Sender<PortJob>>,
}

impl ConnectScanner {
    pub fn new(ti: TargetIterator, timeout: Duration, workers: usize) -> Self {
        Self {
            timeout,
            workers: workers.max(1),
            ti,
            job_tx: None,
        }
    }

    /// Success means open, a refusal means closed. Anything else (timeouts
    /// included) stays unknown: the reply we did not get could have been
    /// dropped anywhere.
    async fn probe(ip: Ipv4Addr, port: u16, limit: Duration) -> PortState {
        let addr = SocketAddrV4::new(ip, port);
        match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortState::Open
            }
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => PortState::Closed,
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "connect probe failed");
                PortState::Unknown
            }
            Err(_) => PortState::Unknown,
        }
    }
}

#[async_trait]
impl Scanner for ConnectScanner {
    async fn start(&mut self) -> Result<(), ScanError> {
        let (job_tx, job_rx) = mpsc::channel::<PortJob>(self.workers);
        let job_rx = Arc::new(Mutex::new(job_rx));

        for _ in 0..self.workers {
            let job_rx = Arc::clone(&job_rx);
            let limit = self.timeout;
            tokio::spawn(async move {
                loop {
                    let job = job_rx.lock().await.recv().await;
                    let Some(job) = job else { break };
                    if job.cancel.is_cancelled() {
                        continue;
                    }
                    match Self::probe(job.ip, job.port, limit).await {
                        PortState::Open => {
                            let _ = job.outcome.open.send(job.port);
                        }
                        PortState::Closed => {
                            let _ = job.outcome.closed.send(job.port);
                        }
                        PortState::Filtered => {
                            let _ = job.outcome.filtered.send(job.port);
                        }
                        PortState::Unknown => {}
                    }
                }
            });
        }

        self.job_tx = Some(job_tx);
        Ok(())
    }

    async fn scan(
        &mut self,
        cancel: CancellationToken,
        ports: &[u16],
    ) -> Result<Vec<ScanResult>, ScanError> {
        let job_tx = self.job_tx.clone().ok_or(ScanError::NotStarted)?;

        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let mut hosts = JoinSet::new();

        while let Some(ip) = self.ti.next()? {
            if cancel.is_cancelled() {
                break;
            }
            let job_tx = job_tx.clone();
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            let ports = ports.to_vec();
            hosts.spawn(scan_host(job_tx, ip, ports, cancel, result_tx));
        }
        drop(result_tx);

        let mut results = Vec::new();
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }
        while hosts.join_next().await.is_some() {}

        self.stop();
        Ok(results)
    }

    fn stop(&mut self) {
        // Dropping the sender closes the job channel and winds the pool down.
        self.job_tx = None;
    }
}

async fn scan_host(
    job_tx: mpsc::Sender<PortJob>,
    ip: Ipv4Addr,
    ports: Vec<u16>,
    cancel: CancellationToken,
    result_tx: mpsc::UnboundedSender<ScanResult>,
) {
    let (outcome, aggregator) = spawn_aggregator(ip, Instant::now());

    for port in ports {
        let job = PortJob {
            ip,
            port,
            outcome: outcome.clone(),
            cancel: cancel.clone(),
        };
        tokio::select! {
            sent = job_tx.send(job) => {
                if sent.is_err() {
                    break;
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
    drop(outcome);

    if let Ok(result) = aggregator.await {
        let _ = result_tx.send(result);
    }
}
