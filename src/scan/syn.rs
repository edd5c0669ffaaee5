//! Half-open SYN scanning: raw Ethernet/IPv4/TCP probes with a live capture
//! listener classifying the replies.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pcap::{Active, Capture};
use pnet::datalink::MacAddr;
use pnet_packet::{
    ethernet::{EtherTypes, EthernetPacket},
    ip::IpNextHeaderProtocols,
    ipv4::Ipv4Packet,
    tcp::{TcpFlags, TcpPacket},
    Packet,
};
use tokio::sync::{mpsc, Mutex};
use tokio::task;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::result::{spawn_aggregator, OutcomeSender};
use super::targets::TargetIterator;
use super::{arp, net, route, ScanError, ScanResult, Scanner};

/// One whole host handed to a pool worker. SYN scans share a raw interface,
/// so parallelism is across hosts; a worker walks one host's ports serially.
struct HostJob {
    ip: Ipv4Addr,
    ports: Vec<u16>,
    result_tx: mpsc::UnboundedSender<ScanResult>,
    cancel: CancellationToken,
}

pub struct SynScanner {
    timeout: Duration,
    workers: usize,
    ti: TargetIterator,
    job_tx: Option<mpsc::Sender<HostJob>>,
}

impl SynScanner {
    /// Fails at construction when the process cannot open raw handles, so a
    /// misconfigured invocation dies before any packet is sent.
    pub fn new(
        ti: TargetIterator,
        timeout: Duration,
        workers: usize,
    ) -> Result<Self, ScanError> {
        if unsafe { libc::geteuid() } != 0 {
            return Err(ScanError::AccessDenied);
        }
        Ok(Self {
            timeout,
            workers: workers.max(1),
            ti,
            job_tx: None,
        })
    }
}

#[async_trait]
impl Scanner for SynScanner {
    async fn start(&mut self) -> Result<(), ScanError> {
        let (job_tx, job_rx) = mpsc::channel(self.workers);
        let job_rx = Arc::new(Mutex::new(job_rx));

        for _ in 0..self.workers {
            let job_rx = Arc::clone(&job_rx);
            let timeout = self.timeout;
            tokio::spawn(async move {
                loop {
                    let job = job_rx.lock().await.recv().await;
                    let Some(job) = job else { break };
                    let result = match scan_host(&job, timeout).await {
                        Ok(result) => result,
                        Err(e) => {
                            // Route, capture, or ARP trouble skips the host
                            // but never the scan.
                            debug!(host = %job.ip, error = %e, "host skipped");
                            ScanResult::new(job.ip)
                        }
                    };
                    let _ = job.result_tx.send(result);
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

        while let Some(ip) = self.ti.next()? {
            if cancel.is_cancelled() {
                break;
            }
            let job = HostJob {
                ip,
                ports: ports.to_vec(),
                result_tx: result_tx.clone(),
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
        drop(result_tx);

        let mut results = Vec::new();
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }

        self.stop();
        Ok(results)
    }

    fn stop(&mut self) {
        self.job_tx = None;
    }
}

async fn scan_host(job: &HostJob, timeout: Duration) -> Result<ScanResult, ScanError> {
    if job.cancel.is_cancelled() {
        return Ok(ScanResult::new(job.ip));
    }

    let route = route::lookup(job.ip)?;
    let src_mac = route
        .interface
        .mac
        .ok_or_else(|| ScanError::InterfaceUnusable(route.interface.name.clone()))?;
    let iface = route.interface.name;
    let src_ip = route.src_ip;

    let (outcome, aggregator) = spawn_aggregator(job.ip, Instant::now());

    // On-link targets answer ARP themselves; everything else goes through
    // the gateway's MAC.
    let next_hop = route.gateway.unwrap_or(job.ip);
    let dst_mac = resolve_mac(iface.clone(), src_mac, src_ip, next_hop, timeout).await?;

    let src_port = net::free_port(src_ip)?;
    let mut sender = net::open_capture(&iface)?;

    let stop = Arc::new(AtomicBool::new(false));
    let listener = {
        let cap = net::open_capture(&iface)?;
        let stop = Arc::clone(&stop);
        let outcome = outcome.clone();
        let target = job.ip;
        task::spawn_blocking(move || listen(cap, target, src_ip, src_port, stop, outcome))
    };

    for &port in &job.ports {
        let frame = net::build_syn_frame(src_mac, dst_mac, src_ip, job.ip, src_port, port);
        if let Err(e) = sender.sendpacket(frame) {
            debug!(host = %job.ip, port, error = %e, "probe send failed");
        }
    }

    // Leave the listener running for the reply window, then wind it down.
    tokio::select! {
        _ = tokio::time::sleep(timeout) => {}
        _ = job.cancel.cancelled() => {}
    }
    stop.store(true, Ordering::Relaxed);
    let _ = listener.await;
    drop(outcome);

    Ok(aggregator.await.unwrap_or_else(|_| ScanResult::new(job.ip)))
}

/// MAC for the next hop: kernel ARP cache first, then an active broadcast
/// request on the probe interface.
async fn resolve_mac(
    iface: String,
    src_mac: MacAddr,
    src_ip: Ipv4Addr,
    next_hop: Ipv4Addr,
    timeout: Duration,
) -> Result<MacAddr, ScanError> {
    if let Some(mac) = arp::search(next_hop) {
        return Ok(mac);
    }
    match task::spawn_blocking(move || net::arp_probe(&iface, src_mac, src_ip, next_hop, timeout))
        .await
    {
        Ok(resolved) => resolved,
        Err(_) => Err(ScanError::ArpTimeout(next_hop)),
    }
}

fn listen(
    mut cap: Capture<Active>,
    target: Ipv4Addr,
    src_ip: Ipv4Addr,
    src_port: u16,
    stop: Arc<AtomicBool>,
    outcome: OutcomeSender,
) {
    while !stop.load(Ordering::Relaxed) {
        let frame = match cap.next_packet() {
            Ok(packet) => packet,
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => {
                // A bad read loses at most that frame; keep listening.
                debug!(host = %target, error = %e, "packet read error");
                continue;
            }
        };
        classify_reply(frame.data, target, src_ip, src_port, &outcome);
    }
}

/// Frames that are not the reverse of the probe flow, or that target a
/// different local port, are someone else's traffic.
fn classify_reply(
    frame: &[u8],
    target: Ipv4Addr,
    src_ip: Ipv4Addr,
    src_port: u16,
    outcome: &OutcomeSender,
) {
    let Some(eth) = EthernetPacket::new(frame) else {
        return;
    };
    if eth.get_ethertype() != EtherTypes::Ipv4 {
        return;
    }
    let Some(ip) = Ipv4Packet::new(eth.payload()) else {
        return;
    };
    if ip.get_source() != target || ip.get_destination() != src_ip {
        return;
    }
    if ip.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
        return;
    }
    let Some(tcp) = TcpPacket::new(ip.payload()) else {
        return;
    };
    if tcp.get_destination() != src_port {
        return;
    }

    let flags = tcp.get_flags();
    if flags & TcpFlags::SYN != 0 && flags & TcpFlags::ACK != 0 {
        let _ = outcome.open.send(tcp.get_source());
    } else if flags & TcpFlags::RST != 0 {
        let _ = outcome.closed.send(tcp.get_source());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet_packet::tcp::MutableTcpPacket;

    const ETH_IP_HEADERS: usize = 34;

    fn reply_frame(
        target: Ipv4Addr,
        src_ip: Ipv4Addr,
        from_port: u16,
        to_port: u16,
        flags: u8,
    ) -> Vec<u8> {
        let mac_a = MacAddr::new(2, 0, 0, 0, 0, 1);
        let mac_b = MacAddr::new(2, 0, 0, 0, 0, 2);
        let mut frame = net::build_syn_frame(mac_a, mac_b, target, src_ip, from_port, to_port);
        let mut tcp = MutableTcpPacket::new(&mut frame[ETH_IP_HEADERS..]).unwrap();
        tcp.set_flags(flags);
        frame
    }

    #[tokio::test]
    async fn synack_marks_port_open_and_rst_closed() {
        let target = Ipv4Addr::new(10, 0, 0, 9);
        let src_ip = Ipv4Addr::new(10, 0, 0, 1);
        let src_port = 44123;

        let (outcome, handle) = spawn_aggregator(target, Instant::now());

        let synack = reply_frame(target, src_ip, 80, src_port, TcpFlags::SYN | TcpFlags::ACK);
        classify_reply(&synack, target, src_ip, src_port, &outcome);

        let rst = reply_frame(target, src_ip, 81, src_port, TcpFlags::RST | TcpFlags::ACK);
        classify_reply(&rst, target, src_ip, src_port, &outcome);

        drop(outcome);
        let result = handle.await.unwrap();
        assert_eq!(result.open, vec![80]);
        assert_eq!(result.closed, vec![81]);
        assert!(result.is_up());
    }

    #[tokio::test]
    async fn foreign_flows_are_ignored() {
        let target = Ipv4Addr::new(10, 0, 0, 9);
        let src_ip = Ipv4Addr::new(10, 0, 0, 1);
        let src_port = 44123;

        let (outcome, handle) = spawn_aggregator(target, Instant::now());

        // Wrong source host.
        let other_host = reply_frame(
            Ipv4Addr::new(10, 0, 0, 8),
            src_ip,
            80,
            src_port,
            TcpFlags::SYN | TcpFlags::ACK,
        );
        classify_reply(&other_host, target, src_ip, src_port, &outcome);

        // Wrong local port.
        let other_port = reply_frame(target, src_ip, 80, 50000, TcpFlags::SYN | TcpFlags::ACK);
        classify_reply(&other_port, target, src_ip, src_port, &outcome);

        // Plain ACK carries no verdict.
        let plain_ack = reply_frame(target, src_ip, 80, src_port, TcpFlags::ACK);
        classify_reply(&plain_ack, target, src_ip, src_port, &outcome);

        drop(outcome);
        let result = handle.await.unwrap();
        assert!(result.open.is_empty());
        assert!(result.closed.is_empty());
        assert!(!result.is_up());
    }

    #[test]
    fn privilege_gate_matches_effective_uid() {
        let ti = TargetIterator::new("127.0.0.1");
        let scanner = SynScanner::new(ti, Duration::from_secs(1), 1);
        if unsafe { libc::geteuid() } == 0 {
            assert!(scanner.is_ok());
        } else {
            assert!(matches!(scanner, Err(ScanError::AccessDenied)));
        }
    }
}
