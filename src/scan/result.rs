use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::ser::Serializer;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::services::describe_port;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Unknown,
    Open,
    Closed,
    Filtered,
}

/// Everything learned about one host during a scan. Ports appear in the
/// order their replies arrived, at most once per list.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub host: Ipv4Addr,
    #[serde(rename = "latency_ns", serialize_with = "latency_ns")]
    pub latency: Option<Duration>,
    pub open: Vec<u16>,
    pub closed: Vec<u16>,
    pub filtered: Vec<u16>,
    pub mac: Option<String>,
    pub manufacturer: Option<String>,
    pub name: Option<String>,
}

fn latency_ns<S: Serializer>(latency: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
    match latency {
        Some(d) => ser.serialize_i64(d.as_nanos() as i64),
        None => ser.serialize_i64(-1),
    }
}

impl ScanResult {
    pub fn new(host: Ipv4Addr) -> Self {
        Self {
            host,
            latency: None,
            open: Vec::new(),
            closed: Vec::new(),
            filtered: Vec::new(),
            mac: None,
            manufacturer: None,
            name: None,
        }
    }

    /// A host is up when at least one probe saw any reply at all.
    pub fn is_up(&self) -> bool {
        self.latency.is_some()
    }
}

pub(crate) fn pad(input: &str, width: usize) -> String {
    let mut out = input.to_string();
    while out.len() < width {
        out.push(' ');
    }
    out
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scan results for host {}", self.host)?;

        match self.latency {
            Some(latency) => writeln!(f, "\tHost is up with {latency:?} latency")?,
            None => writeln!(f, "\tHost is down")?,
        }

        if !self.open.is_empty() {
            writeln!(f, "\t{}\t{}\t{}", pad("PORT", 10), pad("STATE", 10), "SERVICE")?;
        }
        for &port in &self.open {
            writeln!(
                f,
                "\t{}\t{}\t{}",
                pad(&format!("{port}/tcp"), 10),
                pad("OPEN", 10),
                describe_port(port),
            )?;
        }

        Ok(())
    }
}

/// Clonable bundle of the three per-host outcome channels. Workers send a
/// port number on the channel matching its observed state; dropping every
/// clone is what tells the aggregator that host is finished.
#[derive(Clone)]
pub(crate) struct OutcomeSender {
    pub open: mpsc::UnboundedSender<u16>,
    pub closed: mpsc::UnboundedSender<u16>,
    pub filtered: mpsc::UnboundedSender<u16>,
}

/// Spawns the per-host aggregator: it drains the three outcome channels,
/// stamps first-reply latency relative to `started`, ignores duplicate
/// ports, and resolves to the finished record once all senders are gone.
pub(crate) fn spawn_aggregator(
    host: Ipv4Addr,
    started: Instant,
) -> (OutcomeSender, JoinHandle<ScanResult>) {
    let (open_tx, mut open_rx) = mpsc::unbounded_channel();
    let (closed_tx, mut closed_rx) = mpsc::unbounded_channel();
    let (filtered_tx, mut filtered_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut result = ScanResult::new(host);
        let (mut open_done, mut closed_done, mut filtered_done) = (false, false, false);

        loop {
            tokio::select! {
                port = open_rx.recv(), if !open_done => match port {
                    Some(port) => record(&mut result, started, port, PortState::Open),
                    None => open_done = true,
                },
                port = closed_rx.recv(), if !closed_done => match port {
                    Some(port) => record(&mut result, started, port, PortState::Closed),
                    None => closed_done = true,
                },
                port = filtered_rx.recv(), if !filtered_done => match port {
                    Some(port) => record(&mut result, started, port, PortState::Filtered),
                    None => filtered_done = true,
                },
                else => break,
            }
        }

        result
    });

    (
        OutcomeSender {
            open: open_tx,
            closed: closed_tx,
            filtered: filtered_tx,
        },
        handle,
    )
}

fn record(result: &mut ScanResult, started: Instant, port: u16, state: PortState) {
    if state == PortState::Unknown {
        return;
    }
    // A port settles into exactly one list; later conflicting or duplicate
    // replies are dropped.
    let seen = result.open.contains(&port)
        || result.closed.contains(&port)
        || result.filtered.contains(&port);
    if !seen {
        match state {
            PortState::Open => result.open.push(port),
            PortState::Closed => result.closed.push(port),
            PortState::Filtered => result.filtered.push(port),
            PortState::Unknown => {}
        }
    }
    if result.latency.is_none() {
        result.latency = Some(started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn aggregator_collects_and_deduplicates() {
        let host = Ipv4Addr::new(10, 0, 0, 1);
        let (outcome, handle) = spawn_aggregator(host, Instant::now());

        outcome.open.send(80).unwrap();
        outcome.open.send(80).unwrap();
        outcome.closed.send(81).unwrap();
        outcome.filtered.send(82).unwrap();
        drop(outcome);

        let result = handle.await.unwrap();
        assert_eq!(result.open, vec![80]);
        assert_eq!(result.closed, vec![81]);
        assert_eq!(result.filtered, vec![82]);
        assert!(result.is_up());
    }

    #[tokio::test]
    async fn silent_host_stays_down() {
        let host = Ipv4Addr::new(10, 0, 0, 2);
        let (outcome, handle) = spawn_aggregator(host, Instant::now());
        drop(outcome);

        let result = handle.await.unwrap();
        assert!(!result.is_up());
        assert!(result.latency.is_none());
        assert!(result.open.is_empty());
    }

    #[tokio::test]
    async fn port_lists_are_disjoint() {
        let host = Ipv4Addr::new(10, 0, 0, 3);
        let (outcome, handle) = spawn_aggregator(host, Instant::now());
        outcome.open.send(22).unwrap();
        outcome.closed.send(23).unwrap();
        outcome.closed.send(22).unwrap();
        drop(outcome);

        let result = handle.await.unwrap();
        for port in &result.open {
            assert!(!result.closed.contains(port));
            assert!(!result.filtered.contains(port));
        }
    }

    #[test]
    fn json_uses_latency_sentinel() {
        let mut result = ScanResult::new(Ipv4Addr::new(192, 168, 0, 5));
        result.open = vec![22, 80];
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["host"], "192.168.0.5");
        assert_eq!(value["latency_ns"], -1);
        assert_eq!(value["open"][0], 22);
        assert!(value["mac"].is_null());

        result.latency = Some(Duration::from_millis(3));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["latency_ns"], 3_000_000);
    }

    #[test]
    fn renders_down_host() {
        let result = ScanResult::new(Ipv4Addr::new(10, 9, 8, 7));
        let text = result.to_string();
        assert!(text.starts_with("Scan results for host 10.9.8.7"));
        assert!(text.contains("Host is down"));
        assert!(!text.contains("PORT"));
    }

    #[test]
    fn renders_open_ports_table() {
        let mut result = ScanResult::new(Ipv4Addr::new(10, 9, 8, 7));
        result.latency = Some(Duration::from_millis(12));
        result.open = vec![22];
        let text = result.to_string();
        assert!(text.contains("Host is up"));
        assert!(text.contains("22/tcp"));
        assert!(text.contains("OPEN"));
        assert!(text.contains("ssh"));
    }
}
