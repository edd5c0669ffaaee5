pub mod arp;
pub mod connect;
pub mod device;
pub mod net;
pub mod oui;
pub mod ports;
pub mod result;
pub mod route;
pub mod services;
pub mod syn;
pub mod targets;

use std::io;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use result::{PortState, ScanResult};
pub use targets::TargetIterator;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Access Denied: you must be a privileged user to run this type of scan")]
    AccessDenied,
    #[error("Invalid port number: '{0}'")]
    InvalidPortNumber(String),
    #[error("Invalid port selection segment: '{0}'")]
    InvalidPortSegment(String),
    #[error("Invalid port range: {0}-{1}")]
    InvalidPortRange(u16, u16),
    #[error("lookup failed for '{0}'")]
    LookupFailed(String),
    #[error("no route to host {0}")]
    NoRoute(Ipv4Addr),
    #[error("interface '{0}' has no usable address")]
    InterfaceUnusable(String),
    #[error("timed out waiting for an ARP reply from {0}")]
    ArpTimeout(Ipv4Addr),
    #[error("scanner was not started")]
    NotStarted,
    #[error("packet capture error: {0}")]
    Pcap(#[from] pcap::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Common operations every scan mode exposes. The driver only ever talks to
/// a `Box<dyn Scanner>`.
#[async_trait]
pub trait Scanner {
    /// Brings up whatever long-lived machinery the mode needs (worker pools,
    /// job channels). Must be called exactly once, before `scan`.
    async fn start(&mut self) -> Result<(), ScanError>;

    /// Enumerates the configured targets and probes `ports` on each,
    /// returning one record per host. Cancellation stops new probes; work
    /// already in flight may still land in the returned results.
    async fn scan(
        &mut self,
        cancel: CancellationToken,
        ports: &[u16],
    ) -> Result<Vec<ScanResult>, ScanError>;

    /// Releases the scan machinery. Called by `scan` itself once all targets
    /// are drained.
    fn stop(&mut self) {}

    fn output_result(&self, result: &ScanResult) {
        println!("{result}");
    }

    fn output_result_json(&self, result: &ScanResult) {
        if let Ok(line) = serde_json::to_string(result) {
            println!("{line}");
        }
    }
}
