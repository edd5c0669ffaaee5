//! Command-line interface for the brisk scanner.

use clap::{Parser, ValueEnum};

/// Represents the available scan modes.
/// - `Stealth` (aliases `syn`, `fast`): half-open SYN probes; needs privileges.
/// - `Connect`: full TCP handshakes through the OS.
/// - `Device`: ARP-table sweep identifying devices on the local network.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ScanType {
    #[value(alias = "syn", alias = "fast")]
    Stealth,
    Connect,
    Device,
}

/// Command-line arguments. Positional arguments are the scan targets; the
/// flags select the mode and tune timeouts, parallelism, and output shape.
#[derive(Parser, Debug)]
#[command(
    name = "brisk",
    version,
    about = "An IP/port scanner for identifying hosts and services remotely"
)]
pub struct Cli {
    #[arg(help = "Targets to scan: IPv4 address, hostname, or CIDR block")]
    pub targets: Vec<String>,
    #[arg(short = 'u', long = "up-only", help = "Omit output for hosts which are not up")]
    pub up_only: bool,
    #[arg(
        short = 's',
        long = "scan-type",
        value_enum,
        default_value_t = ScanType::Stealth,
        help = "Scan type. Must be one of stealth, connect, device"
    )]
    pub scan_type: ScanType,
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,
    #[arg(short, long, help = "Enable JSON output")]
    pub json: bool,
    #[arg(
        short = 't',
        long = "timeout-ms",
        default_value_t = 2000,
        help = "Scan timeout in MS"
    )]
    pub timeout_ms: u64,
    #[arg(
        short = 'w',
        long,
        default_value_t = 500,
        help = "Parallel routines to scan on"
    )]
    pub workers: usize,
    #[arg(
        short = 'p',
        long,
        help = "Ports to scan. Comma separated, can use hyphens e.g. 22,80,443,8080-8090"
    )]
    pub ports: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_type_aliases_resolve_to_stealth() {
        for flag in ["stealth", "syn", "fast"] {
            let cli = Cli::parse_from(["brisk", "-s", flag, "10.0.0.1"]);
            assert_eq!(cli.scan_type, ScanType::Stealth);
        }
    }

    #[test]
    fn defaults_match_documentation() {
        let cli = Cli::parse_from(["brisk", "10.0.0.1"]);
        assert_eq!(cli.scan_type, ScanType::Stealth);
        assert_eq!(cli.timeout_ms, 2000);
        assert_eq!(cli.workers, 500);
        assert!(cli.ports.is_none());
        assert!(!cli.up_only);
        assert!(!cli.json);
    }
}
