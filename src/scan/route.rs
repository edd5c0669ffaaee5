//! Kernel routing-table lookups, answering "which interface, next hop, and
//! source address reach this destination".

use std::fs;
use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

use super::ScanError;

const ROUTE_TABLE_PATH: &str = "/proc/net/route";

const RTF_UP: u32 = 0x1;
const RTF_GATEWAY: u32 = 0x2;

/// The resolved path toward one destination. `gateway` is `None` when the
/// destination is on-link.
pub struct Route {
    pub interface: NetworkInterface,
    pub gateway: Option<Ipv4Addr>,
    pub src_ip: Ipv4Addr,
}

#[derive(Debug, PartialEq)]
struct RouteEntry {
    iface: String,
    dest: u32,
    mask: u32,
    gateway: Option<Ipv4Addr>,
    metric: u32,
}

pub fn lookup(dest: Ipv4Addr) -> Result<Route, ScanError> {
    let text = fs::read_to_string(ROUTE_TABLE_PATH)?;
    let routes = parse_route_table(&text);
    let entry = best_match(&routes, dest).ok_or(ScanError::NoRoute(dest))?;

    let interface = datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == entry.iface)
        .ok_or_else(|| ScanError::InterfaceUnusable(entry.iface.clone()))?;

    let src_ip = interface
        .ips
        .iter()
        .find_map(|ip| match ip {
            IpNetwork::V4(v4) => Some(v4.ip()),
            IpNetwork::V6(_) => None,
        })
        .ok_or_else(|| ScanError::InterfaceUnusable(entry.iface.clone()))?;

    Ok(Route {
        gateway: entry.gateway,
        interface,
        src_ip,
    })
}

/// Parses `/proc/net/route`: a header line, then whitespace-split rows where
/// destination, gateway, and mask are little-endian hex words.
fn parse_route_table(text: &str) -> Vec<RouteEntry> {
    let mut entries = Vec::new();
    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let (Ok(dest), Ok(gateway), Ok(flags), Ok(mask)) = (
            u32::from_str_radix(fields[1], 16),
            u32::from_str_radix(fields[2], 16),
            u32::from_str_radix(fields[3], 16),
            u32::from_str_radix(fields[7], 16),
        ) else {
            continue;
        };
        if flags & RTF_UP == 0 {
            continue;
        }
        let metric = fields[6].parse().unwrap_or(0);
        let gateway = (flags & RTF_GATEWAY != 0 && gateway != 0)
            .then(|| Ipv4Addr::from(gateway.to_le_bytes()));
        entries.push(RouteEntry {
            iface: fields[0].to_string(),
            dest: u32::from(Ipv4Addr::from(dest.to_le_bytes())),
            mask: u32::from(Ipv4Addr::from(mask.to_le_bytes())),
            gateway,
            metric,
        });
    }
    entries
}

/// Longest-prefix match; ties broken by the lower metric.
fn best_match(entries: &[RouteEntry], dest: Ipv4Addr) -> Option<&RouteEntry> {
    let dest = u32::from(dest);
    entries
        .iter()
        .filter(|entry| dest & entry.mask == entry.dest)
        .max_by_key(|entry| (entry.mask.count_ones(), std::cmp::Reverse(entry.metric)))
}
