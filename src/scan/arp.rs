//! Process-wide view of the kernel ARP table.
//!
//! Readers take a shared lock; a miss (or a stale table) triggers one
//! exclusive refresh from `/proc/net/arp` before the lookup is retried.

use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use pnet::datalink::MacAddr;

const ARP_TABLE_PATH: &str = "/proc/net/arp";
const MAX_TABLE_AGE: Duration = Duration::from_secs(30);

struct CachedTable {
    entries: HashMap<Ipv4Addr, MacAddr>,
    refreshed: Instant,
}

static CACHE: RwLock<Option<CachedTable>> = RwLock::new(None);

/// Looks up the MAC address the kernel has cached for `ip`. Refreshes the
/// snapshot on a miss and retries once.
pub fn search(ip: Ipv4Addr) -> Option<MacAddr> {
    {
        let cache = CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = cache.as_ref() {
            if table.refreshed.elapsed() < MAX_TABLE_AGE {
                if let Some(&mac) = table.entries.get(&ip) {
                    return Some(mac);
                }
            }
        }
    }

    refresh();

    let cache = CACHE.read().unwrap_or_else(|e| e.into_inner());
    cache.as_ref().and_then(|table| table.entries.get(&ip).copied())
}

/// Re-reads the kernel table and swaps the snapshot.
pub fn refresh() {
    let entries = fs::read_to_string(ARP_TABLE_PATH)
        .map(|text| parse_arp_table(&text))
        .unwrap_or_default();
    let mut cache = CACHE.write().unwrap_or_else(|e| e.into_inner());
    *cache = Some(CachedTable {
        entries,
        refreshed: Instant::now(),
    });
}

/// Parses the `/proc/net/arp` format: a header line, then whitespace-split
/// rows of `ip hwtype flags mac mask device`. Incomplete entries carry an
/// all-zero MAC and are skipped.
fn parse_arp_table(text: &str) -> HashMap<Ipv4Addr, MacAddr> {
    let mut entries = HashMap::new();
    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let Ok(ip) = fields[0].parse::<Ipv4Addr>() else {
            continue;
        };
        let Ok(mac) = fields[3].parse::<MacAddr>() else {
            continue;
        };
        if mac == MacAddr::zero() {
            continue;
        }
        entries.insert(ip, mac);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "IP address       HW type     Flags       HW address            Mask     Device\n\
                          192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0\n\
                          192.168.1.77     0x1         0x0         00:00:00:00:00:00     *        eth0\n\
                          192.168.1.9      0x1         0x2         11:22:33:44:55:66     *        wlan0\n";

    #[test]
    fn parses_complete_entries() {
        let table = parse_arp_table(SAMPLE);
        assert_eq!(
            table.get(&Ipv4Addr::new(192, 168, 1, 1)),
            Some(&"aa:bb:cc:dd:ee:ff".parse().unwrap())
        );
        assert_eq!(
            table.get(&Ipv4Addr::new(192, 168, 1, 9)),
            Some(&"11:22:33:44:55:66".parse().unwrap())
        );
    }

    #[test]
    fn skips_incomplete_entries() {
        let table = parse_arp_table(SAMPLE);
        assert!(!table.contains_key(&Ipv4Addr::new(192, 168, 1, 77)));
    }

    #[test]
    fn tolerates_garbage_lines() {
        let table = parse_arp_table("header\nnot an arp line\n\n");
        assert!(table.is_empty());
    }
}
