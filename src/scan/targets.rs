use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use ipnet::Ipv4Net;

use super::ScanError;

/// Lazily yields the IPv4 addresses described by one target spec: a literal
/// address, a resolvable hostname, or a CIDR block. CIDR enumeration covers
/// the whole block, network and broadcast addresses included.
pub struct TargetIterator {
    target: String,
    net: Option<Ipv4Net>,
    cursor: Option<Ipv4Addr>,
    yielded: bool,
    resolved: Option<Ipv4Addr>,
}

impl TargetIterator {
    pub fn new(target: &str) -> Self {
        let net = Ipv4Net::from_str(target).ok();
        Self {
            target: target.to_string(),
            cursor: net.map(|n| n.network()),
            net,
            yielded: false,
            resolved: None,
        }
    }

    /// Yields the next address, or `None` once the target is exhausted.
    pub fn next(&mut self) -> Result<Option<Ipv4Addr>, ScanError> {
        match self.net {
            Some(_) => {
                let ip = self.current();
                if ip.is_some() {
                    self.advance();
                }
                Ok(ip)
            }
            None => {
                if self.yielded {
                    return Ok(None);
                }
                self.yielded = true;
                self.resolve().map(Some)
            }
        }
    }

    /// Returns what `next` would yield, without advancing.
    pub fn peek(&mut self) -> Result<Option<Ipv4Addr>, ScanError> {
        match self.net {
            Some(_) => Ok(self.current()),
            None if self.yielded => Ok(None),
            None => self.resolve().map(Some),
        }
    }

    fn current(&self) -> Option<Ipv4Addr> {
        let net = self.net?;
        self.cursor.filter(|ip| net.contains(ip))
    }

    fn advance(&mut self) {
        self.cursor = self
            .cursor
            .and_then(|ip| u32::from(ip).checked_add(1))
            .map(Ipv4Addr::from);
    }

    fn resolve(&mut self) -> Result<Ipv4Addr, ScanError> {
        if let Some(ip) = self.resolved {
            return Ok(ip);
        }
        if let Ok(ip) = self.target.parse::<Ipv4Addr>() {
            self.resolved = Some(ip);
            return Ok(ip);
        }
        let addrs = dns_lookup::lookup_host(&self.target)
            .map_err(|_| ScanError::LookupFailed(self.target.clone()))?;
        let ip = addrs
            .into_iter()
            .find_map(|addr| match addr {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| ScanError::LookupFailed(self.target.clone()))?;
        self.resolved = Some(ip);
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_a_full_slash24() {
        let mut ti = TargetIterator::new("192.168.1.1/24");

        let ip = ti.peek().unwrap().unwrap();
        assert_eq!(ip.to_string(), "192.168.1.0");

        for i in 0..256 {
            let expected = format!("192.168.1.{i}");
            let peeked = ti.peek().unwrap().unwrap();
            assert_eq!(peeked.to_string(), expected);

            let ip = ti.next().unwrap().unwrap();
            assert_eq!(ip.to_string(), expected);
        }

        assert!(ti.next().unwrap().is_none());
        assert!(ti.peek().unwrap().is_none());
    }

    #[test]
    fn cidr_addresses_are_distinct_and_increasing() {
        let mut ti = TargetIterator::new("10.0.0.0/28");
        let mut previous: Option<u32> = None;
        let mut count = 0;
        while let Some(ip) = ti.next().unwrap() {
            let raw = u32::from(ip);
            if let Some(prev) = previous {
                assert!(raw > prev);
            }
            previous = Some(raw);
            count += 1;
        }
        assert_eq!(count, 16);
    }

    #[test]
    fn single_address_yields_once() {
        let mut ti = TargetIterator::new("10.1.2.3");
        assert_eq!(ti.next().unwrap(), Some(Ipv4Addr::new(10, 1, 2, 3)));
        assert!(ti.next().unwrap().is_none());
    }

    #[test]
    fn peek_does_not_advance() {
        let mut ti = TargetIterator::new("10.1.2.3");
        let a = ti.peek().unwrap();
        let b = ti.peek().unwrap();
        assert_eq!(a, b);
        assert_eq!(ti.next().unwrap(), a);
        assert!(ti.peek().unwrap().is_none());
    }

    #[test]
    fn hostname_yields_one_address() {
        let mut ti = TargetIterator::new("localhost");
        let ip = ti.next().unwrap().unwrap();
        assert_eq!(ip, Ipv4Addr::LOCALHOST);
        assert!(ti.next().unwrap().is_none());
    }

    #[test]
    fn unresolvable_target_errors() {
        let mut ti = TargetIterator::new("no-such-host.invalid");
        assert!(ti.next().is_err());
    }
}
