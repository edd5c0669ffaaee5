use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::time::{Duration, Instant};

use pcap::{Active, Capture};
use pnet::datalink::MacAddr;
use pnet_packet::{
    arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket},
    ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket},
    ip::IpNextHeaderProtocols,
    ipv4::{checksum as ipv4_checksum, MutableIpv4Packet},
    tcp::{ipv4_checksum as tcp_ipv4_checksum, MutableTcpPacket, TcpFlags},
    Packet,
};
use rand::{thread_rng, Rng};

use super::ScanError;

const ETHERNET_HEADER_LEN: usize = 14;
const ARP_PACKET_LEN: usize = 28;
const IPV4_HEADER_LEN: usize = 20;
const TCP_HEADER_LEN: usize = 20;

/// Read timeout on live handles; doubles as the poll granularity for
/// deadline and stop-flag checks in capture loops.
pub(crate) const POLL_TIMEOUT_MS: i32 = 100;

pub(crate) fn open_capture(iface: &str) -> Result<Capture<Active>, pcap::Error> {
    Capture::from_device(iface)?
        .promisc(true)
        .snaplen(65535)
        .timeout(POLL_TIMEOUT_MS)
        .immediate_mode(true)
        .open()
}

/// Grabs a free TCP port on `src_ip` by binding port zero and reading back
/// the kernel's pick. Used as the probe source port and reply demultiplexer.
pub(crate) fn free_port(src_ip: Ipv4Addr) -> std::io::Result<u16> {
    let listener = TcpListener::bind(SocketAddrV4::new(src_ip, 0))?;
    Ok(listener.local_addr()?.port())
}

fn build_arp_request(src_mac: MacAddr, src_ip: Ipv4Addr, target: Ipv4Addr) -> Vec<u8> {
    let mut arp_buf = [0u8; ARP_PACKET_LEN];
    {
        let mut arp = MutableArpPacket::new(&mut arp_buf[..]).unwrap();
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(ArpOperations::Request);
        arp.set_sender_hw_addr(src_mac);
        arp.set_sender_proto_addr(src_ip);
        arp.set_target_hw_addr(MacAddr::zero());
        arp.set_target_proto_addr(target);
    }

    let mut eth_buf = [0u8; ETHERNET_HEADER_LEN];
    {
        let mut eth = MutableEthernetPacket::new(&mut eth_buf[..]).unwrap();
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }

    let mut frame = Vec::with_capacity(ETHERNET_HEADER_LEN + ARP_PACKET_LEN);
    frame.extend_from_slice(&eth_buf);
    frame.extend_from_slice(&arp_buf);
    frame
}

/// One Ethernet/IPv4/TCP SYN probe. Checksums and length fields are filled
/// in here; the sequence number is fresh per frame.
pub(crate) fn build_syn_frame(
    src_mac: MacAddr,
    dst_mac: MacAddr,
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
) -> Vec<u8> {
    let mut tcp_buf = [0u8; TCP_HEADER_LEN];
    {
        let mut tcp = MutableTcpPacket::new(&mut tcp_buf[..]).unwrap();
        tcp.set_source(src_port);
        tcp.set_destination(dst_port);
        tcp.set_sequence(thread_rng().gen());
        tcp.set_data_offset(5);
        tcp.set_flags(TcpFlags::SYN);
        tcp.set_window(64240);
        let csum = tcp_ipv4_checksum(&tcp.to_immutable(), &src_ip, &dst_ip);
        tcp.set_checksum(csum);
    }

    let mut ip_buf = [0u8; IPV4_HEADER_LEN];
    {
        let mut ip = MutableIpv4Packet::new(&mut ip_buf[..]).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length((IPV4_HEADER_LEN + TCP_HEADER_LEN) as u16);
        ip.set_ttl(255);
        ip.set_next_level_protocol(IpNextHeaderProtocols::Tcp);
        ip.set_source(src_ip);
        ip.set_destination(dst_ip);
        let csum = ipv4_checksum(&ip.to_immutable());
        ip.set_checksum(csum);
    }

    let mut eth_buf = [0u8; ETHERNET_HEADER_LEN];
    {
        let mut eth = MutableEthernetPacket::new(&mut eth_buf[..]).unwrap();
        eth.set_destination(dst_mac);
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Ipv4);
    }

    let mut frame = Vec::with_capacity(ETHERNET_HEADER_LEN + IPV4_HEADER_LEN + TCP_HEADER_LEN);
    frame.extend_from_slice(&eth_buf);
    frame.extend_from_slice(&ip_buf);
    frame.extend_from_slice(&tcp_buf);
    frame
}

/// Resolves `target` to a MAC by broadcasting a who-has request on `iface`
/// and reading frames until a matching reply arrives or the deadline passes.
/// Blocking; callers run it off the async runtime.
pub(crate) fn arp_probe(
    iface: &str,
    src_mac: MacAddr,
    src_ip: Ipv4Addr,
    target: Ipv4Addr,
    timeout: Duration,
) -> Result<MacAddr, ScanError> {
    let mut cap = open_capture(iface)?;
    cap.sendpacket(build_arp_request(src_mac, src_ip, target))?;

    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() >= deadline {
            return Err(ScanError::ArpTimeout(target));
        }
        let frame = match cap.next_packet() {
            Ok(packet) => packet,
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => return Err(e.into()),
        };
        if let Some(mac) = match_arp_reply(frame.data, target) {
            return Ok(mac);
        }
    }
}

fn match_arp_reply(frame: &[u8], target: Ipv4Addr) -> Option<MacAddr> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() == ArpOperations::Reply && arp.get_sender_proto_addr() == target {
        return Some(arp.get_sender_hw_addr());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet_packet::ipv4::Ipv4Packet;
    use pnet_packet::tcp::TcpPacket;

    #[test]
    fn syn_frame_round_trips() {
        let src_mac = MacAddr::new(0x02, 0, 0, 0, 0, 1);
        let dst_mac = MacAddr::new(0x02, 0, 0, 0, 0, 2);
        let src_ip = Ipv4Addr::new(10, 0, 0, 1);
        let dst_ip = Ipv4Addr::new(10, 0, 0, 2);

        let frame = build_syn_frame(src_mac, dst_mac, src_ip, dst_ip, 54321, 443);
        assert_eq!(frame.len(), 54);

        let eth = EthernetPacket::new(&frame).unwrap();
        assert_eq!(eth.get_source(), src_mac);
        assert_eq!(eth.get_destination(), dst_mac);
        assert_eq!(eth.get_ethertype(), EtherTypes::Ipv4);

        let ip = Ipv4Packet::new(eth.payload()).unwrap();
        assert_eq!(ip.get_version(), 4);
        assert_eq!(ip.get_ttl(), 255);
        assert_eq!(ip.get_total_length(), 40);
        assert_eq!(ip.get_source(), src_ip);
        assert_eq!(ip.get_destination(), dst_ip);
        assert_eq!(ip.get_checksum(), ipv4_checksum(&ip));

        let tcp = TcpPacket::new(ip.payload()).unwrap();
        assert_eq!(tcp.get_source(), 54321);
        assert_eq!(tcp.get_destination(), 443);
        assert_eq!(tcp.get_flags(), TcpFlags::SYN);
    }

    #[test]
    fn arp_request_round_trips() {
        let src_mac = MacAddr::new(0x02, 0, 0, 0, 0, 1);
        let src_ip = Ipv4Addr::new(192, 168, 1, 10);
        let target = Ipv4Addr::new(192, 168, 1, 20);

        let frame = build_arp_request(src_mac, src_ip, target);
        assert_eq!(frame.len(), 42);

        let eth = EthernetPacket::new(&frame).unwrap();
        assert_eq!(eth.get_destination(), MacAddr::broadcast());
        assert_eq!(eth.get_ethertype(), EtherTypes::Arp);

        let arp = ArpPacket::new(eth.payload()).unwrap();
        assert_eq!(arp.get_operation(), ArpOperations::Request);
        assert_eq!(arp.get_sender_hw_addr(), src_mac);
        assert_eq!(arp.get_sender_proto_addr(), src_ip);
        assert_eq!(arp.get_target_hw_addr(), MacAddr::zero());
        assert_eq!(arp.get_target_proto_addr(), target);
    }

    #[test]
    fn reply_matcher_checks_sender_address() {
        let responder = Ipv4Addr::new(192, 168, 1, 20);
        let mac = MacAddr::new(0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f);

        // A reply is a request frame with the operation and addresses flipped.
        let mut frame = build_arp_request(mac, responder, Ipv4Addr::new(192, 168, 1, 10));
        {
            let mut arp = MutableArpPacket::new(&mut frame[ETHERNET_HEADER_LEN..]).unwrap();
            arp.set_operation(ArpOperations::Reply);
        }

        assert_eq!(match_arp_reply(&frame, responder), Some(mac));
        assert_eq!(match_arp_reply(&frame, Ipv4Addr::new(192, 168, 1, 99)), None);
    }

    #[test]
    fn free_port_is_bindable() {
        let port = free_port(Ipv4Addr::LOCALHOST).unwrap();
        assert!(port > 0);
    }
}
