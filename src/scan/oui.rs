//! Manufacturer lookup by MAC address prefix.

use pnet::datalink::MacAddr;

/// IEEE OUI assignments for hardware commonly seen on home and office
/// networks. Sorted by prefix for binary search.
const VENDORS: &[([u8; 3], &str)] = &[
    ([0x00, 0x00, 0x0c], "Cisco Systems, Inc"),
    ([0x00, 0x01, 0x42], "Cisco Systems, Inc"),
    ([0x00, 0x03, 0x93], "Apple, Inc."),
    ([0x00, 0x04, 0x0b], "3com Europe Ltd"),
    ([0x00, 0x05, 0x02], "Apple, Inc."),
    ([0x00, 0x0a, 0x27], "Apple, Inc."),
    ([0x00, 0x0a, 0x95], "Apple, Inc."),
    ([0x00, 0x0c, 0x29], "VMware, Inc."),
    ([0x00, 0x0d, 0x3a], "Microsoft Corp."),
    ([0x00, 0x0e, 0x58], "Sonos, Inc."),
    ([0x00, 0x11, 0x32], "Synology Incorporated"),
    ([0x00, 0x12, 0x17], "Cisco-Linksys, LLC"),
    ([0x00, 0x13, 0x10], "Cisco-Linksys, LLC"),
    ([0x00, 0x14, 0x22], "Dell Inc."),
    ([0x00, 0x15, 0x5d], "Microsoft Corporation"),
    ([0x00, 0x16, 0x3e], "Xensource, Inc."),
    ([0x00, 0x17, 0x88], "Philips Lighting BV"),
    ([0x00, 0x18, 0x71], "Hewlett Packard"),
    ([0x00, 0x1a, 0x11], "Google, Inc."),
    ([0x00, 0x1b, 0x21], "Intel Corporate"),
    ([0x00, 0x1b, 0x63], "Apple, Inc."),
    ([0x00, 0x1c, 0x42], "Parallels, Inc."),
    ([0x00, 0x1d, 0x7e], "Cisco-Linksys, LLC"),
    ([0x00, 0x1e, 0x06], "Wibrain"),
    ([0x00, 0x21, 0x6a], "Intel Corporate"),
    ([0x00, 0x22, 0x48], "Microsoft Corporation"),
    ([0x00, 0x23, 0x24], "G-PRO Computer"),
    ([0x00, 0x24, 0xd7], "Intel Corporate"),
    ([0x00, 0x25, 0x00], "Apple, Inc."),
    ([0x00, 0x25, 0x9c], "Cisco-Linksys, LLC"),
    ([0x00, 0x26, 0xbb], "Apple, Inc."),
    ([0x00, 0x50, 0x56], "VMware, Inc."),
    ([0x00, 0x50, 0xf2], "Microsoft Corporation"),
    ([0x00, 0x90, 0x4c], "Epigram, Inc."),
    ([0x00, 0xe0, 0x4c], "Realtek Semiconductor Corp."),
    ([0x08, 0x00, 0x27], "PCS Systemtechnik GmbH"),
    ([0x0c, 0x47, 0xc9], "Amazon Technologies Inc."),
    ([0x10, 0x40, 0xf3], "Apple, Inc."),
    ([0x18, 0xb4, 0x30], "Nest Labs Inc."),
    ([0x1c, 0x1b, 0x0d], "Giga-Byte Technology Co., Ltd."),
    ([0x24, 0x4b, 0xfe], "Asustek Computer Inc."),
    ([0x28, 0x6c, 0x07], "Xiaomi Communications Co Ltd"),
    ([0x2c, 0xf0, 0x5d], "Micro-Star International Co., Ltd"),
    ([0x30, 0x9c, 0x23], "Micro-Star International Co., Ltd"),
    ([0x34, 0x97, 0xf6], "Asustek Computer Inc."),
    ([0x38, 0xf9, 0xd3], "Apple, Inc."),
    ([0x3c, 0x5a, 0xb4], "Google, Inc."),
    ([0x40, 0xb0, 0x76], "Asustek Computer Inc."),
    ([0x44, 0x65, 0x0d], "Amazon Technologies Inc."),
    ([0x48, 0x4d, 0x7e], "Dell Inc."),
    ([0x4c, 0x32, 0x75], "Apple, Inc."),
    ([0x50, 0xc7, 0xbf], "TP-Link Technologies Co., Ltd."),
    ([0x52, 0x54, 0x00], "QEMU virtual NIC"),
    ([0x54, 0x60, 0x09], "Google, Inc."),
    ([0x5c, 0xcf, 0x7f], "Espressif Inc."),
    ([0x60, 0x01, 0x94], "Espressif Inc."),
    ([0x64, 0x16, 0x66], "Nest Labs Inc."),
    ([0x68, 0x54, 0xfd], "Amazon Technologies Inc."),
    ([0x6c, 0x4b, 0x90], "Liteon Technology Corporation"),
    ([0x70, 0x85, 0xc2], "ASRock Incorporation"),
    ([0x74, 0xd4, 0x35], "Giga-Byte Technology Co., Ltd."),
    ([0x78, 0x4f, 0x43], "Apple, Inc."),
    ([0x7c, 0xd3, 0x0a], "Invia"),
    ([0x80, 0x2a, 0xa8], "Ubiquiti Networks Inc."),
    ([0x84, 0xd8, 0x1b], "TP-Link Technologies Co., Ltd."),
    ([0x88, 0xde, 0xa9], "Roku, Inc."),
    ([0x8c, 0x85, 0x90], "Apple, Inc."),
    ([0x90, 0x72, 0x40], "Apple, Inc."),
    ([0x94, 0x10, 0x3e], "Belkin International Inc."),
    ([0x98, 0xda, 0xc4], "TP-Link Technologies Co., Ltd."),
    ([0x9c, 0xb6, 0xd0], "Rivet Networks"),
    ([0xa0, 0x36, 0x9f], "Intel Corporate"),
    ([0xa4, 0x2b, 0xb0], "TP-Link Technologies Co., Ltd."),
    ([0xa8, 0x20, 0x66], "Apple, Inc."),
    ([0xac, 0x84, 0xc6], "TP-Link Technologies Co., Ltd."),
    ([0xb0, 0xbe, 0x76], "TP-Link Technologies Co., Ltd."),
    ([0xb4, 0x2e, 0x99], "Giga-Byte Technology Co., Ltd."),
    ([0xb8, 0x27, 0xeb], "Raspberry Pi Foundation"),
    ([0xbc, 0x5f, 0xf4], "ASRock Incorporation"),
    ([0xc0, 0x25, 0xe9], "TP-Link Technologies Co., Ltd."),
    ([0xc4, 0x2c, 0x03], "Apple, Inc."),
    ([0xc8, 0x60, 0x00], "Asustek Computer Inc."),
    ([0xcc, 0x46, 0xd6], "Cisco Systems, Inc"),
    ([0xd0, 0x50, 0x99], "ASRock Incorporation"),
    ([0xd4, 0x81, 0xd7], "Dell Inc."),
    ([0xd8, 0x3a, 0xdd], "Raspberry Pi Trading Ltd"),
    ([0xdc, 0xa6, 0x32], "Raspberry Pi Trading Ltd"),
    ([0xe0, 0xd5, 0x5e], "Giga-Byte Technology Co., Ltd."),
    ([0xe4, 0x5f, 0x01], "Raspberry Pi Trading Ltd"),
    ([0xe8, 0x40, 0xf2], "Pegatron Corporation"),
    ([0xec, 0x08, 0x6b], "TP-Link Technologies Co., Ltd."),
    ([0xf0, 0x18, 0x98], "Apple, Inc."),
    ([0xf4, 0xf5, 0xd8], "Google, Inc."),
    ([0xf8, 0x75, 0xa4], "LCFC (Hefei) Electronics Technology Co., Ltd"),
    ([0xfc, 0xaa, 0x14], "Giga-Byte Technology Co., Ltd."),
];

/// Looks up the manufacturer for the OUI (first three octets) of a MAC
/// address.
pub fn lookup(mac: MacAddr) -> Option<&'static str> {
    let prefix = [mac.0, mac.1, mac.2];
    VENDORS
        .binary_search_by_key(&prefix, |entry| entry.0)
        .ok()
        .map(|idx| VENDORS[idx].1)
}
