//! Well-known TCP service names, taken from the IANA service-names registry
//! (tcp rows only, first name kept where the registry repeats a port).

/// Sorted by port number so lookups can binary search.
pub(crate) const SERVICES: &[(u16, &str)] = &[
    (1, "tcpmux"),
    (5, "rje"),
    (7, "echo"),
    (9, "discard"),
    (11, "systat"),
    (13, "daytime"),
    (17, "qotd"),
    (18, "msp"),
    (19, "chargen"),
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (37, "time"),
    (39, "rlp"),
    (42, "nameserver"),
    (43, "nicname"),
    (49, "tacacs"),
    (53, "domain"),
    (67, "bootps"),
    (68, "bootpc"),
    (69, "tftp"),
    (70, "gopher"),
    (79, "finger"),
    (80, "http"),
    (88, "kerberos"),
    (95, "supdup"),
    (101, "hostname"),
    (102, "iso-tsap"),
    (105, "csnet-ns"),
    (107, "rtelnet"),
    (109, "pop2"),
    (110, "pop3"),
    (111, "sunrpc"),
    (113, "auth"),
    (115, "sftp"),
    (117, "uucp-path"),
    (119, "nntp"),
    (123, "ntp"),
    (135, "epmap"),
    (137, "netbios-ns"),
    (138, "netbios-dgm"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (161, "snmp"),
    (162, "snmptrap"),
    (163, "cmip-man"),
    (164, "cmip-agent"),
    (174, "mailq"),
    (177, "xdmcp"),
    (178, "nextstep"),
    (179, "bgp"),
    (194, "irc"),
    (199, "smux"),
    (201, "at-rtmp"),
    (202, "at-nbp"),
    (204, "at-echo"),
    (206, "at-zis"),
    (209, "qmtp"),
    (210, "z39-50"),
    (213, "ipx"),
    (220, "imap3"),
    (245, "link"),
    (347, "fatserv"),
    (369, "rpc2portmap"),
    (370, "codaauth2"),
    (372, "ulistproc"),
    (389, "ldap"),
    (427, "svrloc"),
    (434, "mobileip-agent"),
    (435, "mobilip-mn"),
    (443, "https"),
    (444, "snpp"),
    (445, "microsoft-ds"),
    (464, "kpasswd"),
    (465, "submissions"),
    (468, "photuris"),
    (487, "saft"),
    (488, "gss-http"),
    (496, "pim-rp-disc"),
    (500, "isakmp"),
    (512, "exec"),
    (513, "login"),
    (514, "shell"),
    (515, "printer"),
    (517, "talk"),
    (518, "ntalk"),
    (519, "utime"),
    (520, "efs"),
    (521, "ripng"),
    (525, "timed"),
    (526, "tempo"),
    (530, "courier"),
    (531, "conference"),
    (532, "netnews"),
    (533, "netwall"),
    (538, "gdomap"),
    (540, "uucp"),
    (543, "klogin"),
    (544, "kshell"),
    (546, "dhcpv6-client"),
    (547, "dhcpv6-server"),
    (548, "afpovertcp"),
    (554, "rtsp"),
    (556, "remotefs"),
    (563, "nntps"),
    (565, "whoami"),
    (587, "submission"),
    (610, "npmp-local"),
    (611, "npmp-gui"),
    (612, "hmmp-ind"),
    (631, "ipp"),
    (636, "ldaps"),
    (674, "acap"),
    (694, "ha-cluster"),
    (749, "kerberos-adm"),
    (750, "kerberos-iv"),
    (765, "webster"),
    (767, "phonebook"),
    (873, "rsync"),
    (992, "telnets"),
    (993, "imaps"),
    (994, "ircs"),
    (995, "pop3s"),
    (1025, "blackjack"),
    (1080, "socks"),
    (1093, "proofd"),
    (1094, "rootd"),
    (1099, "rmiregistry"),
    (1194, "openvpn"),
    (1214, "kazaa"),
    (1241, "nessus"),
    (1311, "rxmon"),
    (1352, "lotusnote"),
    (1433, "ms-sql-s"),
    (1434, "ms-sql-m"),
    (1494, "ica"),
    (1512, "wins"),
    (1521, "ncube-lm"),
    (1524, "ingreslock"),
    (1701, "l2tp"),
    (1718, "h323gatedisc"),
    (1719, "h323gatestat"),
    (1720, "h323hostcall"),
    (1723, "pptp"),
    (1755, "ms-streaming"),
    (1812, "radius"),
    (1813, "radius-acct"),
    (1863, "msnp"),
    (1883, "mqtt"),
    (2000, "cisco-sccp"),
    (2049, "nfs"),
    (2102, "zephyr-srv"),
    (2103, "zephyr-clt"),
    (2104, "zephyr-hm"),
    (2375, "docker"),
    (2376, "docker-s"),
    (2379, "etcd-client"),
    (2380, "etcd-server"),
    (2401, "cvspserver"),
    (2483, "ttc"),
    (2484, "ttc-ssl"),
    (2628, "dict"),
    (2809, "corbaloc"),
    (2947, "gpsd"),
    (3128, "ndl-aas"),
    (3260, "iscsi-target"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (3632, "distcc"),
    (3689, "daap"),
    (3690, "svn"),
    (4369, "epmd"),
    (4500, "ipsec-nat-t"),
    (5000, "commplex-main"),
    (5001, "commplex-link"),
    (5060, "sip"),
    (5061, "sips"),
    (5190, "aol"),
    (5222, "xmpp-client"),
    (5269, "xmpp-server"),
    (5280, "xmpp-bosh"),
    (5353, "mdns"),
    (5432, "postgresql"),
    (5555, "personal-agent"),
    (5631, "pcanywheredata"),
    (5666, "nrpe"),
    (5672, "amqp"),
    (5900, "rfb"),
    (5984, "couchdb"),
    (6000, "x11"),
    (6379, "redis"),
    (6443, "sun-sr-https"),
    (6514, "syslog-tls"),
    (6566, "sane-port"),
    (6667, "ircu"),
    (7000, "afs3-fileserver"),
    (7001, "afs3-callback"),
    (7002, "afs3-prserver"),
    (8000, "irdmi"),
    (8008, "http-alt"),
    (8080, "http-alt"),
    (8081, "sunproxyadmin"),
    (8088, "radan-http"),
    (8443, "pcsync-https"),
    (8888, "ddi-tcp-1"),
    (9000, "cslistener"),
    (9090, "websm"),
    (9100, "pdl-datastream"),
    (9200, "wap-wsp"),
    (9300, "vrace"),
    (9418, "git"),
    (9999, "distinct"),
    (10000, "ndmp"),
    (11211, "memcache"),
    (27017, "mongodb"),
    (50000, "ibm-db2"),
];

/// Returns the IANA service name for a TCP port, or an empty string when the
/// port is not in the table.
pub fn describe_port(port: u16) -> &'static str {
    match SERVICES.binary_search_by_key(&port, |entry| entry.0) {
        Ok(idx) => SERVICES[idx].1,
        Err(_) => "",
    }
}
