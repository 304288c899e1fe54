use iptools::{address_to_integer, integer_to_address, ipv4, ipv6, Family, IpRange, IpRangeList};
use serde::Deserialize;

#[derive(Deserialize)]
struct Settings {
    internal_ips: IpRangeList,
}

#[test]
fn settings_allow_list() {
    let settings: Settings = serde_json::from_str(
        r#"{
            "internal_ips": [
                "127.0.0.1",
                "192.168/16",
                ["10.0.0.1", "10.0.0.19"],
                "172.16.0.0/255.240.0.0",
                "fe80::/10"
            ]
        }"#,
    )
    .unwrap();
    let allowed = settings.internal_ips;

    assert_eq!(5, allowed.ranges().len());
    assert!(allowed.contains("127.0.0.1"));
    assert!(allowed.contains("192.168.5.5"));
    assert!(allowed.contains("10.0.0.10"));
    assert!(allowed.contains("172.31.255.255"));
    assert!(allowed.contains("fe80::dead:beef"));
    assert!(!allowed.contains("8.8.8.8"));
    assert!(!allowed.contains("10.0.0.20"));
    assert!(!allowed.contains("2001:db8::1"));
}

#[test]
fn bad_settings_fail_fast() {
    let err = serde_json::from_str::<Settings>(r#"{"internal_ips": ["10.0.0.0/33"]}"#)
        .err()
        .unwrap();
    assert!(err.to_string().contains("out of range"), "{}", err);

    assert!(serde_json::from_str::<Settings>(r#"{"internal_ips": [["10.0.0.1"]]}"#).is_err());
    assert!(serde_json::from_str::<Settings>(r#"{"internal_ips": ["256.1.1.1"]}"#).is_err());
}

#[test]
fn list_serializes_back_to_specs() {
    let list = IpRangeList::from_specs(vec!["127.0.0.1", "10/31", "::ffff:0:0/96"]).unwrap();
    let json = serde_json::to_string(&list).unwrap();
    assert_eq!(
        r#"["127.0.0.1",["10.0.0.0","10.0.0.1"],["::ffff:0:0","::ffff:ffff:ffff"]]"#,
        json
    );
    let again: IpRangeList = serde_json::from_str(&json).unwrap();
    assert_eq!(list, again);
}

#[test]
fn single_range_from_json() {
    let r: IpRange = serde_json::from_str(r#""10.0.0.0/30""#).unwrap();
    assert_eq!(
        vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"],
        r.iter().collect::<Vec<_>>()
    );
    let r: IpRange = serde_json::from_str(r#"["10.0.0.3", "10.0.0.0"]"#).unwrap();
    assert_eq!("10.0.0.0-10.0.0.3", r.to_string());
}

#[test]
fn codec_properties() {
    assert_eq!(
        (
            ipv4::ip_to_int("192.168.0.0").unwrap(),
            ipv4::ip_to_int("192.168.255.255").unwrap()
        ),
        ipv4::cidr_to_block("192.168/16").unwrap()
    );
    assert_eq!(
        0xffff_0000_0000 | u128::from(ipv4::ip_to_int("172.16.0.2").unwrap()),
        ipv6::ip_to_int("::ffff:172.16.0.2").unwrap()
    );
    assert_eq!("127.0.0.1", integer_to_address(address_to_integer("127.1").unwrap(), Family::V4).unwrap());
    assert!(!ipv4::validate_ip("256.1.1.1"));
    assert!(!ipv4::validate_cidr("10.0.0.0/33"));
    assert!(!ipv4::validate_netmask("255.0.255.0"));
}

#[test]
fn named_blocks_parse() {
    for block in &[
        ipv4::CURRENT_NETWORK,
        ipv4::PRIVATE_NETWORK_10,
        ipv4::SHARED_ADDRESS_SPACE,
        ipv4::LOOPBACK,
        ipv4::LOCALHOST,
        ipv4::LINK_LOCAL,
        ipv4::PRIVATE_NETWORK_172_16,
        ipv4::IETF_PROTOCOL_RESERVED,
        ipv4::DUAL_STACK_LITE,
        ipv4::TEST_NET_1,
        ipv4::IPV6_TO_IPV4_RELAY,
        ipv4::PRIVATE_NETWORK_192_168,
        ipv4::BENCHMARK_TESTS,
        ipv4::TEST_NET_2,
        ipv4::TEST_NET_3,
        ipv4::MULTICAST,
        ipv4::MULTICAST_LOCAL,
        ipv4::MULTICAST_INTERNETWORK,
        ipv4::RESERVED,
        ipv4::BROADCAST,
        ipv6::UNSPECIFIED_ADDRESS,
        ipv6::LOOPBACK,
        ipv6::IPV4_MAPPED,
        ipv6::DOCUMENTATION_NETWORK,
        ipv6::IPV6_TO_IPV4_NETWORK,
        ipv6::TEREDO_NETWORK,
        ipv6::PRIVATE_NETWORK,
        ipv6::LINK_LOCAL,
        ipv6::MULTICAST,
        ipv6::MULTICAST_LOOPBACK,
        ipv6::MULTICAST_LOCAL,
        ipv6::MULTICAST_SITE,
        ipv6::MULTICAST_ORGANIZATION,
        ipv6::MULTICAST_GLOBAL,
        ipv6::MULTICAST_LOCAL_NODES,
        ipv6::MULTICAST_LOCAL_ROUTERS,
        ipv6::MULTICAST_LOCAL_DHCP,
        ipv6::MULTICAST_SITE_DHCP,
    ] {
        assert!(block.parse::<IpRange>().is_ok(), "{} should parse", block);
    }

    let private = IpRangeList::from_specs(vec![
        ipv4::PRIVATE_NETWORK_10,
        ipv4::PRIVATE_NETWORK_172_16,
        ipv4::PRIVATE_NETWORK_192_168,
    ])
    .unwrap();
    assert!(private.contains("172.20.1.1"));
    assert!(!private.contains("172.32.0.1"));
}
