use std::net::Ipv4Addr;

use super::*;

#[test]
fn lan_address_is_used_when_known() {
    assert_eq!(audience_url(Some(Ipv4Addr::new(192, 168, 1, 20)), 3000), "http://192.168.1.20:3000");
}

#[test]
fn falls_back_to_localhost() {
    assert_eq!(audience_url(None, 8080), "http://localhost:8080");
}

#[test]
fn discovered_address_is_never_loopback() {
    if let Some(ip) = lan_ipv4() {
        assert!(!ip.is_loopback());
        assert!(!ip.is_unspecified());
    }
}
