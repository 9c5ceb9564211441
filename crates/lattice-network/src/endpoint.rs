//! Endpoint parsing, filtering and hashing utilities.
//!
//! Every peer address is stored as a v4-mapped IPv6 socket address so a
//! single hash function and a single comparison cover both families.

use crate::{NetworkError, NetworkResult};
use std::hash::Hasher;
use std::net::{IpAddr, Ipv6Addr, SocketAddr, SocketAddrV6};
use std::time::{SystemTime, UNIX_EPOCH};
use twox_hash::XxHash64;

/// A UDP peer address, normalized to IPv6.
pub type Endpoint = SocketAddrV6;

/// A TCP bootstrap address, normalized to IPv6.
pub type TcpEndpoint = SocketAddrV6;

/// Normalize any socket address to v4-mapped IPv6.
pub fn map_to_v6(addr: SocketAddr) -> SocketAddrV6 {
    match addr {
        SocketAddr::V4(v4) => SocketAddrV6::new(v4.ip().to_ipv6_mapped(), v4.port(), 0, 0),
        SocketAddr::V6(v6) => v6,
    }
}

/// Parse a decimal port in 0..=65535.
pub fn parse_port(text: &str) -> NetworkResult<u16> {
    text.parse::<u16>()
        .map_err(|_| NetworkError::InvalidPort(text.to_string()))
}

/// Parse `"<addr>:<port>"`; IPv6 addresses use the bracketed form
/// `"[<v6>]:<port>"`.
pub fn parse_address_port(text: &str) -> NetworkResult<(IpAddr, u16)> {
    let addr: SocketAddr = text
        .parse()
        .map_err(|_| NetworkError::InvalidEndpoint(text.to_string()))?;
    Ok((addr.ip(), addr.port()))
}

/// Parse a UDP endpoint, normalized to IPv6.
pub fn parse_endpoint(text: &str) -> NetworkResult<Endpoint> {
    let addr: SocketAddr = text
        .parse()
        .map_err(|_| NetworkError::InvalidEndpoint(text.to_string()))?;
    Ok(map_to_v6(addr))
}

/// Parse a TCP endpoint, normalized to IPv6. Same grammar as
/// [`parse_endpoint`]; the distinct name keeps call sites honest about
/// which transport the address feeds.
pub fn parse_tcp_endpoint(text: &str) -> NetworkResult<TcpEndpoint> {
    parse_endpoint(text)
}

/// Whether an endpoint sits in a range that could not be routed back:
/// RFC-reserved, multicast, unspecified and documentation space, plus
/// loopback unless `allow_loopback`. Keepalive peer entries matching
/// this filter are dropped instead of redistributed.
pub fn reserved_address(endpoint: &Endpoint, allow_loopback: bool) -> bool {
    let ip = *endpoint.ip();
    if let Some(v4) = ip.to_ipv4_mapped() {
        let octets = v4.octets();
        octets[0] == 0
            || (!allow_loopback && v4.is_loopback())
            || v4.is_link_local()
            || v4.is_documentation()
            || (octets[0] == 198 && (octets[1] & 0xfe) == 18)
            || v4.is_multicast()
            || octets[0] >= 240
    } else {
        ip.is_unspecified()
            || (!allow_loopback && ip.is_loopback())
            || ip.is_multicast()
            || is_v6_documentation(&ip)
    }
}

// 2001:db8::/32, RFC 3849.
fn is_v6_documentation(ip: &Ipv6Addr) -> bool {
    let segments = ip.segments();
    segments[0] == 0x2001 && segments[1] == 0xdb8
}

/// 64-bit endpoint hash: XXH64 (seed 0) over the 16 address bytes and
/// the port. Deterministic within a process; never a wire artifact, so
/// stability across versions is not promised.
pub fn endpoint_hash_raw(endpoint: &Endpoint) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&endpoint.ip().octets());
    hasher.write(&endpoint.port().to_le_bytes());
    hasher.finish()
}

/// Address-only companion of [`endpoint_hash_raw`].
pub fn ip_address_hash_raw(ip: &Ipv6Addr) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&ip.octets());
    hasher.finish()
}

/// [`endpoint_hash_raw`] folded to the platform word.
pub fn endpoint_hash(endpoint: &Endpoint) -> usize {
    let hash = endpoint_hash_raw(endpoint);
    if cfg!(target_pointer_width = "64") {
        hash as usize
    } else {
        ((hash as u32) ^ ((hash >> 32) as u32)) as usize
    }
}

/// Seconds since the unix epoch, wall clock.
pub fn seconds_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
