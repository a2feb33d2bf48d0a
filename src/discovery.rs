//! LAN peer discovery collaborator.
//!
//! Probes host/port combinations near the node's own IPv4 address with a
//! short TCP dial. Any mechanism returning reachable `host:port` strings can
//! stand in for this one.

use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

const DIAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Whether anything accepts a TCP connection at `host:port` within the dial
/// timeout.
pub async fn is_found_host(host: &str, port: u16) -> bool {
    let target = format!("{}:{}", host, port);
    matches!(timeout(DIAL_TIMEOUT, TcpStream::connect(&target)).await, Ok(Ok(_)))
}

/// Scans `(last_octet + 0..=ip_range)` across the port range, skipping the
/// node's own address, and returns every endpoint that answered.
pub async fn find_neighbors(
    own_host: &str,
    own_port: u16,
    ip_range: (u8, u8),
    port_range: (u16, u16),
) -> Vec<String> {
    let Ok(base) = own_host.parse::<Ipv4Addr>() else {
        return Vec::new();
    };
    let octets = base.octets();
    let own_address = format!("{}:{}", own_host, own_port);

    let mut neighbors = Vec::new();
    for port in port_range.0..=port_range.1 {
        for offset in ip_range.0..=ip_range.1 {
            let guess_host = Ipv4Addr::new(
                octets[0],
                octets[1],
                octets[2],
                octets[3].wrapping_add(offset),
            )
            .to_string();
            let guess = format!("{}:{}", guess_host, port);
            if guess != own_address && is_found_host(&guess_host, port).await {
                neighbors.push(guess);
            }
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_is_found_host_detects_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(is_found_host("127.0.0.1", port).await);
    }

    #[tokio::test]
    async fn test_find_neighbors_skips_own_address() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Offset 0 at our own port is excluded even though it answers.
        let own = find_neighbors("127.0.0.1", port, (0, 0), (port, port)).await;
        assert!(own.is_empty());

        // From a different own-port the same listener is a neighbor.
        let found = find_neighbors("127.0.0.1", port.wrapping_add(1), (0, 0), (port, port)).await;
        assert_eq!(found, vec![format!("127.0.0.1:{}", port)]);
    }

    #[tokio::test]
    async fn test_non_ipv4_host_yields_nothing() {
        let found = find_neighbors("localhost", 5000, (0, 1), (5000, 5001)).await;
        assert!(found.is_empty());
    }
}
