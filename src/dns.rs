use anyhow::Context;
use dns_lookup::lookup_host;
use std::net::{IpAddr, Ipv4Addr};

/// Resolve `host` to a single IPv4 address.
pub async fn resolve_ipv4(host: &str) -> anyhow::Result<Ipv4Addr> {
    // First try to parse as IP address
    if let Ok(ip) = host.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(addr) => Ok(addr),
            IpAddr::V6(_) => Err(anyhow::anyhow!("IPv6 address {} is not supported", host)),
        };
    }

    let addresses = tokio::task::spawn_blocking({
        let host = host.to_string();
        move || lookup_host(&host)
    })
    .await?
    .with_context(|| format!("DNS lookup failed for {}", host))?;

    let address = addresses.into_iter().find_map(|addr| match addr {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    });

    log::debug!("Resolved {} to {:?}", host, address);
    address.ok_or_else(|| anyhow::anyhow!("No IPv4 addresses found for hostname: {}", host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_address_parsing() {
        let result = resolve_ipv4("8.8.8.8").await;
        assert_eq!(result.unwrap(), Ipv4Addr::new(8, 8, 8, 8));
    }

    #[tokio::test]
    async fn test_ipv6_literal_rejected() {
        let result = resolve_ipv4("::1").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_localhost_resolution() {
        // Depends on the resolver configuration of the host running the tests
        match resolve_ipv4("localhost").await {
            Ok(addr) => assert!(addr.is_loopback()),
            Err(e) => println!("localhost did not resolve to IPv4: {}", e),
        }
    }
}
