//! Rate limiting middleware using token bucket algorithm.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Picks the client IP from the peer socket or, behind a trusted reverse
/// proxy, from `X-Forwarded-For` / `X-Real-IP` / `Forwarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor {
    pub behind_proxy: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }

    /// Client IP for a request already split into headers and peer address.
    /// Falls back to the peer IP when no forwarded header parses.
    pub fn client_ip(&self, headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
        if !self.behind_proxy {
            return peer.ip();
        }

        let mut req = Request::new(());
        *req.headers_mut() = headers.clone();
        req.extensions_mut().insert(ConnectInfo(peer));
        self.extract(&req).unwrap_or_else(|_| peer.ip())
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.behind_proxy {
            SmartIpKeyExtractor.extract(req)
        } else {
            PeerIpKeyExtractor.extract(req)
        }
    }
}

type ClientIpGovernor =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build(per_second: u64, burst_size: u32, behind_proxy: bool) -> ClientIpGovernor {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
            .finish()
            .expect("non-zero rate limit configuration"),
    );

    GovernorLayer::new(governor_conf)
}

/// Rate limiter for authenticated API and dashboard endpoints.
///
/// - **Rate**: 2 requests per second per client IP
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer(behind_proxy: bool) -> ClientIpGovernor {
    build(2, 100, behind_proxy)
}

/// Stricter limiter for credential endpoints (register, login).
///
/// - **Rate**: 1 request per second per client IP
/// - **Burst**: 10 requests
pub fn secure_layer(behind_proxy: bool) -> ClientIpGovernor {
    build(1, 10, behind_proxy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded_headers(ip: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", ip.parse().unwrap());
        headers
    }

    #[test]
    fn test_direct_mode_ignores_forwarded_headers() {
        let peer: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let extractor = ClientIpKeyExtractor::new(false);

        let ip = extractor.client_ip(&forwarded_headers("203.0.113.7"), peer);
        assert_eq!(ip, peer.ip());
    }

    #[test]
    fn test_proxy_mode_reads_forwarded_for() {
        let peer: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let extractor = ClientIpKeyExtractor::new(true);

        let ip = extractor.client_ip(&forwarded_headers("203.0.113.7, 10.0.0.1"), peer);
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_proxy_mode_falls_back_to_peer() {
        let peer: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let extractor = ClientIpKeyExtractor::new(true);

        assert_eq!(extractor.client_ip(&HeaderMap::new(), peer), peer.ip());
        assert_eq!(
            extractor.client_ip(&forwarded_headers("not-an-ip"), peer),
            peer.ip()
        );
    }

    #[test]
    fn test_extract_without_connect_info_fails_in_direct_mode() {
        let req = Request::new(());
        assert!(ClientIpKeyExtractor::new(false).extract(&req).is_err());
    }
}
