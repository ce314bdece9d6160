use std::net::{IpAddr, SocketAddr};

use axum::{extract::ConnectInfo, http::Request};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Rate-limit key: the client address as seen by the outermost trusted proxy.
///
/// Each trusted proxy appends the address it received the request from to
/// `X-Forwarded-For`, so the client is found by walking the header from the
/// right. Entries left of the trusted hops are client-controlled and are
/// never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor {
    pub trusted_proxy_hops: usize,
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)?;

        let forwarded: Vec<IpAddr> = req
            .headers()
            .get_all(X_FORWARDED_FOR)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|entry| entry.trim().parse().ok())
            .collect();

        Ok(client_ip(peer, &forwarded, self.trusted_proxy_hops))
    }
}

/// Skip `trusted_proxy_hops` addresses starting from the peer, then take the
/// next one. Runs out at the leftmost forwarded entry.
pub fn client_ip(peer: IpAddr, forwarded: &[IpAddr], trusted_proxy_hops: usize) -> IpAddr {
    std::iter::once(peer)
        .chain(forwarded.iter().rev().copied())
        .take(trusted_proxy_hops + 1)
        .last()
        .unwrap_or(peer)
}
