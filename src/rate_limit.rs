//! Per-client rate limiting for the `/api` surface, using governor and
//! `tower_governor`.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{extract::ConnectInfo, http::Request};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};

/// Client key: the socket peer. Proxy headers (`X-Forwarded-For`, then
/// `X-Real-IP`) are consulted only when `trust_proxy_headers` is set, since any
/// client can write them. Requests with no usable address share one bucket.
#[derive(Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
        let headers = req.headers();
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers {
            if let Some(ip) = Self::forwarded_ip(req) {
                return Ok(ip);
            }
        }

        if let Some(ConnectInfo(peer)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(peer.ip());
        }

        Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Replenish interval for a budget of `max` requests per `window`.
pub fn replenish_period(window: Duration, max: u32) -> Duration {
    (window / max.max(1)).max(Duration::from_millis(1))
}

/// Create the API limiter.
///
/// This is a token bucket, not a fixed window: a client starts with `max`
/// requests and regains one every `window / max`. The sustained rate is `max`
/// per `window`, but a client that drains a full bucket and keeps sending can
/// get close to `2 * max` through inside its first window.
///
/// # Panics
///
/// Does not panic in practice: the period is clamped to at least one millisecond
/// and the burst to at least one, both of which `GovernorConfigBuilder` accepts.
#[must_use]
pub fn api_rate_limiter(
    window: Duration,
    max: u32,
    key_extractor: ClientIpKeyExtractor,
) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(key_extractor)
        .period(replenish_period(window, max))
        .burst_size(max.max(1))
        .finish()
        .expect("rate limiter config with a positive period and burst is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn default_window_refills_every_nine_seconds() {
        assert_eq!(
            replenish_period(Duration::from_secs(900), 100),
            Duration::from_secs(9)
        );
        assert_eq!(
            replenish_period(Duration::from_secs(1), 1_000_000),
            Duration::from_millis(1)
        );
    }

    fn forwarded_request(forwarded_for: &str) -> Request<Body> {
        let mut req = Request::builder()
            .header("x-forwarded-for", forwarded_for)
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .expect("request");
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 4711))));
        req
    }

    #[test]
    fn socket_peer_is_the_default_key() {
        let extractor = ClientIpKeyExtractor::default();
        for forwarded in ["203.0.113.7", "203.0.113.8, 10.0.0.1"] {
            let key = extractor
                .extract(&forwarded_request(forwarded))
                .expect("key");
            assert_eq!(key, "192.0.2.10".parse::<IpAddr>().expect("ip"));
        }
    }

    #[test]
    fn trusted_proxy_headers_take_precedence() {
        let extractor = ClientIpKeyExtractor {
            trust_proxy_headers: true,
        };
        let key = extractor
            .extract(&forwarded_request("203.0.113.7, 10.0.0.1"))
            .expect("key");
        assert_eq!(key, "203.0.113.7".parse::<IpAddr>().expect("ip"));

        let mut req = forwarded_request("not-an-ip");
        req.headers_mut().remove("x-forwarded-for");
        let key = extractor.extract(&req).expect("key");
        assert_eq!(key, "198.51.100.2".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn missing_address_shares_fallback_bucket() {
        let req = Request::builder().body(Body::empty()).expect("request");
        let key = ClientIpKeyExtractor::default().extract(&req).expect("key");
        assert_eq!(key, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
}
