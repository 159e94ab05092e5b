//! Single-source content fetching with timeout and address guards.
//!
//! Every failure here is a [`FetchError`] — per-source failures are absorbed
//! by the pipeline and must never cross the component boundary.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use sourcebrief_shared::SourceLocation;

/// Why a single source contributed nothing to the condensed answer.
///
/// These never surface to the pipeline caller; they are recorded in the
/// per-source report so tests (and debug logs) can see what was skipped.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source address could not be parsed as a URL.
    #[error("invalid address")]
    InvalidAddress,

    /// The address targets a private/loopback host and was not fetched.
    #[error("blocked address")]
    BlockedAddress,

    /// The fetch exceeded the per-source timeout.
    #[error("timed out")]
    Timeout,

    /// Connection-level request failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The response body could not be read as text.
    #[error("body read failed: {0}")]
    Body(String),

    /// The body parsed but yielded zero text-bearing blocks.
    #[error("no text blocks")]
    NoTextBlocks,
}

/// Fetch one source's raw markup, bounded by `timeout`.
///
/// `allow_localhost` disables the private-address guard (integration tests
/// run against local mock servers).
pub(crate) async fn fetch_source(
    client: &Client,
    location: &SourceLocation,
    timeout: Duration,
    allow_localhost: bool,
) -> Result<String, FetchError> {
    let url = Url::parse(location.as_str()).map_err(|_| FetchError::InvalidAddress)?;

    if !allow_localhost && is_private_target(&url) {
        return Err(FetchError::BlockedAddress);
    }

    debug!(url = %url, "fetching source");

    let response = client
        .get(url.as_str())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Body(e.to_string())
        }
    })
}

// ---------------------------------------------------------------------------
// Private-address guard
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous local resource.
/// Search results are attacker-influenced, so never follow them inward.
pub(crate) fn is_private_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost"
            || host.ends_with(".local")
            || host.ends_with(".internal")
        {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_non_http_schemes() {
        let url = Url::parse("file:///etc/passwd").unwrap();
        assert!(is_private_target(&url));
    }

    #[test]
    fn blocks_private_ips() {
        for bad in [
            "http://192.168.1.1/admin",
            "http://10.0.0.1/",
            "http://127.0.0.1:8080/",
            "http://localhost:3000/api",
        ] {
            let url = Url::parse(bad).unwrap();
            assert!(is_private_target(&url), "{bad} should be blocked");
        }
    }

    #[test]
    fn allows_public_hosts() {
        let url = Url::parse("https://en.wikipedia.org/wiki/Mount_Everest").unwrap();
        assert!(!is_private_target(&url));
    }

    #[tokio::test]
    async fn invalid_address_is_a_fetch_error() {
        let client = Client::new();
        let loc = SourceLocation::new("not a url");
        let result = fetch_source(&client, &loc, Duration::from_secs(1), true).await;
        assert!(matches!(result, Err(FetchError::InvalidAddress)));
    }
}
