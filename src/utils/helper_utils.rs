use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderMap;

/// Returns the value of `key` or `fallback` if the variable is unset or empty.
pub fn get_env(key: &str, fallback: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => fallback.to_string(),
    }
}

/// Returns the parsed value of `key`, falling back on missing or unparsable
/// input.
pub fn get_env_parse<T: FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

/// Best-effort client IP: the first entry of `X-Forwarded-For` when present,
/// otherwise the peer address of the connection.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    peer.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_fallbacks() {
        assert_eq!(get_env("COMPILER_GATEWAY_UNSET_VAR", "x"), "x");
        assert_eq!(get_env_parse("COMPILER_GATEWAY_UNSET_VAR", 7u16), 7);
    }

    #[test]
    fn forwarded_header_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.2.3, 172.16.0.1".parse().unwrap());
        let peer: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(client_ip(&headers, peer), "10.1.2.3");
    }

    #[test]
    fn peer_address_when_no_header() {
        let peer: SocketAddr = "192.168.1.5:9000".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), peer), "192.168.1.5");
    }
}
