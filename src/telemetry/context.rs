//! Request context extraction from headers and connection metadata
//!
//! Everything here is best-effort: a missing or malformed header degrades to
//! `None`, never to an error, so telemetry can never fail a request.

use axum::http::HeaderMap;
use std::net::IpAddr;

use crate::config::TelemetryConfig;

use super::user_agent::{self, UserAgentInfo};

/// Geolocation and bot-management bundle attached by the edge layer.
/// All values arrive as request headers; none are computed locally.
#[derive(Debug, Clone, Default)]
pub struct ConnectionProperties {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Edge location id, taken from the `cf-ray` suffix.
    pub colo: Option<String>,
    /// Edge bot-management verdict.
    pub verified_bot: bool,
}

impl ConnectionProperties {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            country: header_str(headers, "cf-ipcountry"),
            region: header_str(headers, "cf-region"),
            city: header_str(headers, "cf-ipcity"),
            timezone: header_str(headers, "cf-timezone"),
            latitude: header_str(headers, "cf-iplatitude").and_then(|v| v.parse().ok()),
            longitude: header_str(headers, "cf-iplongitude").and_then(|v| v.parse().ok()),
            colo: header_str(headers, "cf-ray")
                .and_then(|ray| ray.rsplit_once('-').map(|(_, colo)| colo.to_string()))
                .filter(|colo| !colo.is_empty()),
            verified_bot: header_str(headers, "cf-verified-bot")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Normalized per-request context, held only while handling one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip: Option<String>,
    pub props: ConnectionProperties,
    pub language: Option<String>,
    pub referer_host: Option<String>,
    pub user_agent: String,
    pub ua: UserAgentInfo,
    pub is_bot: bool,
}

impl RequestContext {
    pub fn extract(
        headers: &HeaderMap,
        peer_addr: Option<IpAddr>,
        config: &TelemetryConfig,
    ) -> Self {
        let props = ConnectionProperties::from_headers(headers);
        let user_agent = header_str(headers, "user-agent").unwrap_or_default();
        let ua = user_agent::classify(&user_agent);
        let is_bot = bot_verdict(&props, &ua);

        Self {
            ip: extract_client_ip(headers, peer_addr, config),
            props,
            language: preferred_language(headers),
            referer_host: referer_host(headers),
            user_agent,
            ua,
            is_bot,
        }
    }
}

/// Client IP fallback chain: edge connecting-IP header, generic real-IP
/// header, then (when proxies are trusted) X-Forwarded-For, then the
/// transport peer address.
fn extract_client_ip(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    config: &TelemetryConfig,
) -> Option<String> {
    if let Some(ip) = header_str(headers, "cf-connecting-ip") {
        return Some(ip);
    }
    if let Some(ip) = header_str(headers, "x-real-ip") {
        return Some(ip);
    }
    if config.trust_forwarded_for {
        if let Some(xff) = header_str(headers, "x-forwarded-for") {
            if let Some(ip) = xff
                .split(',')
                .filter_map(|s| s.trim().parse::<IpAddr>().ok())
                .next()
            {
                return Some(ip.to_string());
            }
        }
    }
    peer_addr.map(|ip| ip.to_string())
}

/// Host component of the Referer header; malformed URLs yield None.
fn referer_host(headers: &HeaderMap) -> Option<String> {
    let referer = header_str(headers, "referer")?;
    url::Url::parse(&referer)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Top entry of the Accept-Language list, ranked by descending q-weight.
fn preferred_language(headers: &HeaderMap) -> Option<String> {
    let raw = header_str(headers, "accept-language")?;

    let mut ranked: Vec<(String, f32)> = raw
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.trim().split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            // No q parameter means full weight; a q that fails to parse
            // makes the whole entry malformed and it is skipped.
            let q = match parts.find_map(|p| p.trim().strip_prefix("q=")) {
                Some(raw) => raw.parse::<f32>().ok()?,
                None => 1.0,
            };
            Some((tag.to_string(), q))
        })
        .collect();

    // Stable sort keeps header order among equal weights.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(tag, _)| tag).next()
}

/// A request is a bot when the edge says so, when the UA classifies into an
/// automated family, or when the matched name looks like a spider.
fn bot_verdict(props: &ConnectionProperties, ua: &UserAgentInfo) -> bool {
    if props.verified_bot {
        return true;
    }
    if matches!(ua.browser_type.as_deref(), Some("crawler") | Some("fetcher")) {
        return true;
    }
    ua.browser
        .as_deref()
        .map(|name| {
            let name = name.to_ascii_lowercase();
            ["bot", "spider", "crawl"]
                .iter()
                .any(|token| name.contains(token))
        })
        .unwrap_or(false)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
