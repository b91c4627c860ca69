//! Event assembly and dispatch
//!
//! One logger instance serves the whole process. `log_access` and
//! `log_create` are invoked from inside a detached task (see the handlers),
//! so the request path never awaits the sink write. Each call makes exactly
//! one write attempt, or zero when bot suppression applies.

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderMap;
use tracing::debug;

use crate::config::{RuntimeEnv, TelemetryConfig};
use crate::models::Link;

use super::codec::{decode, encode_blobs, encode_doubles, EventRecord};
use super::context::RequestContext;
use super::country::location_label;
use super::schema::ColumnSchema;
use super::sink::{AnalyticsSink, DataPoint};

/// Discriminator between a redirect traversal and a link registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Access,
    Create,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Access => "access",
            EventKind::Create => "create",
        }
    }
}

pub struct EventLogger {
    schema: ColumnSchema,
    sink: Arc<dyn AnalyticsSink>,
    config: TelemetryConfig,
}

impl EventLogger {
    pub fn new(sink: Arc<dyn AnalyticsSink>, config: TelemetryConfig) -> Self {
        Self {
            schema: ColumnSchema::new(),
            sink,
            config,
        }
    }

    /// Record a redirect traversal. Suppressed entirely (zero writes) for
    /// bot traffic when `disable_bot_access_logs` is set.
    pub async fn log_access(
        &self,
        headers: &HeaderMap,
        peer_addr: Option<IpAddr>,
        link: &Link,
    ) -> Result<()> {
        let ctx = RequestContext::extract(headers, peer_addr, &self.config);

        if ctx.is_bot && self.config.disable_bot_access_logs {
            debug!(slug = %link.slug, ua = %ctx.user_agent, "bot access, logging suppressed");
            return Ok(());
        }

        self.dispatch(EventKind::Access, link, ctx).await
    }

    /// Record a link registration. Never bot-suppressed: creations are
    /// always worth keeping.
    pub async fn log_create(
        &self,
        headers: &HeaderMap,
        peer_addr: Option<IpAddr>,
        link: &Link,
    ) -> Result<()> {
        let ctx = RequestContext::extract(headers, peer_addr, &self.config);
        self.dispatch(EventKind::Create, link, ctx).await
    }

    async fn dispatch(&self, kind: EventKind, link: &Link, ctx: RequestContext) -> Result<()> {
        let record = assemble(kind, link, &ctx);
        let blobs = encode_blobs(&self.schema, &record);
        let doubles = encode_doubles(&self.schema, &record);

        if self.config.environment == RuntimeEnv::Production {
            return self
                .sink
                .write_data_point(DataPoint {
                    // Partition key only; the link id is not a slot.
                    indexes: vec![link.id.to_string()],
                    blobs,
                    doubles,
                })
                .await;
        }

        // Outside production, trace the record and its round-trip instead of
        // writing. Decoding the freshly encoded row doubles as a manual
        // regression check on the positional layout.
        debug!(?record, "telemetry event");
        debug!(?blobs, ?doubles, "encoded channels");
        let decoded = decode(&self.schema, &blobs, &doubles);
        debug!(?decoded, "decoded round-trip");
        Ok(())
    }
}

fn assemble(kind: EventKind, link: &Link, ctx: &RequestContext) -> EventRecord {
    let country = ctx.props.country.as_deref();

    EventRecord {
        slug: link.slug.clone(),
        url: link.target_url.clone(),
        user_agent: ctx.user_agent.clone(),
        ip: ctx.ip.clone().unwrap_or_default(),
        referer: ctx.referer_host.clone().unwrap_or_default(),
        country: country.unwrap_or_default().to_string(),
        region: location_label(country, ctx.props.region.as_deref()),
        city: location_label(country, ctx.props.city.as_deref()),
        timezone: ctx.props.timezone.clone().unwrap_or_default(),
        language: ctx.language.clone().unwrap_or_default(),
        os: ctx.ua.os.clone().unwrap_or_default(),
        browser: ctx.ua.browser.clone().unwrap_or_default(),
        browser_type: ctx.ua.browser_type.clone().unwrap_or_default(),
        device: ctx.ua.device.clone().unwrap_or_default(),
        device_type: ctx.ua.device_type.clone().unwrap_or_default(),
        colo: ctx.props.colo.clone().unwrap_or_default(),
        event_type: kind.as_str().to_string(),
        latitude: ctx.props.latitude.unwrap_or(0.0),
        longitude: ctx.props.longitude.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> Link {
        Link {
            id: 42,
            slug: "docs".into(),
            target_url: "https://example.com/docs".into(),
            created_at: 0,
            clicks: 0,
        }
    }

    #[test]
    fn test_assemble_access_event() {
        let mut ctx = RequestContext::default();
        ctx.props.country = Some("JP".into());
        ctx.props.region = Some("Tokyo".into());
        ctx.language = Some("ja".into());

        let record = assemble(EventKind::Access, &link(), &ctx);
        assert_eq!(record.slug, "docs");
        assert_eq!(record.event_type, "access");
        assert_eq!(record.country, "JP");
        assert_eq!(record.region, "🇯🇵 Tokyo,Japan");
        assert_eq!(record.city, "🇯🇵 Japan");
        assert_eq!(record.language, "ja");
        assert_eq!(record.ip, "");
    }

    #[test]
    fn test_assemble_create_event_kind() {
        let record = assemble(EventKind::Create, &link(), &RequestContext::default());
        assert_eq!(record.event_type, "create");
    }
}
