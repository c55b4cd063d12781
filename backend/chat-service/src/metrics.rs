use actix_web::{http::header, HttpResponse};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

struct ChatMetrics {
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    conversations_created_total: IntCounter,
    messages_sent_total: IntCounter,
    notification_failures_total: IntCounterVec,
}

impl ChatMetrics {
    fn register(registry: &Registry) -> prometheus::Result<Self> {
        let http_requests_total = IntCounterVec::new(
            Opts::new(
                "chat_service_http_requests_total",
                "Total HTTP requests handled by chat-service",
            ),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "chat_service_http_request_duration_seconds",
                "HTTP request latencies for chat-service",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method", "path", "status"],
        )?;
        let conversations_created_total = IntCounter::new(
            "chat_service_conversations_created_total",
            "Conversations created through get-or-create",
        )?;
        let messages_sent_total = IntCounter::new(
            "chat_service_messages_sent_total",
            "Messages persisted by chat-service",
        )?;
        let notification_failures_total = IntCounterVec::new(
            Opts::new(
                "chat_service_notification_failures_total",
                "Push notifications that could not be delivered",
            ),
            &["kind"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(conversations_created_total.clone()))?;
        registry.register(Box::new(messages_sent_total.clone()))?;
        registry.register(Box::new(notification_failures_total.clone()))?;

        Ok(Self {
            http_requests_total,
            http_request_duration_seconds,
            conversations_created_total,
            messages_sent_total,
            notification_failures_total,
        })
    }
}

static METRICS: Lazy<Option<ChatMetrics>> =
    Lazy::new(|| match ChatMetrics::register(prometheus::default_registry()) {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            tracing::error!(error = %e, "failed to register chat-service metrics");
            None
        }
    });

pub fn record_http_request(method: &str, path: &str, status: u16, elapsed_secs: f64) {
    if let Some(m) = METRICS.as_ref() {
        let status = status.to_string();
        m.http_requests_total
            .with_label_values(&[method, path, &status])
            .inc();
        m.http_request_duration_seconds
            .with_label_values(&[method, path, &status])
            .observe(elapsed_secs);
    }
}

pub fn record_conversation_created() {
    if let Some(m) = METRICS.as_ref() {
        m.conversations_created_total.inc();
    }
}

pub fn record_message_sent() {
    if let Some(m) = METRICS.as_ref() {
        m.messages_sent_total.inc();
    }
}

/// `kind` is `fanout` or `targeted`.
pub fn record_notification_failure(kind: &str) {
    if let Some(m) = METRICS.as_ref() {
        m.notification_failures_total.with_label_values(&[kind]).inc();
    }
}

pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, encoder.format_type()))
        .body(buffer)
}
