//! Statsd metrics for the endpoint.
use std::net::UdpSocket;

use cadence::{
    BufferedUdpMetricSink, Counted, Counter, MetricBuilder, MetricResult, NopMetricSink,
    QueuingMetricSink, StatsdClient,
};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::error::ApiError;
use crate::settings::Settings;

/// Every metric the endpoint emits.
#[derive(Debug, Clone, Copy, IntoStaticStr, AsRefStr, Display)]
pub enum MetricName {
    /// A record was written (tagged with `table`)
    #[strum(serialize = "ehr.record.write")]
    RecordWrite,

    /// A record or record list was read (tagged with `table`)
    #[strum(serialize = "ehr.record.read")]
    RecordRead,

    /// A write was rejected for missing fields
    #[strum(serialize = "ehr.record.validation_error")]
    RecordValidationError,

    /// The store failed a request
    #[strum(serialize = "ehr.store.error")]
    StoreError,
}

/// Extension trait for StatsdClient to provide enum-based metric methods
pub trait StatsdClientExt {
    fn incr(&self, metric: MetricName) -> MetricResult<Counter>;

    fn incr_with_tags(&self, metric: MetricName) -> MetricBuilder<'_, '_, Counter>;
}

impl StatsdClientExt for StatsdClient {
    fn incr(&self, metric: MetricName) -> MetricResult<Counter> {
        let metric_tag: &'static str = metric.into();
        self.count(metric_tag, 1)
    }

    fn incr_with_tags(&self, metric: MetricName) -> MetricBuilder<'_, '_, Counter> {
        let metric_tag: &'static str = metric.into();
        self.count_with_tags(metric_tag, 1)
    }
}

/// Create a cadence StatsdClient from the given options
pub fn metrics_from_settings(settings: &Settings) -> Result<StatsdClient, ApiError> {
    let builder = if let Some(statsd_host) = settings.statsd_host.as_ref() {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;

        let host = (statsd_host.as_str(), settings.statsd_port);
        let udp_sink = BufferedUdpMetricSink::from(host, socket)?;
        let sink = QueuingMetricSink::from(udp_sink);
        StatsdClient::builder(settings.statsd_label.as_ref(), sink)
    } else {
        StatsdClient::builder(settings.statsd_label.as_ref(), NopMetricSink)
    };
    Ok(builder
        .with_error_handler(|err| {
            warn!("⚠️ Metric send error:  {:?}", err);
        })
        .build())
}
