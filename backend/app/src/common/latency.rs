use std::{fmt::Display, time::Duration};

use tower_http::trace::OnResponse;

/// Logs status and latency once a response is produced.
#[derive(Clone)]
pub struct LatencyResponse;

impl<T> OnResponse<T> for LatencyResponse {
    fn on_response(self, response: &axum::http::Response<T>, latency: Duration, _: &tracing::Span) {
        let status = response.status();

        if status.is_server_error() {
            tracing::warn!(latency = %Latency(latency), status = %status, "request failed");
        } else {
            tracing::info!(latency = %Latency(latency), status = %status, "finished processing request");
        }
    }
}

struct Latency(Duration);

impl Display for Latency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.as_millis() > 0 {
            write!(f, "{} ms", self.0.as_millis())
        } else {
            write!(f, "{} µs", self.0.as_micros())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_switches_units_below_a_millisecond() {
        assert_eq!(Latency(Duration::from_micros(250)).to_string(), "250 µs");
        assert_eq!(Latency(Duration::from_millis(12)).to_string(), "12 ms");
    }
}
