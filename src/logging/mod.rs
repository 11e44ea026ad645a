use reqwest::{Method, StatusCode};
use std::time::Instant;
use tracing::{info, warn};

/// Timing record for one outbound API call
#[derive(Debug)]
pub struct RequestLog {
    method: Method,
    path: String,
    started: Instant,
}

impl RequestLog {
    pub fn start(method: &Method, path: &str) -> Self {
        Self {
            method: method.clone(),
            path: path.to_string(),
            started: Instant::now(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Logs a completed exchange, at warn level for non-2xx statuses
    pub fn finish(self, status: StatusCode) {
        let duration_ms: u128 = self.started.elapsed().as_millis();
        if status.is_success() {
            info!(
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                duration_ms,
                "HTTP request completed"
            );
        } else {
            warn!(
                method = %self.method,
                path = %self.path,
                status = status.as_u16(),
                duration_ms,
                "HTTP request rejected"
            );
        }
    }

    /// Logs a request that never produced a response
    pub fn fail(self, err: &reqwest::Error) {
        let duration_ms: u128 = self.started.elapsed().as_millis();
        warn!(
            method = %self.method,
            path = %self.path,
            duration_ms,
            error = %err,
            "HTTP request failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_request_path() {
        let log = RequestLog::start(&Method::GET, "/customer/get-all");
        assert_eq!(log.path(), "/customer/get-all");
        log.finish(StatusCode::OK);
    }
}
