//! Probe outcome classification.
//!
//! Every probe ends in a `ProbeOutcome`. Transport failures are mapped to
//! synthetic status codes so the dashboard can sort and colour all rows the
//! same way: timeout 504, connection 503, certificate 495, anything else 500.

use std::error::Error as StdError;

use reqwest::StatusCode;

use crate::config::MAX_DETAIL_ERROR_LENGTH;
use crate::error_handling::truncate_detail;

/// Status reported for a probe that timed out.
pub const TIMEOUT_STATUS: u16 = 504;
/// Status reported for a connection-level failure.
pub const CONNECTION_ERROR_STATUS: u16 = 503;
/// Status reported for a certificate verification failure.
pub const TLS_ERROR_STATUS: u16 = 495;
/// Status reported for any other failure.
pub const UNEXPECTED_ERROR_STATUS: u16 = 500;

/// How a single probe ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A response was received
    Response(StatusCode),
    /// No response within the request timeout
    Timeout,
    /// DNS, TCP or HTTP-level failure
    ConnectionError(String),
    /// Certificate verification failed
    TlsError(String),
    /// Anything else, such as an unusable URL
    Unexpected(String),
}

/// Status code, details text and whether the result warrants an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Code stored in the check result
    pub status: u16,
    /// Short explanation shown on the dashboard
    pub details: String,
    /// Whether the alert path should fire
    pub alert: bool,
}

/// Statuses considered healthy.
pub fn is_acceptable(status: u16) -> bool {
    matches!(status, 200 | 401)
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

/// Classifies an HTTP status.
pub fn classify_status(status: StatusCode) -> Classification {
    let code = status.as_u16();
    let (details, alert) = match code {
        200 => ("OK".to_string(), false),
        401 => ("Authentication required".to_string(), false),
        403 => ("Access forbidden".to_string(), false),
        404 => ("Not found".to_string(), true),
        405 => ("Method not allowed".to_string(), false),
        429 => ("Too many requests".to_string(), false),
        _ if status.is_success() || status.is_redirection() => (reason(status), false),
        _ => (format!("❌ {}", reason(status)), true),
    };
    Classification {
        status: code,
        details,
        alert,
    }
}

impl ProbeOutcome {
    /// Maps a request error to an outcome.
    pub fn from_error(error: &reqwest::Error) -> Self {
        let message = root_cause_message(error);
        if error.is_timeout() {
            ProbeOutcome::Timeout
        } else if is_certificate_error(error) {
            ProbeOutcome::TlsError(message)
        } else if error.is_builder() {
            ProbeOutcome::Unexpected(message)
        } else if error.is_connect()
            || error.is_request()
            || error.is_redirect()
            || error.is_body()
            || error.is_decode()
        {
            ProbeOutcome::ConnectionError(message)
        } else {
            ProbeOutcome::Unexpected(message)
        }
    }

    /// Status code, details and alert flag for this outcome.
    pub fn classify(&self) -> Classification {
        let failure = |status: u16, details: String| Classification {
            status,
            details,
            alert: false,
        };
        match self {
            ProbeOutcome::Response(status) => classify_status(*status),
            ProbeOutcome::Timeout => failure(TIMEOUT_STATUS, "Timeout".to_string()),
            ProbeOutcome::ConnectionError(message) => failure(
                CONNECTION_ERROR_STATUS,
                format!(
                    "Connection error: {}",
                    truncate_detail(message, MAX_DETAIL_ERROR_LENGTH)
                ),
            ),
            ProbeOutcome::TlsError(message) => failure(
                TLS_ERROR_STATUS,
                format!(
                    "SSL certificate error: {}",
                    truncate_detail(message, MAX_DETAIL_ERROR_LENGTH)
                ),
            ),
            ProbeOutcome::Unexpected(message) => failure(
                UNEXPECTED_ERROR_STATUS,
                format!(
                    "❌ Error: {}",
                    truncate_detail(message, MAX_DETAIL_ERROR_LENGTH)
                ),
            ),
        }
    }
}

/// Innermost error message of the chain, which names the actual cause
/// (`connection refused`, `invalid peer certificate: ...`).
fn root_cause_message(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Whether certificate verification appears anywhere in the error chain.
fn is_certificate_error(error: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if is_rustls_certificate_error(err) {
            return true;
        }
        // `io::Error` hides the wrapped error from `source()`.
        if let Some(inner) = err
            .downcast_ref::<std::io::Error>()
            .and_then(|io| io.get_ref())
        {
            if is_rustls_certificate_error(inner) {
                return true;
            }
        }
        if err.to_string().to_lowercase().contains("certificate") {
            return true;
        }
        current = err.source();
    }
    false
}

fn is_rustls_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    matches!(
        err.downcast_ref::<rustls::Error>(),
        Some(rustls::Error::InvalidCertificate(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_statuses() {
        assert!(is_acceptable(200));
        assert!(is_acceptable(401));
        assert!(!is_acceptable(204));
        assert!(!is_acceptable(404));
    }

    #[test]
    fn test_named_statuses() {
        let cases = [
            (403, "Access forbidden"),
            (404, "Not found"),
            (405, "Method not allowed"),
            (429, "Too many requests"),
        ];
        for (code, expected) in cases {
            let c = classify_status(StatusCode::from_u16(code).unwrap());
            assert_eq!(c.status, code);
            assert_eq!(c.details, expected);
        }
        assert!(classify_status(StatusCode::NOT_FOUND).alert);
        assert!(!classify_status(StatusCode::FORBIDDEN).alert);
    }

    #[test]
    fn test_success_and_redirects_carry_reason() {
        let c = classify_status(StatusCode::NO_CONTENT);
        assert_eq!(c.details, "No Content");
        assert!(!c.alert);
        let c = classify_status(StatusCode::MOVED_PERMANENTLY);
        assert_eq!(c.details, "Moved Permanently");
    }

    #[test]
    fn test_other_errors_are_marked() {
        let c = classify_status(StatusCode::BAD_GATEWAY);
        assert_eq!(c.details, "❌ Bad Gateway");
        assert!(c.alert);
        let c = classify_status(StatusCode::from_u16(599).unwrap());
        assert_eq!(c.details, "❌ 599");
    }

    #[test]
    fn test_transport_outcomes() {
        let c = ProbeOutcome::Timeout.classify();
        assert_eq!(c.status, 504);
        assert!(c.details.contains("Timeout"));

        let c = ProbeOutcome::ConnectionError("x".repeat(120)).classify();
        assert_eq!(c.status, 503);
        assert_eq!(c.details, format!("Connection error: {}", "x".repeat(50)));

        assert_eq!(ProbeOutcome::TlsError("bad".into()).classify().status, 495);
        assert_eq!(ProbeOutcome::Unexpected("bad".into()).classify().status, 500);
    }

    #[test]
    fn test_certificate_error_detection() {
        let rustls_err = rustls::Error::InvalidCertificate(rustls::CertificateError::Expired);
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, rustls_err);
        assert!(is_certificate_error(&io));

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(!is_certificate_error(&refused));
    }
}
