//! Certificate field extraction.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::models::CertificateInfo;

/// Reads expiry, issuer and subject from a DER-encoded certificate.
///
/// `days_remaining` counts whole days from `now` to `notAfter`, rounded down,
/// so a certificate that expired an hour ago reports `-1`.
pub(crate) fn certificate_info_from_der(der: &[u8], now: DateTime<Utc>) -> Result<CertificateInfo> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)?;
    let tbs_cert = &cert.tbs_certificate;

    let not_after = tbs_cert.validity.not_after.timestamp();
    let expiry_date = DateTime::from_timestamp(not_after, 0)
        .ok_or_else(|| anyhow!("Certificate expiry out of range: {not_after}"))?;

    Ok(CertificateInfo {
        expiry_date,
        days_remaining: whole_days_until(now, expiry_date),
        issuer: tbs_cert.issuer.to_string(),
        subject: tbs_cert.subject.to_string(),
    })
}

fn whole_days_until(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (then - now).num_seconds().div_euclid(86_400)
}
