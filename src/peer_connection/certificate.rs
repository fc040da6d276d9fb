use super::rtc_error::RtcError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Milliseconds since the Unix epoch.
pub type EpochTimeStamp = u64;

pub const SHA256_ALGORITHM: &str = "sha-256";

/// One `a=fingerprint:<algorithm> <value>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtlsFingerprint {
    pub algorithm: String,
    pub value: String,
}

impl fmt::Display for DtlsFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm, self.value)
    }
}

/// A DTLS certificate produced by an external provider.
///
/// The negotiation engine never touches key material; it only needs the
/// fingerprints to advertise in SDP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcCertificate {
    der: Arc<[u8]>,
    expires: EpochTimeStamp,
}

impl RtcCertificate {
    pub fn new(der: impl Into<Arc<[u8]>>, expires: EpochTimeStamp) -> Self {
        Self {
            der: der.into(),
            expires,
        }
    }

    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    #[must_use]
    pub const fn expires(&self) -> EpochTimeStamp {
        self.expires
    }

    /// Fingerprints of the certificate, currently a single SHA-256 entry.
    ///
    /// # Errors
    /// [`RtcError::Certificate`] when the certificate carries no DER data.
    pub fn fingerprints(&self) -> Result<Vec<DtlsFingerprint>, RtcError> {
        if self.der.is_empty() {
            return Err(RtcError::Certificate("certificate has no DER data".into()));
        }
        Ok(vec![DtlsFingerprint {
            algorithm: SHA256_ALGORITHM.to_string(),
            value: sha256_fingerprint(&self.der),
        }])
    }
}

/// SHA-256 of `der` as uppercase hex pairs joined by `:`.
#[must_use]
pub fn sha256_fingerprint(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    let hex: Vec<String> = digest.iter().map(|b| format!("{b:02X}")).collect();
    hex.join(":")
}

/// Shared certificate slot of a peer connection.
///
/// The certificate provider keeps a clone and calls [`publish`](Self::publish)
/// once generation finishes; every task waiting in `create_offer` is woken and
/// re-checks that the list is non-empty.
#[derive(Debug, Clone)]
pub struct CertificatePublisher {
    tx: Arc<watch::Sender<Vec<RtcCertificate>>>,
}

impl CertificatePublisher {
    #[must_use]
    pub fn new(initial: Vec<RtcCertificate>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Appends certificates and wakes all waiters.
    pub fn publish(&self, certificates: impl IntoIterator<Item = RtcCertificate>) {
        self.tx.send_modify(|current| current.extend(certificates));
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.tx.borrow().is_empty()
    }

    #[must_use]
    pub fn certificates(&self) -> Vec<RtcCertificate> {
        self.tx.borrow().clone()
    }

    /// Suspends until at least one certificate is available and returns a snapshot.
    pub(crate) async fn wait_ready(&self) -> Result<Vec<RtcCertificate>, RtcError> {
        let mut rx = self.tx.subscribe();
        let certs = rx
            .wait_for(|certs| !certs.is_empty())
            .await
            .map_err(|_| RtcError::Certificate("certificate channel closed".into()))?;
        Ok(certs.clone())
    }
}

impl Default for CertificatePublisher {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::time::Duration;

    #[test]
    fn sha256_fingerprint_format() {
        // SHA-256("abc")
        assert_eq!(
            sha256_fingerprint(b"abc"),
            "BA:78:16:BF:8F:01:CF:EA:41:41:40:DE:5D:AE:22:23:B0:03:61:A3:96:17:7A:9C:B4:10:FF:61:F2:00:15:AD"
        );
    }

    #[test]
    fn fingerprints_need_der() {
        let cert = RtcCertificate::new(b"abc".to_vec(), 0);
        let fps = cert.fingerprints().unwrap();
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].algorithm, "sha-256");
        assert!(fps[0].to_string().starts_with("sha-256 BA:78:"));

        let empty = RtcCertificate::new(Vec::new(), 0);
        assert!(matches!(empty.fingerprints(), Err(RtcError::Certificate(_))));
    }

    #[tokio::test]
    async fn waiters_wake_on_publish() {
        let publisher = CertificatePublisher::default();
        assert!(!publisher.is_ready());

        let waiter = publisher.clone();
        let task = tokio::spawn(async move { waiter.wait_ready().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        publisher.publish([RtcCertificate::new(b"cert".to_vec(), 1)]);
        let certs = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap()
            .unwrap();
        assert_eq!(certs.len(), 1);
        assert!(publisher.is_ready());
    }

    #[tokio::test]
    async fn ready_immediately_when_seeded() {
        let publisher = CertificatePublisher::new(vec![RtcCertificate::new(b"x".to_vec(), 0)]);
        let certs = publisher.wait_ready().await.unwrap();
        assert_eq!(certs[0].der(), b"x");
    }
}
