// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! TLS trust for calls to the telemetry target
//!
//! Telemetry targets serve a self-signed certificate, so the default is to
//! skip chain and hostname verification. Trust is carried as a value handed to
//! each client rather than set process-wide, so a verifying client and a
//! non-verifying one can coexist.

use std::path::PathBuf;

use crate::error::ClientError;

/// How server certificates are checked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsTrust {
    /// Accept any certificate for any hostname
    #[default]
    AcceptInvalid,
    /// Verify against the platform trust store
    PlatformRoots,
    /// Verify against the platform trust store plus a PEM CA bundle
    CaBundle(PathBuf),
}

impl TlsTrust {
    /// Pick the trust mode from the command-line switches. A CA bundle
    /// implies verification.
    pub fn from_flags(verify: bool, ca_cert: Option<PathBuf>) -> Self {
        match (verify, ca_cert) {
            (_, Some(path)) => TlsTrust::CaBundle(path),
            (true, None) => TlsTrust::PlatformRoots,
            (false, None) => TlsTrust::AcceptInvalid,
        }
    }

    /// Apply this trust mode to a client under construction
    pub fn configure(
        &self,
        builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, ClientError> {
        match self {
            TlsTrust::AcceptInvalid => {
                tracing::debug!("TLS certificate verification disabled");
                Ok(builder.danger_accept_invalid_certs(true))
            }
            TlsTrust::PlatformRoots => Ok(builder),
            TlsTrust::CaBundle(path) => {
                let pem = std::fs::read(path).map_err(|source| ClientError::CaCert {
                    path: path.clone(),
                    source,
                })?;
                let cert =
                    reqwest::Certificate::from_pem(&pem).map_err(ClientError::InvalidCaCert)?;
                tracing::debug!(path = %path.display(), "added CA certificate");
                Ok(builder.add_root_certificate(cert))
            }
        }
    }
}

/// Install the ring crypto provider for rustls.
///
/// The workspace builds reqwest with `rustls-no-provider`, so a provider must
/// be in place before the first client is built. Installing twice is a no-op.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::trace!("rustls crypto provider already installed");
    }
}
