// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Test helpers for telemetry-cli integration tests
//!
//! - A wiremock server standing in for both telemetry services
//! - Mounts for each endpoint the run touches
//! - A TLS front with a self-signed certificate that forwards to the mock
//! - A raw listener that cuts response bodies short

// Each test binary uses a different subset of these helpers
#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rcgen::{CertificateParams, KeyPair};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use serde_json::json;
use telemetry_cli::{Endpoints, RunConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use url::Url;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "T0k3n.abc";
pub const TASK_UUID: &str = "abc-123";

/// Archive bytes served by the download mock
pub const ARCHIVE: &[u8] = b"PK\x03\x04\x14\x00\x00\x00\x08\x00telemetry-archive";

/// Run configuration pointing both services at `base`, polling fast
pub fn config_for(base: &str, output: &Path) -> RunConfig {
    let base = Url::parse(base).expect("mock base url");
    let mut config = RunConfig::new(Endpoints::new(base.clone(), base));
    config.output = output.to_path_buf();
    config.poll.interval = Duration::from_millis(10);
    config
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/auth/login/"))
        .and(body_json(json!({"Email": "admin", "Password": "P@ss!234"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_create_task(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/task/"))
        .and(bearer_token(TOKEN))
        .and(body_json(json!({"Command": ["ls -al"]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"UUID": TASK_UUID})))
        .expect(1)
        .mount(server)
        .await;
}

/// Answer the next `times` status polls with `status`. Mounted ahead of the
/// default priority so a later `Completed` mount only answers once these are
/// used up.
pub async fn mount_status_times(server: &MockServer, status: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/status/"))
        .and(query_param("uuid", TASK_UUID))
        .and(bearer_token(TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"UUID": TASK_UUID, "StatusString": status}])),
        )
        .up_to_n_times(times)
        .with_priority(1)
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_status_completed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/status/"))
        .and(query_param("uuid", TASK_UUID))
        .and(bearer_token(TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"UUID": TASK_UUID, "Status": 3, "StatusString": "Completed"}])),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_download(server: &MockServer, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/task/"))
        .and(query_param("uuid", TASK_UUID))
        .and(bearer_token(TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/x-gzip")
                .set_body_bytes(body.to_vec()),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_cancel(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/task/"))
        .and(bearer_token(TOKEN))
        .and(body_json(json!({"UUID": TASK_UUID, "Cancel": true})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount the whole happy path: login, create, `running` polls, completion,
/// download.
pub async fn mount_happy_path(server: &MockServer, running_polls: u64) {
    mount_login(server).await;
    mount_create_task(server).await;
    if running_polls > 0 {
        mount_status_times(server, "Running", running_polls).await;
    }
    mount_status_completed(server).await;
    mount_download(server, ARCHIVE).await;
}

/// A TLS listener with a self-signed certificate. Decrypted traffic is
/// forwarded to `backend`.
pub struct TlsFront {
    pub addr: SocketAddr,
    pub cert_pem: String,
}

impl TlsFront {
    /// URL dialing the listener by IP address, which the certificate never
    /// names
    pub fn url(&self) -> String {
        format!("https://{}", self.addr)
    }

    /// URL dialing the listener through `host`
    pub fn url_for(&self, host: &str) -> String {
        format!("https://{}:{}", host, self.addr.port())
    }
}

/// TLS front whose certificate is issued for a name that does not match the
/// address clients connect to
pub async fn start_tls_front(backend: SocketAddr) -> TlsFront {
    start_tls_front_for(backend, "telemetry.invalid").await
}

/// TLS front whose certificate is issued for `name`
pub async fn start_tls_front_for(backend: SocketAddr, name: &str) -> TlsFront {
    telemetry_cli::tls::install_crypto_provider();

    let key_pair =
        KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).expect("generate key pair");
    let params = CertificateParams::new(vec![name.to_string()]).expect("cert params");
    let cert = params.self_signed(&key_pair).expect("self-sign cert");

    let server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(
            vec![cert.der().clone()],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der())),
        )
        .expect("server tls config");
    let acceptor = TlsAcceptor::from(Arc::new(server_config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind tls front");
    let addr = listener.local_addr().expect("tls front addr");

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(tcp).await else {
                    return;
                };
                let Ok(mut upstream) = TcpStream::connect(backend).await else {
                    return;
                };
                let _ = tokio::io::copy_bidirectional(&mut tls, &mut upstream).await;
            });
        }
    });

    TlsFront {
        addr,
        cert_pem: cert.pem(),
    }
}

/// Plain HTTP listener answering every request with a 200 that announces
/// `declared` body bytes, sends only `body`, then closes the connection.
pub async fn start_truncating_server(declared: usize, body: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind truncating server");
    let addr = listener.local_addr().expect("truncating server addr");

    tokio::spawn(async move {
        while let Ok((mut tcp, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tcp.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/x-gzip\r\nContent-Length: {}\r\n\r\n",
                    declared
                );
                let _ = tcp.write_all(head.as_bytes()).await;
                let _ = tcp.write_all(body).await;
                let _ = tcp.shutdown().await;
            });
        }
    });

    addr
}
