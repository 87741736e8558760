use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ApiError, Result};

/// Base URL used when the configuration does not override it.
pub const DEFAULT_API_URL: &str = "https://api.myrenault.com";

/// Upper bound on a single HTTP exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Account credentials for the MyRenault API.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    locale: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: Option<String>,
}

/// An authenticated session, established by [`Connection::initialise`].
#[derive(Debug)]
struct Session {
    access_token: String,
    locale: String,
}

/// An HTTP session against the MyRenault API.
///
/// Authenticates once with [`initialise`](Self::initialise) and then serves
/// resource requests with the stored bearer token. All methods take `&self`
/// so one connection can back several sensors through an `Arc`.
pub struct Connection {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    session: RwLock<Option<Session>>,
}

impl Connection {
    /// Create an unauthenticated connection targeting `base_url`.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    /// Like [`new`](Self::new) with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            credentials,
            session: RwLock::new(None),
        })
    }

    /// Whether [`initialise`](Self::initialise) has completed successfully.
    pub async fn is_initialised(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Log in with the stored credentials and keep the returned token.
    pub async fn initialise(&self, locale: &str) -> Result<()> {
        let url = format!("{}/auth/login", self.base_url);
        info!("Logging in to MyRenault as {}", self.credentials.username);

        let resp = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: &self.credentials.username,
                password: &self.credentials.password,
                locale,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Authentication(body));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse = serde_json::from_str(&body)?;
        let access_token = login
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Authentication("no access token in login response".into()))?;

        *self.session.write().await = Some(Session {
            access_token,
            locale: locale.to_string(),
        });
        info!("MyRenault session initialised (locale {locale})");
        Ok(())
    }

    /// Fetch the battery status document for `vin`.
    pub async fn battery_status(&self, vin: &str) -> Result<Value> {
        self.get(&format!("vehicles/{vin}/battery-status")).await
    }

    /// Fetch the mileage document for `vin`.
    pub async fn mileage(&self, vin: &str) -> Result<Value> {
        self.get(&format!("vehicles/{vin}/mileage")).await
    }

    /// Issue an authenticated GET and decode the JSON body.
    async fn get(&self, path: &str) -> Result<Value> {
        let (token, locale) = {
            let session = self.session.read().await;
            let session = session.as_ref().ok_or(ApiError::NotInitialised)?;
            (session.access_token.clone(), session.locale.clone())
        };

        let url = format!("{}/{path}", self.base_url);
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT_LANGUAGE, locale)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one HTTP/1.1 request (head and body) from the stream.
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending a full request");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse::<usize>().unwrap())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// A mock API that answers each incoming request with the next canned
    /// response and returns the raw requests it saw.
    async fn mock_server(listener: TcpListener, responses: Vec<(u16, &'static str)>) -> Vec<String> {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);

            let resp = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        seen
    }

    async fn connect(responses: Vec<(u16, &'static str)>) -> (Connection, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(mock_server(listener, responses));
        let conn = Connection::new(
            format!("http://{addr}/"),
            Credentials::new("driver@example.com", "hunter2"),
        )
        .unwrap();
        (conn, server)
    }

    #[tokio::test]
    async fn test_initialise_and_fetch() {
        let (conn, server) = connect(vec![
            (200, r#"{"accessToken":"tok-123"}"#),
            (200, r#"{"data":{"attributes":{"batteryLevel":72}}}"#),
            (200, r#"{"data":{"attributes":{"totalMileage":4200}}}"#),
        ])
        .await;

        conn.initialise("fr_FR").await.unwrap();
        assert!(conn.is_initialised().await);

        let battery = conn.battery_status("VF1TEST").await.unwrap();
        assert_eq!(battery["data"]["attributes"]["batteryLevel"], 72);
        let mileage = conn.mileage("VF1TEST").await.unwrap();
        assert_eq!(mileage["data"]["attributes"]["totalMileage"], 4200);

        let seen = server.await.unwrap();
        assert!(seen[0].starts_with("POST /auth/login "));
        assert!(seen[0].contains(r#""locale":"fr_FR""#));
        assert!(seen[0].contains(r#""username":"driver@example.com""#));

        assert!(seen[1].starts_with("GET /vehicles/VF1TEST/battery-status "));
        assert!(seen[1].to_lowercase().contains("authorization: bearer tok-123"));
        assert!(seen[2].starts_with("GET /vehicles/VF1TEST/mileage "));
    }

    #[tokio::test]
    async fn test_fetch_before_initialise() {
        let conn = Connection::new("http://127.0.0.1:9", Credentials::new("u", "p")).unwrap();
        let result = conn.battery_status("VF1TEST").await;
        assert!(matches!(result, Err(ApiError::NotInitialised)));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (conn, server) = connect(vec![(401, r#"{"error":"invalid credentials"}"#)]).await;

        let result = conn.initialise("fr_FR").await;
        assert!(matches!(result, Err(ApiError::Authentication(_))));
        assert!(!conn.is_initialised().await);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let (conn, server) = connect(vec![(200, r#"{"sessionId":"abc"}"#)]).await;

        let result = conn.initialise("fr_FR").await;
        assert!(matches!(result, Err(ApiError::Authentication(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status() {
        let (conn, server) = connect(vec![
            (200, r#"{"accessToken":"tok"}"#),
            (500, r#"{"errors":[]}"#),
        ])
        .await;

        conn.initialise("en_GB").await.unwrap();
        let result = conn.mileage("VF1TEST").await;
        match result {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, r#"{"errors":[]}"#);
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("driver", "hunter2");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("driver"));
        assert!(!dbg.contains("hunter2"));
    }
}
