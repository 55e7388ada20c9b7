// Authenticated connection to a Twibi router
//
// The firmware keeps a single cookie-less session per client address: a
// successful `login` command unlocks `/goform/get` and `/goform/set` until
// the session silently lapses, at which point GETs start returning the HTML
// login page. This module owns that session flag and serializes logins so
// concurrent callers never race each other into invalidated sessions.

use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::command::{SetCommand, timestamp_ms};
use crate::error::Error;
use crate::models::ModuleMap;
use crate::module::{ModuleId, join_modules};
use crate::transport::TransportConfig;

/// HTTP connection to one router endpoint.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct Connection {
    http: reqwest::Client,
    host: String,
    base_url: Url,
    password: SecretString,
    authenticated: AtomicBool,
    auth_lock: Mutex<()>,
}

impl Connection {
    /// Build a connection for `host` (an IP or hostname, optionally with a
    /// scheme or port).
    pub fn new(
        host: &str,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = goform_url(host)?;
        Ok(Self::with_client(http, base_url, password))
    }

    /// Build a connection around a pre-configured `reqwest::Client`.
    ///
    /// `base_url` is the `/goform/` directory, e.g. `http://192.168.5.1/goform/`.
    pub fn with_client(http: reqwest::Client, base_url: Url, password: SecretString) -> Self {
        let host = base_url.host_str().unwrap_or_default().to_owned();
        let host = match base_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };
        Self {
            http,
            host,
            base_url,
            password,
            authenticated: AtomicBool::new(false),
            auth_lock: Mutex::new(()),
        }
    }

    /// The router address this connection talks to.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    /// Forget the current session; the next request logs in again.
    pub fn invalidate_auth(&self) {
        if self.authenticated.swap(false, Ordering::AcqRel) {
            debug!(host = %self.host, "session invalidated");
        }
    }

    /// Log in unless a session is already established.
    ///
    /// Concurrent callers queue on a single gate; whoever wins performs the
    /// login and the rest observe its result on the re-check.
    pub async fn ensure_authenticated(&self) -> Result<(), Error> {
        if self.is_authenticated() {
            return Ok(());
        }
        let _gate = self.auth_lock.lock().await;
        if self.is_authenticated() {
            trace!("session established while waiting on auth gate");
            return Ok(());
        }
        self.login().await
    }

    /// Send the MD5 login command unconditionally.
    pub async fn login(&self) -> Result<(), Error> {
        let command = SetCommand::login(&self.password, timestamp_ms());
        debug!(host = %self.host, "logging in");

        let body = match self.post_raw(&command).await {
            Ok(body) => body,
            Err(e) => {
                self.authenticated.store(false, Ordering::Release);
                return Err(e);
            }
        };

        let response: Value =
            serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;

        if login_rejected(&response) {
            self.authenticated.store(false, Ordering::Release);
            warn!(host = %self.host, "router rejected login credentials");
            return Err(Error::Authentication {
                message: "router rejected the password".into(),
            });
        }

        self.authenticated.store(true, Ordering::Release);
        debug!(host = %self.host, "login successful");
        Ok(())
    }

    /// Fetch one or more modules in a single `/goform/get` request.
    ///
    /// The result is the top-level JSON object keyed by module name.
    pub async fn get_data(&self, modules: &[ModuleId]) -> Result<ModuleMap, Error> {
        self.ensure_authenticated().await?;

        // Commas must reach the firmware unescaped, so the query is
        // formatted rather than built through `query_pairs_mut`.
        let url = Url::parse(&format!(
            "{}get?module_id={}",
            self.base_url,
            join_modules(modules)
        ))?;
        debug!(%url, "GET");

        let guard = AuthResetGuard::arm(&self.authenticated);
        let body = self.http.get(url).send().await?.text().await?;
        guard.disarm();

        match parse_module_body(&body) {
            Err(Error::SessionExpired) => {
                warn!(host = %self.host, "router returned its login page; session expired");
                self.authenticated.store(false, Ordering::Release);
                Err(Error::SessionExpired)
            }
            other => other,
        }
    }

    /// POST a command to `/goform/set` and return the decoded response.
    pub async fn send_command(&self, command: &SetCommand) -> Result<Value, Error> {
        self.ensure_authenticated().await?;
        debug!(command = command.key(), payload = %command.redacted(), "sending command");

        let body = self.post_raw(command).await?;
        if body.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        let value = serde_json::from_str(&body).map_err(|e| Error::deserialization(&e, &body))?;
        trace!(command = command.key(), response = %value, "command response");
        Ok(value)
    }

    async fn post_raw(&self, command: &SetCommand) -> Result<String, Error> {
        let url = self.base_url.join("set")?;
        let guard = AuthResetGuard::arm(&self.authenticated);
        let body = self
            .http
            .post(url)
            .json(command)
            .send()
            .await?
            .text()
            .await?;
        guard.disarm();
        Ok(body)
    }
}

/// Resolve the `/goform/` directory for a configured host.
fn goform_url(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    let root = if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    };
    Ok(Url::parse(&format!("{root}/"))?.join("goform/")?)
}

fn login_rejected(response: &Value) -> bool {
    match response.get("errcode") {
        Some(Value::String(code)) => code.trim() == "1",
        Some(Value::Number(code)) => code.as_i64() == Some(1),
        _ => false,
    }
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.contains("<html")
}

/// Classify a `/goform/get` response body.
pub(crate) fn parse_module_body(body: &str) -> Result<ModuleMap, Error> {
    if body.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::Deserialization {
            message: format!("expected a JSON object, got {other}"),
            body: body.to_owned(),
        }),
        Err(_) if looks_like_html(body) => Err(Error::SessionExpired),
        Err(e) => Err(Error::deserialization(&e, body)),
    }
}

/// Clears the session flag unless disarmed.
///
/// Held across an HTTP round trip: a transport error or a dropped future
/// leaves the session in an unknown state, so it must be re-established.
struct AuthResetGuard<'a> {
    flag: &'a AtomicBool,
    armed: bool,
}

impl<'a> AuthResetGuard<'a> {
    fn arm(flag: &'a AtomicBool) -> Self {
        Self { flag, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AuthResetGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn goform_url_accepts_bare_host_and_scheme() {
        assert_eq!(
            goform_url("192.168.5.1").unwrap().as_str(),
            "http://192.168.5.1/goform/"
        );
        assert_eq!(
            goform_url("http://10.0.0.1:8080/").unwrap().as_str(),
            "http://10.0.0.1:8080/goform/"
        );
    }

    #[test]
    fn html_login_page_is_session_expiry() {
        let body = "<!DOCTYPE html>\n<html><head><title>login</title></head></html>";
        assert!(matches!(parse_module_body(body), Err(Error::SessionExpired)));

        let body = "  <HTML><body>Login</body></HTML>";
        assert!(matches!(parse_module_body(body), Err(Error::SessionExpired)));
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        assert!(matches!(
            parse_module_body("{\"node_info\": ["),
            Err(Error::Deserialization { .. })
        ));
        assert!(matches!(
            parse_module_body("[1, 2]"),
            Err(Error::Deserialization { .. })
        ));
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(matches!(parse_module_body("  \n"), Err(Error::EmptyResponse)));
    }

    #[test]
    fn module_object_passes_through() {
        let map = parse_module_body(r#"{"node_info":[],"custom":{"a":1}}"#).unwrap();
        assert!(map.contains_key("node_info"));
        assert!(map.contains_key("custom"));
    }

    #[test]
    fn errcode_one_rejects_login_in_either_encoding() {
        assert!(login_rejected(&serde_json::json!({"errcode": "1"})));
        assert!(login_rejected(&serde_json::json!({"errcode": 1})));
        assert!(!login_rejected(&serde_json::json!({"errcode": "0"})));
        assert!(!login_rejected(&serde_json::json!({})));
    }

    #[test]
    fn reset_guard_clears_flag_unless_disarmed() {
        let flag = AtomicBool::new(true);
        drop(AuthResetGuard::arm(&flag));
        assert!(!flag.load(Ordering::Acquire));

        flag.store(true, Ordering::Release);
        AuthResetGuard::arm(&flag).disarm();
        assert!(flag.load(Ordering::Acquire));
    }
}
