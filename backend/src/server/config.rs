//! Server configuration: environment settings and the runtime config object.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use url::Url;
use serde::{Deserialize, Serialize};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Environment-driven application settings, loaded via OrthoConfig.
///
/// Every key carries the `ALUMNI_` prefix in the environment, so the
/// service URL arrives as `ALUMNI_SERVICE_URL` and so on.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ALUMNI")]
pub struct AppSettings {
    /// Base URL of the hosted record, storage, and auth services.
    pub service_url: Option<String>,
    /// Service key used against those services.
    pub service_key: Option<String>,
    /// Transactional mail API endpoint greetings are posted to.
    pub mail_url: Option<String>,
    /// API key for the mail service.
    pub mail_key: Option<String>,
    /// From-address greetings are sent as.
    pub mail_sender: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Path to the session signing key file.
    pub session_key_file: Option<PathBuf>,
    /// Whether session cookies carry the `Secure` flag.
    // `skip_cli` keeps the declared default effective: clap's implicit
    // `false` for an absent bool flag would otherwise override it.
    #[ortho_config(default = true, skip_cli)]
    pub cookie_secure: bool,
    /// Timeout applied to every outbound HTTP request, in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_seconds: u64,
}

impl AppSettings {
    /// Return the configured bind address, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured value is not a socket address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|error| {
                std::io::Error::other(format!("invalid ALUMNI_BIND_ADDR: {error}"))
            })
    }

    /// Return the configured session key file, falling back to the default.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Outbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    /// Resolve the hosted service endpoints, if all of them are configured.
    ///
    /// Returns `None` when none of the endpoint settings are present, which
    /// puts the server into fixture mode for local development.
    ///
    /// # Errors
    ///
    /// Returns an error when endpoints are partially configured or a URL
    /// fails to parse.
    pub fn endpoints(&self) -> std::io::Result<Option<BackendEndpoints>> {
        let configured = [
            &self.service_url,
            &self.service_key,
            &self.mail_url,
            &self.mail_key,
            &self.mail_sender,
        ];
        if configured.iter().all(|value| value.is_none()) {
            return Ok(None);
        }
        let (Some(service_url), Some(service_key), Some(mail_url), Some(mail_key), Some(sender)) = (
            self.service_url.as_deref(),
            self.service_key.as_deref(),
            self.mail_url.as_deref(),
            self.mail_key.as_deref(),
            self.mail_sender.as_deref(),
        ) else {
            return Err(std::io::Error::other(
                "hosted service settings are partially configured; set all of \
                 ALUMNI_SERVICE_URL, ALUMNI_SERVICE_KEY, ALUMNI_MAIL_URL, \
                 ALUMNI_MAIL_KEY, and ALUMNI_MAIL_SENDER or none of them",
            ));
        };
        Ok(Some(BackendEndpoints {
            service_url: parse_url("ALUMNI_SERVICE_URL", service_url)?,
            service_key: service_key.to_owned(),
            mail_url: parse_url("ALUMNI_MAIL_URL", mail_url)?,
            mail_key: mail_key.to_owned(),
            mail_sender: sender.to_owned(),
        }))
    }
}

fn parse_url(name: &str, raw: &str) -> std::io::Result<Url> {
    Url::parse(raw).map_err(|error| std::io::Error::other(format!("invalid {name}: {error}")))
}

/// Resolved endpoints for the hosted backend services.
#[derive(Debug, Clone)]
pub struct BackendEndpoints {
    pub service_url: Url,
    pub service_key: String,
    pub mail_url: Url,
    pub mail_key: String,
    pub mail_sender: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) endpoints: Option<BackendEndpoints>,
    pub(crate) request_timeout: Duration,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            endpoints: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Attach hosted service endpoints.
    ///
    /// When provided, the server talks to the real record, storage, auth,
    /// and mail services; otherwise it runs over fixture ports.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Option<BackendEndpoints>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Override the outbound request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for environment settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("alumni-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_environment_is_empty() {
        let _guard = lock_env([
            ("ALUMNI_SERVICE_URL", None::<String>),
            ("ALUMNI_SERVICE_KEY", None::<String>),
            ("ALUMNI_MAIL_URL", None::<String>),
            ("ALUMNI_MAIL_KEY", None::<String>),
            ("ALUMNI_MAIL_SENDER", None::<String>),
            ("ALUMNI_BIND_ADDR", None::<String>),
            ("ALUMNI_SESSION_KEY_FILE", None::<String>),
            ("ALUMNI_COOKIE_SECURE", None::<String>),
            ("ALUMNI_REQUEST_TIMEOUT_SECONDS", None::<String>),
        ]);
        let settings = load_from_empty_args();
        assert!(settings.cookie_secure);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(
            settings.bind_addr().expect("default addr should parse"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal addr")
        );
        assert_eq!(
            settings.session_key_file(),
            PathBuf::from(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(settings.endpoints().expect("no endpoints is fine").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ALUMNI_SESSION_KEY_FILE", None::<String>),
            ("ALUMNI_REQUEST_TIMEOUT_SECONDS", None::<String>),
            (
                "ALUMNI_SERVICE_URL",
                Some("https://records.example.com/".to_owned()),
            ),
            ("ALUMNI_SERVICE_KEY", Some("service-key".to_owned())),
            (
                "ALUMNI_MAIL_URL",
                Some("https://mail.example.com/send".to_owned()),
            ),
            ("ALUMNI_MAIL_KEY", Some("mail-key".to_owned())),
            (
                "ALUMNI_MAIL_SENDER",
                Some("greetings@alumni.example.com".to_owned()),
            ),
            ("ALUMNI_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("ALUMNI_COOKIE_SECURE", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.cookie_secure);
        assert_eq!(
            settings.bind_addr().expect("addr should parse"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("literal addr")
        );
        let endpoints = settings
            .endpoints()
            .expect("endpoints should resolve")
            .expect("endpoints should be present");
        assert_eq!(endpoints.service_url.as_str(), "https://records.example.com/");
        assert_eq!(endpoints.mail_sender, "greetings@alumni.example.com");
    }

    #[rstest]
    fn partial_endpoint_configuration_is_rejected() {
        let _guard = lock_env([
            (
                "ALUMNI_SERVICE_URL",
                Some("https://records.example.com/".to_owned()),
            ),
            ("ALUMNI_SERVICE_KEY", None::<String>),
            ("ALUMNI_MAIL_URL", None::<String>),
            ("ALUMNI_MAIL_KEY", None::<String>),
            ("ALUMNI_MAIL_SENDER", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.endpoints().is_err());
    }
}
