//! Connection and scan defaults for [`Client`](crate::Client).

use std::fmt;
use std::time::Duration;

/// Analysis depth used when none is configured.
pub const DEFAULT_ANALYSIS_DEPTH: u32 = 2;

/// Connection settings and the scan options applied to every
/// `create_scan_task` call.
///
/// TLS verification is off by default: sandbox appliances usually ship with
/// self-signed certificates.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name (optionally with port) of the sandbox appliance.
    pub host: String,
    /// Value sent in the `x-api-key` header.
    pub api_key: String,
    pub analysis_depth: u32,
    pub sandbox_enabled: bool,
    pub sandbox_image_id: Option<String>,
    /// Sandbox run time in seconds.
    pub sandbox_analysis_duration: Option<u32>,
    pub verify_tls: bool,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration with default scan options.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            analysis_depth: DEFAULT_ANALYSIS_DEPTH,
            sandbox_enabled: false,
            sandbox_image_id: None,
            sandbox_analysis_duration: None,
            verify_tls: false,
            timeout: None,
        }
    }

    pub fn with_analysis_depth(mut self, depth: u32) -> Self {
        self.analysis_depth = depth;
        self
    }

    /// Enables or disables dynamic analysis in the sandbox.
    pub fn with_sandbox_enabled(mut self, enabled: bool) -> Self {
        self.sandbox_enabled = enabled;
        self
    }

    pub fn with_sandbox_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.sandbox_image_id = Some(image_id.into());
        self
    }

    pub fn with_sandbox_analysis_duration(mut self, seconds: u32) -> Self {
        self.sandbox_analysis_duration = Some(seconds);
        self
    }

    /// Turns certificate verification on or off.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("api_key", &"[redacted]")
            .field("analysis_depth", &self.analysis_depth)
            .field("sandbox_enabled", &self.sandbox_enabled)
            .field("sandbox_image_id", &self.sandbox_image_id)
            .field("sandbox_analysis_duration", &self.sandbox_analysis_duration)
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}
