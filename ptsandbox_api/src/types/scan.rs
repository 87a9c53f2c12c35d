//! Request bodies for the `/analysis` endpoints.

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Body of `/analysis/createScanTask`.
///
/// The client always asks for an asynchronous, short result; the report is
/// fetched separately once the task completes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateScanTaskRequest {
    /// URI returned by `/storage/uploadScanFile`.
    pub file_uri: String,
    pub file_name: String,
    pub async_result: bool,
    pub short_result: bool,
    pub options: ScanOptions,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub analysis_depth: u32,
    /// Passwords tried when unpacking archives.
    pub passwords_for_unpack: Vec<String>,
    pub sandbox: SandboxOptions,
}

/// Dynamic analysis settings. `image_id` and `analysis_duration` are sent as
/// `null` when unset so the server picks its own defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SandboxOptions {
    pub enabled: bool,
    pub skip_check_mime_type: bool,
    pub image_id: Option<String>,
    pub analysis_duration: Option<u32>,
}

impl CreateScanTaskRequest {
    /// Combines the client-wide scan defaults with the identity of one file.
    pub fn new(
        config: &ClientConfig,
        file_uri: impl Into<String>,
        file_name: impl Into<String>,
        passwords_for_unpack: Vec<String>,
    ) -> Self {
        Self {
            file_uri: file_uri.into(),
            file_name: file_name.into(),
            async_result: true,
            short_result: true,
            options: ScanOptions {
                analysis_depth: config.analysis_depth,
                passwords_for_unpack,
                sandbox: SandboxOptions {
                    enabled: config.sandbox_enabled,
                    skip_check_mime_type: true,
                    image_id: config.sandbox_image_id.clone(),
                    analysis_duration: config.sandbox_analysis_duration,
                },
            },
        }
    }
}

/// Body of `/analysis/checkTask` and `/analysis/report`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanIdRequest {
    pub scan_id: String,
}

impl ScanIdRequest {
    pub fn new(scan_id: impl Into<String>) -> Self {
        Self {
            scan_id: scan_id.into(),
        }
    }
}
