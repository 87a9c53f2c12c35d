mod envelope;
pub use self::envelope::{RequestBody, RequestEnvelope};

mod scan;
pub use self::scan::{CreateScanTaskRequest, SandboxOptions, ScanIdRequest, ScanOptions};
