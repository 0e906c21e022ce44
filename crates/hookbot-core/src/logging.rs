use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Install the process-wide fmt subscriber for a binary.
///
/// Library code never calls this; clients log through their own injected
/// dispatcher or whatever default the caller installed.
pub fn init(service_name: &str) -> Result<()> {
    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,hookbot_core=info,hookbot_feishu=info,hookbot_wecom=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Config(format!("logging init failed: {e}")))
}
