//! Bounded subprocess execution

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use wanfo_core::{Error, Result};

/// Default `ping` binary
pub const PING_BIN: &str = "ping";

/// Default iproute2 binary
pub const IP_BIN: &str = "ip";

/// Run `program args..` and collect its output, killing it after `limit`
///
/// A non-zero exit status is NOT an error here; callers inspect
/// `Output::status` themselves.
pub(crate) async fn run(program: &str, args: &[&str], limit: Duration) -> Result<Output> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(limit, child).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(Error::Io(e)),
        Err(_) => Err(Error::Other(format!(
            "{} {} timed out after {:?}",
            program,
            args.join(" "),
            limit
        ))),
    }
}

/// Trimmed stderr, or the exit status when stderr is empty
pub(crate) fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr.to_string()
    }
}
