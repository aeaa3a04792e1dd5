//! External WHOIS lookup invocation.
//!
//! Runs the system `whois` client (following referrals with `-R`) and returns
//! whatever it printed. Each lookup is bounded by a wall-clock timeout: when it
//! fires the process is killed and the text collected so far is returned.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

use crate::config::{WHOIS_ARGS, WHOIS_PROGRAM, WHOIS_TIMEOUT_MS};

/// Source of raw registry text for a domain.
///
/// Implementations never fail: an unreachable registry or a broken command
/// yields an empty (or partial) string, which parses into a blank record.
pub trait RegistryLookup {
    fn lookup(&self, domain: &str) -> impl Future<Output = String>;
}

/// Lookup backed by an external command (`whois -R <domain>` by default).
///
/// The domain is passed as the final argument of a direct process spawn, never
/// interpolated into a shell command line.
#[derive(Debug, Clone)]
pub struct WhoisCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for WhoisCommand {
    fn default() -> Self {
        Self::new(
            WHOIS_PROGRAM,
            WHOIS_ARGS.iter().copied(),
            Duration::from_millis(WHOIS_TIMEOUT_MS),
        )
    }
}

impl WhoisCommand {
    /// Creates a command runner.
    ///
    /// # Arguments
    ///
    /// * `program` - Executable to spawn (looked up on `PATH`)
    /// * `args` - Arguments placed before the domain
    /// * `timeout` - Wall-clock limit per lookup
    pub fn new<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the lookup for `domain`, returning collected stdout.
    ///
    /// Resolves when the process exits or when the timeout fires, whichever
    /// comes first. Output is decoded lossily; registries are not consistent
    /// about encodings.
    pub async fn invoke(&self, domain: &str) -> String {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .arg(domain)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn '{}' for {}: {}", self.program, domain, e);
                return String::new();
            }
        };

        let Some(stdout) = child.stdout.take() else {
            warn!("No stdout pipe for '{}' lookup of {}", self.program, domain);
            return String::new();
        };

        let mut collected = Vec::new();
        let finished = tokio::time::timeout(
            self.timeout,
            collect_until_exit(&mut child, stdout, &mut collected),
        )
        .await;

        if finished.is_err() {
            warn!(
                "WHOIS lookup for {} timed out after {}ms, keeping {} bytes of output",
                domain,
                self.timeout.as_millis(),
                collected.len()
            );
            if let Err(e) = child.kill().await {
                debug!("Failed to kill WHOIS process for {}: {}", domain, e);
            }
        }

        String::from_utf8_lossy(&collected).into_owned()
    }
}

impl RegistryLookup for WhoisCommand {
    async fn lookup(&self, domain: &str) -> String {
        self.invoke(domain).await
    }
}

/// Appends stdout to `buf` until EOF, then reaps the process.
///
/// Output lands in `buf` chunk by chunk so a caller that abandons this future
/// on timeout still sees everything read so far.
async fn collect_until_exit(child: &mut Child, mut stdout: ChildStdout, buf: &mut Vec<u8>) {
    let mut chunk = [0u8; 4096];
    loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) => {
                debug!("Error reading WHOIS output: {}", e);
                break;
            }
        }
    }

    match child.wait().await {
        Ok(status) if !status.success() => {
            // Exit status carries no information the text doesn't
            debug!("WHOIS process exited with {}", status);
        }
        Ok(_) => {}
        Err(e) => debug!("Failed to wait for WHOIS process: {}", e),
    }
}
