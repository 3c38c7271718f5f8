use super::{LaunchCommand, ProcessHost, ProcessOutput, SpawnedProcess};
use crate::error::ProcessError;
use async_trait::async_trait;
use encoding_rs::WINDOWS_1252;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const OUTPUT_BUFFER: usize = 256;
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Runs the spectator client as a real child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessHost;

#[async_trait]
impl ProcessHost for SystemProcessHost {
    async fn spawn(&self, command: &LaunchCommand) -> Result<SpawnedProcess, ProcessError> {
        let mut child = Command::new(command.program())
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: command.executable.clone(),
                source,
            })?;

        let pid = child.id();
        let stderr = child.stderr.take();
        let (tx, rx) = mpsc::channel(OUTPUT_BUFFER);

        tokio::spawn(async move {
            if let Some(mut stderr) = stderr {
                let mut buf = vec![0u8; READ_CHUNK_BYTES];
                loop {
                    match stderr.read(&mut buf).await {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(ProcessOutput::Chunk(decode_chunk(&buf[..n]))).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read spectator output");
                            break;
                        }
                    }
                }
            }

            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(error = %e, "Failed to wait for spectator client");
                    None
                }
            };
            tx.send(ProcessOutput::Exited { code }).await.ok();
        });

        Ok(SpawnedProcess { pid, output: rx })
    }

    async fn kill_by_name(&self, image: &str) -> Result<(), ProcessError> {
        let output = kill_command(image)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|source| ProcessError::Kill {
                image: image.to_string(),
                source,
            })?;

        if !output.status.success() {
            // taskkill/pkill report "nothing matched" through the exit code
            debug!(image, exit_code = ?output.status.code(), "No process killed");
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn kill_command(image: &str) -> Command {
    let mut cmd = Command::new("taskkill");
    cmd.args(["/F", "/IM", image])
        .creation_flags(0x08000000); // CREATE_NO_WINDOW
    cmd
}

#[cfg(not(target_os = "windows"))]
fn kill_command(image: &str) -> Command {
    let mut cmd = Command::new("pkill");
    cmd.args(["-f", image]);
    cmd
}

/// Decode client output, which is UTF-8 on current builds but Windows-1252 on
/// older ones.
pub fn decode_chunk(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}
