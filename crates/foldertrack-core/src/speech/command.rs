use std::process::Stdio;

use tokio::process::Command;

use super::{RecognitionFuture, SpeechRecognizer, TranscriptionError};

/// Runs an external speech-to-text program and reads the transcript from
/// its stdout.
///
/// The program is expected to record from the default input device, print
/// the recognized text and exit. It is killed if the session is stopped
/// before it finishes.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn recognize(&self) -> RecognitionFuture<'_> {
        Box::pin(async move {
            let output = Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|e| {
                    TranscriptionError::Engine(format!("failed to start {}: {e}", self.program))
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(TranscriptionError::Engine(format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                )));
            }

            let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if text.is_empty() {
                Err(TranscriptionError::NoSpeech)
            } else {
                Ok(text)
            }
        })
    }
}
