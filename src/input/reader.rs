use anyhow::{Context, Result, bail};
use std::io::{self, Read};

use crate::chat::MAX_QUESTION_BYTES;

pub struct QuestionReader;

impl QuestionReader {
    /// Reads a question from stdin (for `gazzi ask` without an argument).
    pub fn read_stdin() -> Result<String> {
        Self::read_from(io::stdin().lock())
    }

    #[allow(clippy::significant_drop_tightening)]
    pub fn read_from(mut reader: impl Read) -> Result<String> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];

        loop {
            let bytes_read = reader
                .read(&mut chunk)
                .context("Failed to read question from stdin")?;

            if bytes_read == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..bytes_read]);

            if buffer.len() > MAX_QUESTION_BYTES {
                bail!(
                    "Error: Question size ({:.1} KB) exceeds maximum allowed size (64 KB).",
                    buffer.len() as f64 / 1024.0
                );
            }
        }

        String::from_utf8(buffer).context("Question is not valid UTF-8")
    }
}
