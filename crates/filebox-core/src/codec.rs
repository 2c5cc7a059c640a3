//! JSON Lines encoding of action batches
//!
//! Each non-blank line carries one client message as produced by
//! [`FileAction::to_json`].

use crate::model::FileAction;
use crate::{Error, Result};

/// Decode a batch, one action per non-blank line.
///
/// # Errors
///
/// [`Error::MalformedInput`] naming the first offending line (1-based).
pub fn decode_batch(input: &str) -> Result<Vec<FileAction>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| Error::MalformedInput {
                line: index + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Decode individually received messages, numbering them from 1.
pub fn decode_messages<S: AsRef<str>>(messages: &[S]) -> Result<Vec<FileAction>> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            FileAction::from_json(message.as_ref()).map_err(|e| match e {
                Error::MalformedInput { message, .. } => Error::MalformedInput {
                    line: index + 1,
                    message,
                },
                other => other,
            })
        })
        .collect()
}

/// Encode a batch as JSON Lines with a trailing newline.
pub fn encode_batch(actions: &[FileAction]) -> Result<String> {
    let mut out = String::new();
    for action in actions {
        out.push_str(&action.to_json()?);
        out.push('\n');
    }
    Ok(out)
}
