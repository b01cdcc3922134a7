//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_fetcher;
pub mod image_generator;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::BananaError;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if the cassette has no more interactions for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, BananaError> {
    let mut guard =
        replayer.lock().map_err(|e| BananaError::Replay(format!("replayer lock poisoned: {e}")))?;
    let interaction = guard.next_interaction(port, method)?;
    Ok(interaction.output.clone())
}

/// Deserialize a replayed output recorded with the Ok/Err convention.
///
/// # Errors
///
/// A recorded `Err` comes back as [`BananaError::Replay`] carrying the
/// original message; a malformed `Ok` value is also a replay error.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, BananaError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(BananaError::Replay(msg));
    }
    let value = match output.get("Ok").or_else(|| output.get("ok")) {
        Some(ok_val) => ok_val.clone(),
        None => output,
    };
    serde_json::from_value(value)
        .map_err(|e| BananaError::Replay(format!("recorded output does not match: {e}")))
}
