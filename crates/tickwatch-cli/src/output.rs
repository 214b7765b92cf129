use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;
use crate::metadata::Metadata;

/// Machine-readable command output.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub meta: Metadata,
    pub data: T,
}

pub fn render(envelope: &Envelope<Value>, pretty: bool) -> Result<(), CliError> {
    println!("{}", encode(envelope, pretty)?);
    Ok(())
}

fn encode(envelope: &Envelope<Value>, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    Ok(payload)
}
