use cmdbridge_core::{BridgeError, BridgeResult, MaterializedCommand};
use serde::Serialize;
use serde_json::Value;

/// One key-value command: name plus flat string arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedisCommand {
    pub command: String,
    pub args: Vec<String>,
}

impl RedisCommand {
    /// RESP2 array-of-bulk-strings encoding, as sent on the wire.
    pub fn to_resp(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(format!("*{}\r\n", self.args.len() + 1).as_bytes());
        for part in std::iter::once(&self.command).chain(self.args.iter()) {
            buf.extend_from_slice(format!("${}\r\n", part.len()).as_bytes());
            buf.extend_from_slice(part.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf
    }
}

pub fn emit_command(command: MaterializedCommand) -> BridgeResult<RedisCommand> {
    let args = command
        .target_values()
        .enumerate()
        .map(|(i, value)| argument_string(&command.verb, i + 1, value))
        .collect::<BridgeResult<Vec<_>>>()?;

    Ok(RedisCommand {
        command: command.verb,
        args,
    })
}

fn argument_string(verb: &str, index: usize, value: &Value) -> BridgeResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(BridgeError::Emit(format!(
            "{} argument {} is null",
            verb, index
        ))),
        Value::Array(_) | Value::Object(_) => Ok(serde_json::to_string(value)?),
    }
}
