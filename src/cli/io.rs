//! JSON I/O handling for CLI
//!
//! - Input: one JSON object on stdin (may span lines)
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    read_request_from(io::stdin().lock())
}

/// Read a JSON request from any reader
pub fn read_request_from<R: Read>(mut reader: R) -> CliResult<Value> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::invalid_request("Empty input"));
    }

    let value: Value = serde_json::from_str(&input)?;
    Ok(value)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout().lock(), data)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout().lock(), code, message)
}

pub fn write_response_to<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    write_line(writer, &json!({ "status": "ok", "data": data }))
}

pub fn write_error_to<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_line(
        writer,
        &json!({ "status": "error", "code": code, "message": message }),
    )
}

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
