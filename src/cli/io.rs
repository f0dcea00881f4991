//! JSON I/O handling for CLI
//!
//! - Input: one JSON document via stdin
//! - Output: one JSON document via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON document from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Write a JSON document to stdout
pub fn write_json<T: Serialize>(value: &T, pretty: bool) -> CliResult<()> {
    let mut stdout = io::stdout();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_multiline() {
        let value = parse_request("{\n  \"body.type\": \"TextualBody\"\n}\n").unwrap();
        assert_eq!(value["body.type"], "TextualBody");
    }

    #[test]
    fn test_parse_request_empty() {
        let err = parse_request("  \n").unwrap_err();
        assert_eq!(err.message(), "Empty input");
    }
}
