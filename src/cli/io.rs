//! JSON output for the CLI
//!
//! - Output: a single JSON object on stdout
//! - Success: `{"status":"ok","data":...}`
//! - Failure: `{"status":"error","code":...,"message":...}`
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout(), data)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout(), code, message)
}

pub fn write_response_to<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

pub fn write_error_to<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(out, &response)
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let mut buffer = Vec::new();
        write_response_to(&mut buffer, json!([1, 2])).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.ends_with('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"][1], 2);
    }

    #[test]
    fn test_error_shape() {
        let mut buffer = Vec::new();
        write_error_to(&mut buffer, "FOLIO_LOADER_IO", "cannot read books.txt").unwrap();

        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "FOLIO_LOADER_IO");
        assert_eq!(parsed["message"], "cannot read books.txt");
    }
}
