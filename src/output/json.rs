//! JSON report output
//!
//! Records are written as a pretty-printed array with a 4-space indent, the
//! layout the ranking front end reads.

use crate::output::traits::OutputResult;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const INDENT: &[u8] = b"    ";

/// Serializes `value` as JSON indented by four spaces
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> OutputResult<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes `value` as indented JSON to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to serialize or write
pub fn write_json_report<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> OutputResult<()> {
    let json = to_pretty_json(value)?;

    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(())
}
