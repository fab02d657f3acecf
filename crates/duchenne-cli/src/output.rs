//! JSON report output.

use std::io::Write;

use anyhow::Result;
use duchenne_core::{FaceResult, RejectedFace};
use serde::Serialize;

/// Scoring report for one input file.
#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub file: String,
    pub faces: &'a [FaceResult],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub rejected: &'a [RejectedFace],
}

/// Write one value as a JSON line, or as an indented block when `pretty`.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    } else {
        serde_json::to_writer(&mut *writer, value)?;
    }
    writeln!(writer)?;
    Ok(())
}
