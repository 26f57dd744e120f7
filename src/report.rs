//! CSV report sink.
//!
//! Layout: a `DocA, DocB, Similarity` header, then per group the
//! representative paired with itself at `1` followed by one row per member.
//! Groups are ordered by the representative's dense id.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{NearDupReport, PipelineError};

/// One report row with external ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRow<'a> {
    pub doc_a: &'a str,
    pub doc_b: &'a str,
    pub similarity: f32,
}

/// Write `report` as CSV to `out`.
pub fn write_csv_report<W: Write>(report: &NearDupReport, out: &mut W) -> Result<(), PipelineError> {
    let rows = report.resolved_rows()?;
    writeln!(out, "DocA, DocB, Similarity")?;
    for row in rows {
        writeln!(
            out,
            "{}, {}, {}",
            csv_field(row.doc_a),
            csv_field(row.doc_b),
            row.similarity
        )?;
    }
    Ok(())
}

/// Write the CSV report to `path`.
///
/// The report goes to a sibling temporary file first and is renamed into
/// place once complete, so `path` never holds a partial report.
pub fn write_report_file<P: AsRef<Path>>(report: &NearDupReport, path: P) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".partial");
    let tmp = path.with_file_name(tmp_name);

    let result = (|| {
        let mut out = BufWriter::new(File::create(&tmp)?);
        write_csv_report(report, &mut out)?;
        out.flush()?;
        Ok::<_, PipelineError>(())
    })();
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) || value.starts_with(' ') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
