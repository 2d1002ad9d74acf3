use crate::config::{CsvQuoting, ExportOptions};
use crate::model::QueryResult;
use crate::render;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("query result has no rows to export")]
    EmptyResult,

    #[error("failed to write CSV: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Data rows written, header excluded.
    pub rows: usize,
    pub bytes: u64,
}

/// Stream the whole result, not just the rendered window, as CSV.
///
/// Every line, header included, is terminated by `\n`. Cells go through the same
/// formatter as the table, so the file matches what the user sees.
pub fn write_csv<W: Write>(
    result: &QueryResult,
    options: &ExportOptions,
    out: W,
) -> Result<ExportSummary, ExportError> {
    if result.is_empty() {
        return Err(ExportError::EmptyResult);
    }

    let mut out = CountingWriter { inner: out, bytes: 0 };
    match options.quoting {
        CsvQuoting::Lenient => write_lenient(result, &mut out)?,
        CsvQuoting::Strict => write_strict(result, &mut out)?,
    }
    out.flush()?;

    Ok(ExportSummary {
        rows: result.rows.len(),
        bytes: out.bytes,
    })
}

pub fn export_csv(result: &QueryResult, options: &ExportOptions) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(result, options, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the export next to `path` and move it into place once complete. An empty
/// result or a failed write leaves whatever was at `path` untouched.
pub fn save_csv(
    result: &QueryResult,
    options: &ExportOptions,
    path: &Path,
) -> Result<ExportSummary, ExportError> {
    if result.is_empty() {
        return Err(ExportError::EmptyResult);
    }

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    let summary = write_csv(result, options, BufWriter::new(staged.as_file_mut()))?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(summary)
}

/// Header joined as-is; only fields containing a comma are quoted.
fn write_lenient<W: Write>(result: &QueryResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", result.columns.join(","))?;
    for row in &result.rows {
        let line = row
            .iter()
            .map(|value| quote_commas(render::format(value).text))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn quote_commas(field: String) -> String {
    if field.contains(',') {
        format!("\"{field}\"")
    } else {
        field
    }
}

fn write_strict<W: Write>(result: &QueryResult, out: &mut W) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(out);
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(|value| render::format(value).text))?;
    }
    writer.flush()?;
    Ok(())
}

struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
