/*!
 * Rendering and export of search results
 *
 * Results can be written as per-region text tables (the terminal view),
 * grouped JSON, or flat CSV. Empty region groups are never written.
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{Result, FinderError, OutputFormat};
use crate::filter::{RegionGroup, ResultSet};
use crate::schema::PanelSchema;

/// Message shown when a query matches nothing
pub const NO_MATCH_MESSAGE: &str = "No doctors found for the given criteria.";

/// Trait for result writers
pub trait ResultExporter {
    /// Write the non-empty groups of a result set
    fn write_results(&self, results: &ResultSet<'_>, out: &mut dyn Write) -> Result<()>;

    /// Get the output format
    fn format(&self) -> OutputFormat;
}

/// Per-region text tables
#[derive(Debug, Clone, Default)]
pub struct TableExporter {
    /// Rows shown per region, `None` for all
    pub max_rows_per_group: Option<usize>,
}

impl TableExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows_per_group = max_rows.filter(|&n| n > 0);
        self
    }

    fn write_group(&self, group: &RegionGroup<'_>, out: &mut dyn Write) -> Result<()> {
        let headers = PanelSchema::column_names();
        let shown = self.max_rows_per_group.unwrap_or(usize::MAX).min(group.len());

        let cells: Vec<[String; 5]> = group.rows.iter()
            .take(shown)
            .map(|r| [
                r.npi.to_string(),
                r.state.clone(),
                r.usage_display(),
                r.region.clone(),
                r.specialty.clone(),
            ])
            .collect();

        let mut widths = headers.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(out, "### {}", group.region)?;
        write_line(out, &headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(out, &rule, &widths)?;
        for row in &cells {
            write_line(out, row, &widths)?;
        }
        if shown < group.len() {
            writeln!(out, "... {} more", group.len() - shown)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn write_line<S: AsRef<str>>(out: &mut dyn Write, cells: &[S], widths: &[usize]) -> Result<()> {
    let line: Vec<String> = cells.iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    writeln!(out, "{}", line.join(" | ").trim_end())?;
    Ok(())
}

impl ResultExporter for TableExporter {
    fn write_results(&self, results: &ResultSet<'_>, out: &mut dyn Write) -> Result<()> {
        if results.is_no_match() {
            writeln!(out, "{}", NO_MATCH_MESSAGE)?;
            return Ok(());
        }

        writeln!(out, "Matching Doctors\n")?;
        for group in results.non_empty_groups() {
            self.write_group(group, out)?;
        }
        Ok(())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Table
    }
}

/// Grouped JSON: an array of `{ "region", "rows" }` objects
#[derive(Debug, Clone)]
pub struct JsonExporter {
    /// Whether to pretty-print the JSON
    pub pretty_print: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

impl ResultExporter for JsonExporter {
    fn write_results(&self, results: &ResultSet<'_>, out: &mut dyn Write) -> Result<()> {
        let groups: Vec<&RegionGroup<'_>> = results.non_empty_groups().collect();
        if self.pretty_print {
            serde_json::to_writer_pretty(&mut *out, &groups)?;
        } else {
            serde_json::to_writer(&mut *out, &groups)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Flat CSV with the panel's column headers
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl ResultExporter for CsvExporter {
    fn write_results(&self, results: &ResultSet<'_>, out: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(PanelSchema::column_names())?;
        for record in results.rows() {
            writer.write_record([
                record.npi.to_string(),
                record.state.clone(),
                record.usage_minutes.to_string(),
                record.region.clone(),
                record.specialty.clone(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

/// Pick the writer for a format
pub fn exporter_for(format: OutputFormat, max_rows_per_group: Option<usize>) -> Box<dyn ResultExporter> {
    match format {
        OutputFormat::Table => Box::new(TableExporter::new().with_max_rows(max_rows_per_group)),
        OutputFormat::Json => Box::new(JsonExporter::default()),
        OutputFormat::Csv => Box::new(CsvExporter),
    }
}

/// Render results into a string
pub fn render(results: &ResultSet<'_>, format: OutputFormat) -> Result<String> {
    let mut buffer = Vec::new();
    exporter_for(format, None).write_results(results, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| FinderError::Export {
        message: e.to_string(),
        format,
        suggestion: None,
    })
}

/// Write results to a file
///
/// Table output is only meant for terminals, so it is refused here.
pub fn export_to_file<P: AsRef<Path>>(results: &ResultSet<'_>, path: P, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    let exporter = exporter_for(format, None);
    if exporter.format() == OutputFormat::Table {
        return Err(FinderError::Export {
            message: "Table output cannot be exported to a file".to_string(),
            format: exporter.format(),
            suggestion: Some("Use --format json or --format csv".to_string()),
        });
    }

    let file = File::create(path).map_err(|e| FinderError::Export {
        message: format!("Cannot create {}: {}", path.display(), e),
        format,
        suggestion: Some("Check that the output directory exists and is writable".to_string()),
    })?;
    let mut writer = BufWriter::new(file);
    exporter.write_results(results, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::*;
    use crate::filter::filter;

    fn sample() -> Vec<DoctorRecord> {
        vec![
            DoctorRecord::new(1234567890, "NY", 30.4, "East", "Cardiology"),
            DoctorRecord::new(2, "CA", 45.0, "West", "Cardiology"),
        ]
    }

    #[test]
    fn test_table_formats_npi_and_usage() {
        let data = sample();
        let results = filter(&data, &Query::from_inputs("Cardiology", None)).unwrap();
        let text = render(&results, OutputFormat::Table).unwrap();
        assert!(text.contains("### East"));
        assert!(text.contains("### West"));
        assert!(text.contains("1234567890"));
        assert!(text.contains("30 mins"));
        assert!(text.contains("NPI"));
        assert!(text.contains("Usage Time (mins)"));
    }

    #[test]
    fn test_table_skips_empty_groups() {
        let data = sample();
        let results = filter(&data, &Query::from_inputs("Cardiology", Some("South"))).unwrap();
        let text = render(&results, OutputFormat::Table).unwrap();
        assert_eq!(text.trim(), NO_MATCH_MESSAGE);
        assert!(!text.contains("### South"));
    }

    #[test]
    fn test_table_row_limit() {
        let data = vec![
            DoctorRecord::new(1, "NY", 1.0, "East", "Cardiology"),
            DoctorRecord::new(2, "NY", 1.0, "East", "Cardiology"),
            DoctorRecord::new(3, "NY", 1.0, "East", "Cardiology"),
        ];
        let results = filter(&data, &Query::from_inputs("Cardiology", None)).unwrap();
        let mut out = Vec::new();
        TableExporter::new().with_max_rows(Some(2)).write_results(&results, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("... 1 more"));
    }

    #[test]
    fn test_json_groups() {
        let data = sample();
        let results = filter(&data, &Query::from_inputs("Cardiology", Some("West"))).unwrap();
        let json: serde_json::Value = serde_json::from_str(&render(&results, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["region"], "West");
        assert_eq!(json[0]["rows"][0]["npi"], 2);
    }

    #[test]
    fn test_csv_rows() {
        let data = sample();
        let results = filter(&data, &Query::from_inputs("Cardiology", None)).unwrap();
        let text = render(&results, OutputFormat::Csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("NPI,State,Usage Time (mins),Region,Speciality"));
        assert_eq!(lines.next(), Some("1234567890,NY,30.4,East,Cardiology"));
        assert_eq!(lines.next(), Some("2,CA,45,West,Cardiology"));
    }

    #[test]
    fn test_exporter_for_reports_format() {
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Csv] {
            assert_eq!(exporter_for(format, None).format(), format);
        }
    }

    #[test]
    fn test_table_file_export_refused() {
        let data = sample();
        let results = filter(&data, &Query::from_inputs("Cardiology", None)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = export_to_file(&results, dir.path().join("out.txt"), OutputFormat::Table).unwrap_err();
        assert!(!err.is_fatal());
    }
}
