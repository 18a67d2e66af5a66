/*!
 * Interactive search form
 *
 * Prompts for a specialty and an optional region, shows the matching doctors
 * grouped by region, and repeats until the input ends or the user quits.
 */

use std::io::{BufRead, Write};
use log::debug;

use crate::Result;
use crate::dataset::PanelDataset;
use crate::data_types::Query;
use crate::export::{ResultExporter, TableExporter, NO_MATCH_MESSAGE};

/// Counters for a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Searches that ran against the panel
    pub searches: usize,
    /// Searches that matched no doctor
    pub no_match: usize,
    /// Submissions rejected for a blank specialty
    pub rejected: usize,
}

/// Interactive search form over a loaded panel
pub struct Session<'d> {
    dataset: &'d PanelDataset,
    exporter: TableExporter,
}

impl<'d> Session<'d> {
    pub fn new(dataset: &'d PanelDataset) -> Self {
        Self {
            dataset,
            exporter: TableExporter::new(),
        }
    }

    /// Limit rows shown per region
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.exporter = self.exporter.with_max_rows(max_rows);
        self
    }

    /// Run the form until EOF, `quit` or `exit`
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> Result<SessionSummary> {
        let specialties = self.dataset.specialties();
        let regions = self.dataset.region_options();
        let mut summary = SessionSummary::default();

        writeln!(out, "Doctor Finder")?;
        write_options(&mut out, "Specialties", &specialties)?;
        write_options(&mut out, "Regions", &regions)?;

        loop {
            let Some(answer) = prompt(&mut input, &mut out, "Specialty (required): ")? else {
                break;
            };
            if is_quit(&answer) {
                break;
            }
            let specialty = pick(&answer, &specialties);
            if let Err(e) = Query::from_inputs(&specialty, None).validate() {
                summary.rejected += 1;
                writeln!(out, "Error: {}\n", e)?;
                continue;
            }

            let Some(answer) = prompt(&mut input, &mut out, "Region (optional, Enter for All Regions): ")? else {
                break;
            };
            if is_quit(&answer) {
                break;
            }
            let region = pick(&answer, &regions);

            let query = Query::from_inputs(&specialty, Some(&region));
            match self.dataset.run(&query) {
                Ok(results) => {
                    summary.searches += 1;
                    if results.is_no_match() {
                        summary.no_match += 1;
                        writeln!(out, "Warning: {}\n", NO_MATCH_MESSAGE)?;
                    } else {
                        self.exporter.write_results(&results, &mut out)?;
                    }
                }
                Err(e) if !e.is_fatal() => {
                    summary.rejected += 1;
                    writeln!(out, "Error: {}\n", e.user_message())?;
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Session ended: {:?}", summary);
        Ok(summary)
    }
}

fn write_options<W: Write>(out: &mut W, title: &str, options: &[&str]) -> Result<()> {
    writeln!(out, "\n{}:", title)?;
    for (index, option) in options.iter().enumerate() {
        writeln!(out, "  {}. {}", index + 1, option)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Print a prompt and read one trimmed line, `None` at end of input
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_quit(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("quit") || answer.eq_ignore_ascii_case("exit")
}

/// Resolve a 1-based option number, or take the answer as typed
fn pick(answer: &str, options: &[&str]) -> String {
    answer.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .map(|s| s.to_string())
        .unwrap_or_else(|| answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::DoctorRecord;
    use std::io::Cursor;

    fn dataset() -> PanelDataset {
        PanelDataset::from_records(vec![
            DoctorRecord::new(1, "NY", 30.0, "East", "Cardiology"),
            DoctorRecord::new(2, "CA", 45.0, "West", "Cardiology"),
            DoctorRecord::new(3, "MA", 10.0, "East", "Neurology"),
        ])
    }

    fn run(script: &str) -> (SessionSummary, String) {
        let ds = dataset();
        let mut out = Vec::new();
        let summary = Session::new(&ds).run(Cursor::new(script.to_string()), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_lists_selector_values() {
        let (_, out) = run("");
        assert!(out.contains("  1. Cardiology"));
        assert!(out.contains("  2. Neurology"));
        assert!(out.contains("  1. All Regions"));
        assert!(out.contains("  3. West"));
    }

    #[test]
    fn test_search_by_name_all_regions() {
        let (summary, out) = run("Cardiology\n\nquit\n");
        assert_eq!(summary.searches, 1);
        assert!(out.contains("### East"));
        assert!(out.contains("### West"));
    }

    #[test]
    fn test_search_by_number() {
        let (summary, out) = run("1\n3\n");
        assert_eq!(summary, SessionSummary { searches: 1, no_match: 0, rejected: 0 });
        assert!(out.contains("### West"));
        assert!(!out.contains("### East"));
    }

    #[test]
    fn test_blank_specialty_reprompts() {
        let (summary, out) = run("\n   \nNeurology\nWest\nexit\n");
        assert_eq!(summary, SessionSummary { searches: 1, no_match: 1, rejected: 2 });
        assert_eq!(out.matches("Error: Please select a specialty.").count(), 2);
        assert!(out.contains("Warning: No doctors found for the given criteria."));
    }

    #[test]
    fn test_blank_specialty_skips_region_prompt() {
        let (_, out) = run("\n");
        assert_eq!(out.matches("Specialty (required): ").count(), 2);
        assert!(!out.contains("Region (optional"));
    }

    #[test]
    fn test_pick() {
        let options = ["All Regions", "East"];
        assert_eq!(pick("2", &options), "East");
        assert_eq!(pick("0", &options), "0");
        assert_eq!(pick("9", &options), "9");
        assert_eq!(pick("East", &options), "East");
    }
}
