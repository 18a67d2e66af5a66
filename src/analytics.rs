/*!
 * Summary statistics for the doctor panel
 *
 * Counts and usage-time aggregates by specialty and by region.
 */

use std::collections::BTreeMap;
use serde::Serialize;

use crate::data_types::*;

/// Analytics engine over a borrowed slice of records
pub struct PanelAnalytics<'a> {
    records: &'a [DoctorRecord],
}

/// Doctor count and usage time for one bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub doctors: usize,
    pub total_minutes: f64,
}

impl UsageSummary {
    fn add(&mut self, record: &DoctorRecord) {
        self.doctors += 1;
        self.total_minutes += record.usage_minutes;
    }

    /// Mean usage per doctor, zero for an empty bucket
    pub fn mean_minutes(&self) -> f64 {
        if self.doctors == 0 {
            0.0
        } else {
            self.total_minutes / self.doctors as f64
        }
    }
}

/// Whole-panel statistics
#[derive(Debug, Clone, Serialize)]
pub struct PanelStats {
    pub total: UsageSummary,
    pub unique_npis: usize,
    pub by_specialty: BTreeMap<String, UsageSummary>,
    pub by_region: BTreeMap<String, UsageSummary>,
}

impl<'a> PanelAnalytics<'a> {
    pub fn new(records: &'a [DoctorRecord]) -> Self {
        Self { records }
    }

    /// Compute statistics for the whole panel
    pub fn panel_stats(&self) -> PanelStats {
        let mut total = UsageSummary::default();
        let mut by_specialty: BTreeMap<String, UsageSummary> = BTreeMap::new();
        let mut by_region: BTreeMap<String, UsageSummary> = BTreeMap::new();
        let mut npis = std::collections::HashSet::new();

        for record in self.records {
            total.add(record);
            npis.insert(record.npi);
            by_specialty.entry(record.specialty.clone()).or_default().add(record);
            by_region.entry(record.region.clone()).or_default().add(record);
        }

        PanelStats {
            total,
            unique_npis: npis.len(),
            by_specialty,
            by_region,
        }
    }

    /// Regions with the most doctors of a specialty, largest first
    ///
    /// Ties are broken by region name.
    pub fn top_regions_for_specialty(&self, specialty: &str, limit: usize) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in crate::filter::select(self.records, |r| r.specialty == specialty) {
            *counts.entry(record.region.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter()
            .map(|(region, count)| (region.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// NPIs that appear on more than one row
    pub fn duplicate_npis(&self) -> Vec<Npi> {
        let mut counts: BTreeMap<Npi, usize> = BTreeMap::new();
        for record in self.records {
            *counts.entry(record.npi).or_insert(0) += 1;
        }
        counts.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(npi, _)| npi)
            .collect()
    }
}

impl PanelStats {
    /// Print a formatted summary of the statistics
    pub fn print_summary(&self) {
        println!("=== Doctor Panel Statistics ===");
        println!("Total Rows: {}", self.total.doctors);
        println!("Unique NPIs: {}", self.unique_npis);
        println!("Total Usage: {:.0} mins (mean {:.1} mins)", self.total.total_minutes, self.total.mean_minutes());

        println!("\nBy Specialty:");
        for (specialty, summary) in &self.by_specialty {
            println!("  {}: {} doctors, mean {:.1} mins", specialty, summary.doctors, summary.mean_minutes());
        }

        println!("\nBy Region:");
        for (region, summary) in &self.by_region {
            println!("  {}: {} doctors, mean {:.1} mins", region, summary.doctors, summary.mean_minutes());
        }
    }
}
