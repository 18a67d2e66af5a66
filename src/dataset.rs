/*!
 * Panel dataset API
 *
 * Provides a builder for loading the panel, the process-wide cached copy,
 * the selector values shown to the user, and a query builder.
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use log::info;

use crate::{Result, FinderError};
use crate::constants::ALL_REGIONS;
use crate::data_types::*;
use crate::filter::{self, ResultSet};
use crate::reader::PanelReader;
use crate::analytics::PanelAnalytics;

static CACHED_DATASET: OnceLock<PanelDataset> = OnceLock::new();

/// Load the panel once per process and hand out the cached copy afterwards
///
/// Only a successful load is cached, so a missing file can be fixed and
/// retried. Once cached, `path` is ignored; there is no invalidation short of
/// restarting the process.
pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<&'static PanelDataset> {
    if let Some(dataset) = CACHED_DATASET.get() {
        return Ok(dataset);
    }

    let dataset = PanelDatasetBuilder::from_config().data(path).build()?;
    Ok(CACHED_DATASET.get_or_init(|| dataset))
}

/// Builder for loading a panel dataset
///
/// # Example
/// ```no_run
/// # use doctor_finder::dataset::PanelDatasetBuilder;
/// let dataset = PanelDatasetBuilder::new()
///     .data("panel_data.xlsx")
///     .skip_invalid_records(true)
///     .build()?;
/// # Ok::<(), doctor_finder::FinderError>(())
/// ```
pub struct PanelDatasetBuilder {
    data_path: Option<PathBuf>,
    skip_invalid_records: bool,
    show_progress: bool,
}

impl Default for PanelDatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelDatasetBuilder {
    /// Create a new dataset builder
    pub fn new() -> Self {
        Self {
            data_path: None,
            skip_invalid_records: false,
            show_progress: true,
        }
    }

    /// Start from the global configuration
    pub fn from_config() -> Self {
        let config = crate::config::global_config();
        let builder = Self::new()
            .skip_invalid_records(config.skip_invalid_records)
            .show_progress(config.enable_progress_bar);
        match config.data_path {
            Some(path) => builder.data(path),
            None => builder,
        }
    }

    /// Set the path to the panel file
    pub fn data<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable skipping invalid rows
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.skip_invalid_records = skip;
        self
    }

    /// Enable or disable the loading spinner
    ///
    /// Has no effect without the `progress` feature.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Build the dataset, reading the panel file
    pub fn build(self) -> Result<PanelDataset> {
        let path = self.data_path
            .ok_or_else(|| FinderError::Custom {
                message: "Panel data file path not specified".to_string(),
                suggestion: Some("Pass --data, set DOCFINDER_DATA_PATH, or set data_path in the config file".to_string()),
            })?;

        info!("Loading panel from {}", path.display());

        let reader = PanelReader::new()
            .with_skip_invalid_records(self.skip_invalid_records);
        #[cfg(feature = "progress")]
        let reader = reader.with_progress_bar(self.show_progress);
        #[cfg(not(feature = "progress"))]
        let _ = self.show_progress;

        let report = reader.load(&path)?;
        Ok(PanelDataset {
            records: report.records,
            skipped_rows: report.skipped_rows,
            source: Some(path),
        })
    }
}

/// Immutable in-memory doctor panel
#[derive(Debug, Clone, Default)]
pub struct PanelDataset {
    pub records: Vec<DoctorRecord>,
    /// Rows dropped while loading
    pub skipped_rows: usize,
    /// File the panel was read from, if any
    pub source: Option<PathBuf>,
}

impl PanelDataset {
    /// Load a panel with default settings
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        PanelDatasetBuilder::new().data(path).build()
    }

    /// Wrap records that are already in memory
    pub fn from_records(records: Vec<DoctorRecord>) -> Self {
        Self {
            records,
            skipped_rows: 0,
            source: None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct specialties, sorted
    pub fn specialties(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|r| r.specialty.as_str()))
    }

    /// Distinct non-blank regions, sorted
    pub fn regions(&self) -> Vec<&str> {
        distinct(self.records.iter().filter(|r| r.has_region()).map(|r| r.region.as_str()))
    }

    /// Region selector values: the "All Regions" sentinel, then every region
    pub fn region_options(&self) -> Vec<&str> {
        let mut options = vec![ALL_REGIONS];
        options.extend(self.regions());
        options
    }

    /// Find doctors by specialty and optional region
    ///
    /// `region` of `None`, `""` or `"All Regions"` groups results by region.
    pub fn search(&self, specialty: &str, region: Option<&str>) -> Result<ResultSet<'_>> {
        filter::filter(&self.records, &Query::from_inputs(specialty, region))
    }

    /// Run a prepared query
    pub fn run(&self, query: &Query) -> Result<ResultSet<'_>> {
        filter::filter(&self.records, query)
    }

    /// Create a query builder for this dataset
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    /// Create an analytics engine for this dataset
    pub fn analytics(&self) -> PanelAnalytics<'_> {
        PanelAnalytics::new(&self.records)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Query builder for the panel
///
/// ```no_run
/// # use doctor_finder::prelude::*;
/// # fn main() -> Result<()> {
/// # let dataset = PanelDataset::load("panel_data.xlsx")?;
/// let results = dataset.query()
///     .specialty("Cardiology")
///     .region("Northeast")
///     .state("NY")
///     .execute()?;
/// # Ok(())
/// # }
/// ```
pub struct QueryBuilder<'a> {
    dataset: &'a PanelDataset,
    specialty: String,
    region: RegionFilter,
    state: Option<String>,
}

impl<'a> QueryBuilder<'a> {
    /// Create a new query builder
    pub fn new(dataset: &'a PanelDataset) -> Self {
        Self {
            dataset,
            specialty: String::new(),
            region: RegionFilter::All,
            state: None,
        }
    }

    /// Filter by specialty (required)
    pub fn specialty(mut self, specialty: &str) -> Self {
        self.specialty = specialty.trim().to_string();
        self
    }

    /// Filter by region; "All Regions" clears the filter
    pub fn region(mut self, region: &str) -> Self {
        self.region = RegionFilter::from_option(Some(region));
        self
    }

    /// Filter by state code, exact match
    pub fn state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    /// Execute the query
    pub fn execute(self) -> Result<ResultSet<'a>> {
        let query = Query::new(self.specialty, self.region);
        let mut result = filter::filter(&self.dataset.records, &query)?;
        if let Some(state) = self.state {
            for group in &mut result.groups {
                group.rows.retain(|r| r.state == state);
            }
        }
        Ok(result)
    }

    /// Execute the query and return the number of matching rows
    pub fn count(self) -> Result<usize> {
        Ok(self.execute()?.total_rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> PanelDataset {
        PanelDataset::from_records(vec![
            DoctorRecord::new(1, "NY", 30.0, "Northeast", "Cardiology"),
            DoctorRecord::new(2, "CA", 45.0, "West", "Cardiology"),
            DoctorRecord::new(3, "MA", 10.0, "Northeast", "Neurology"),
            DoctorRecord::new(4, "TX", 5.0, "South", "Cardiology"),
            DoctorRecord::new(5, "NJ", 25.0, "Northeast", "Cardiology"),
        ])
    }

    #[test]
    fn test_selector_values() {
        let ds = dataset();
        assert_eq!(ds.specialties(), vec!["Cardiology", "Neurology"]);
        assert_eq!(ds.regions(), vec!["Northeast", "South", "West"]);
        assert_eq!(ds.region_options(), vec!["All Regions", "Northeast", "South", "West"]);
    }

    #[test]
    fn test_search_partitions_specialty() {
        let ds = dataset();
        let result = ds.search("Cardiology", None).unwrap();
        assert_eq!(result.region_names(), vec!["Northeast", "South", "West"]);
        assert_eq!(result.total_rows(), 4);
        assert!(result.rows().all(|r| r.specialty == "Cardiology"));
    }

    #[test]
    fn test_query_builder_state() {
        let ds = dataset();
        let result = ds.query()
            .specialty("Cardiology")
            .region("Northeast")
            .state("NJ")
            .execute()
            .unwrap();
        let npis: Vec<u64> = result.rows().map(|r| r.npi.value()).collect();
        assert_eq!(npis, vec![5]);
    }

    #[test]
    fn test_query_builder_requires_specialty() {
        let ds = dataset();
        assert!(matches!(ds.query().region("West").count(), Err(FinderError::MissingSpecialty)));
    }

    #[test]
    fn test_blank_region_not_offered_or_grouped() {
        let ds = PanelDataset::from_records(vec![
            DoctorRecord::new(1, "NY", 30.0, "", "Cardiology"),
            DoctorRecord::new(2, "MA", 20.0, "East", "Cardiology"),
        ]);
        assert_eq!(ds.region_options(), vec!["All Regions", "East"]);

        let result = ds.search("Cardiology", None).unwrap();
        assert_eq!(result.region_names(), vec!["East"]);
        assert_eq!(result.total_rows(), 1);
    }

    #[test]
    fn test_builder_without_path() {
        assert!(PanelDatasetBuilder::new().build().is_err());
    }
}
