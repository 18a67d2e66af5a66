/*!
 * # Doctor Finder
 *
 * Look up doctors in a provider panel spreadsheet by medical specialty and,
 * optionally, region. Matches are grouped by region in ascending order.
 *
 * ## Quick Start
 *
 * ```no_run
 * use doctor_finder::prelude::*;
 *
 * # fn main() -> Result<()> {
 * let dataset = PanelDataset::load("panel_data.xlsx")?;
 *
 * let results = dataset.search("Cardiology", Some("All Regions"))?;
 * if results.is_no_match() {
 *     println!("No doctors found for the given criteria.");
 * }
 * for group in results.non_empty_groups() {
 *     println!("{}: {} doctors", group.region, group.len());
 * }
 * # Ok(())
 * # }
 * ```
 *
 * ## Panel File
 *
 * The panel is a `.xlsx`/`.xls`/`.ods` workbook (first sheet) or a `.csv`
 * file with at least these columns:
 *
 * - `NPI`
 * - `State`
 * - `Usage Time (mins)`
 * - `Region`
 * - `Speciality`
 *
 * ## Caching
 *
 * [`dataset::load_cached`] reads the panel once and returns the same
 * `&'static PanelDataset` for the rest of the process.
 *
 * ## Configuration
 *
 * ```no_run
 * # use doctor_finder::prelude::*;
 * let config = ConfigBuilder::new()
 *     .data_path("panel_data.xlsx")
 *     .progress_bar(false)
 *     .skip_invalid_records(true)
 *     .build();
 * doctor_finder::config::set_global_config(config);
 * ```
 */

// Re-export error types from root
pub use error::{FinderError, Result, ErrorContext, OutputFormat};

// Public modules
pub mod data_types;
pub mod reader;
pub mod schema;
pub mod error;
pub mod filter;
pub mod analytics;
pub mod dataset;
pub mod export;
pub mod config;
pub mod session;

/// Prelude module for convenient imports
///
/// ```
/// use doctor_finder::prelude::*;
/// ```
pub mod prelude {
    pub use crate::data_types::*;
    pub use crate::reader::{PanelReader, LoadReport};
    pub use crate::schema::PanelSchema;
    pub use crate::error::{FinderError, Result};
    pub use crate::filter::{filter, RegionGroup, ResultSet};
    pub use crate::analytics::{PanelAnalytics, PanelStats};
    pub use crate::dataset::{PanelDataset, PanelDatasetBuilder, QueryBuilder};
    pub use crate::export::{ResultExporter, TableExporter, JsonExporter, CsvExporter};
    pub use crate::config::{ConfigBuilder, FinderConfig};
    pub use crate::session::Session;
    pub use crate::OutputFormat;
}

/// Panel constants
pub mod constants {
    /// Region selector value meaning "no region filter"
    pub const ALL_REGIONS: &str = "All Regions";

    /// Panel file name used when nothing else is configured
    pub const DEFAULT_PANEL_FILE: &str = "panel_data.xlsx";
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_worked_example() {
        let dataset = PanelDataset::from_records(vec![
            DoctorRecord::new(1, "NY", 10.0, "East", "Cardiology"),
            DoctorRecord::new(2, "CA", 20.0, "West", "Cardiology"),
            DoctorRecord::new(3, "MA", 30.0, "East", "Neurology"),
        ]);

        let all = dataset.search("Cardiology", Some("All Regions")).unwrap();
        assert_eq!(all.region_names(), vec!["East", "West"]);
        assert_eq!(all.groups[0].rows[0].npi, Npi(1));
        assert_eq!(all.groups[1].rows[0].npi, Npi(2));

        let west = dataset.search("Cardiology", Some("West")).unwrap();
        assert_eq!(west.region_names(), vec!["West"]);
        assert_eq!(west.groups[0].rows[0].npi, Npi(2));

        let none = dataset.search("Neurology", Some("West")).unwrap();
        assert_eq!(none.non_empty_groups().count(), 0);
        assert!(none.is_no_match());
    }
}
