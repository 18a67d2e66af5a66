/*!
 * Schema definition for the doctor panel spreadsheet
 *
 * The panel is read by header name, so extra columns and column order do not
 * matter. Only the five columns below are required.
 */

use crate::{FinderError, Result};

/// Panel spreadsheet schema
pub struct PanelSchema;

impl PanelSchema {
    pub const NPI: &'static str = "NPI";
    pub const STATE: &'static str = "State";
    pub const USAGE_TIME: &'static str = "Usage Time (mins)";
    pub const REGION: &'static str = "Region";
    pub const SPECIALITY: &'static str = "Speciality";

    /// Required column names, in display order
    pub fn column_names() -> [&'static str; 5] {
        [
            Self::NPI,
            Self::STATE,
            Self::USAGE_TIME,
            Self::REGION,
            Self::SPECIALITY,
        ]
    }

    /// Locate the required columns in a header row
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<ColumnMap> {
        let find = |name: &str| headers.iter().position(|h| h.as_ref().trim() == name);

        let mut missing = Vec::new();
        let mut index_of = |name: &str| {
            find(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                usize::MAX
            })
        };

        let map = ColumnMap {
            npi: index_of(Self::NPI),
            state: index_of(Self::STATE),
            usage_time: index_of(Self::USAGE_TIME),
            region: index_of(Self::REGION),
            speciality: index_of(Self::SPECIALITY),
        };

        if !missing.is_empty() {
            let found = headers.iter().map(|h| h.as_ref().to_string()).collect();
            return Err(FinderError::missing_columns(missing, found));
        }

        Ok(map)
    }
}

/// Positions of the required columns within a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub npi: usize,
    pub state: usize,
    pub usage_time: usize,
    pub region: usize,
    pub speciality: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_any_order() {
        let headers = ["Region", "Extra", "Speciality", "NPI", " State ", "Usage Time (mins)"];
        let map = PanelSchema::resolve(&headers).unwrap();
        assert_eq!(map.region, 0);
        assert_eq!(map.speciality, 2);
        assert_eq!(map.npi, 3);
        assert_eq!(map.state, 4);
        assert_eq!(map.usage_time, 5);
    }

    #[test]
    fn test_resolve_reports_all_missing() {
        let headers = ["NPI", "State"];
        match PanelSchema::resolve(&headers) {
            Err(FinderError::SchemaMismatch { missing_columns, found_columns, .. }) => {
                assert_eq!(missing_columns, vec!["Usage Time (mins)", "Region", "Speciality"]);
                assert_eq!(found_columns, vec!["NPI", "State"]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }
}
