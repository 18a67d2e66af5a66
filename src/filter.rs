/*!
 * Specialty and region filtering
 *
 * The filter selects every record with the requested specialty, then either
 * partitions the matches by region or narrows them to a single region.
 */

use std::collections::BTreeMap;
use log::debug;
use serde::Serialize;

use crate::{Result, data_types::*};

/// Matching records for one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionGroup<'a> {
    pub region: String,
    pub rows: Vec<&'a DoctorRecord>,
}

impl RegionGroup<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Filter output: region groups in ascending region order
///
/// Empty groups are kept so callers can tell which region was asked for;
/// use [`ResultSet::non_empty_groups`] for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet<'a> {
    pub groups: Vec<RegionGroup<'a>>,
}

impl<'a> ResultSet<'a> {
    /// Groups that hold at least one row
    pub fn non_empty_groups(&self) -> impl Iterator<Item = &RegionGroup<'a>> {
        self.groups.iter().filter(|g| !g.is_empty())
    }

    /// Total rows across every group
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(RegionGroup::len).sum()
    }

    /// True when no group holds any row
    pub fn is_no_match(&self) -> bool {
        self.total_rows() == 0
    }

    pub fn region_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.region.as_str()).collect()
    }

    /// All rows in group order
    pub fn rows(&self) -> impl Iterator<Item = &'a DoctorRecord> + '_ {
        self.groups.iter().flat_map(|g| g.rows.iter().copied())
    }
}

/// Run a query against a slice of records
///
/// Fails with `MissingSpecialty` before touching the data if the specialty
/// is blank. Specialty and region comparisons are exact and case-sensitive.
pub fn filter<'a>(records: &'a [DoctorRecord], query: &Query) -> Result<ResultSet<'a>> {
    query.validate()?;

    let by_specialty = select(records, |r| r.specialty == query.specialty);

    let groups = match &query.region {
        RegionFilter::All => group_by_region(by_specialty),
        RegionFilter::Only(region) => vec![RegionGroup {
            region: region.clone(),
            rows: by_specialty.into_iter().filter(|r| &r.region == region).collect(),
        }],
    };

    let result = ResultSet { groups };
    debug!(
        "Query ({}, {}) matched {} rows in {} regions",
        query.specialty,
        query.region,
        result.total_rows(),
        result.non_empty_groups().count()
    );
    Ok(result)
}

/// Partition rows by region, keeping dataset order within each region
///
/// Rows with a blank region belong to no group and are left out.
pub fn group_by_region(rows: Vec<&DoctorRecord>) -> Vec<RegionGroup<'_>> {
    let mut by_region: BTreeMap<&str, Vec<&DoctorRecord>> = BTreeMap::new();
    for row in rows.into_iter().filter(|r| r.has_region()) {
        by_region.entry(row.region.as_str()).or_default().push(row);
    }

    by_region.into_iter()
        .map(|(region, rows)| RegionGroup { region: region.to_string(), rows })
        .collect()
}

/// Order-preserving selection, parallel when the `parallel` feature is on
pub(crate) fn select<'a, F>(records: &'a [DoctorRecord], predicate: F) -> Vec<&'a DoctorRecord>
where
    F: Fn(&DoctorRecord) -> bool + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        records.par_iter()
            .filter(|r| predicate(r))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        records.iter()
            .filter(|r| predicate(r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FinderError;

    fn sample() -> Vec<DoctorRecord> {
        vec![
            DoctorRecord::new(1, "NY", 30.0, "East", "Cardiology"),
            DoctorRecord::new(2, "CA", 45.0, "West", "Cardiology"),
            DoctorRecord::new(3, "MA", 10.0, "East", "Neurology"),
        ]
    }

    #[test]
    fn test_all_regions_groups_sorted() {
        let data = sample();
        let result = filter(&data, &Query::from_inputs("Cardiology", Some("All Regions"))).unwrap();
        assert_eq!(result.region_names(), vec!["East", "West"]);
        assert_eq!(result.groups[0].rows, vec![&data[0]]);
        assert_eq!(result.groups[1].rows, vec![&data[1]]);
    }

    #[test]
    fn test_single_region() {
        let data = sample();
        let result = filter(&data, &Query::from_inputs("Cardiology", Some("West"))).unwrap();
        assert_eq!(result.region_names(), vec!["West"]);
        assert_eq!(result.groups[0].rows, vec![&data[1]]);
    }

    #[test]
    fn test_no_match_keeps_requested_group() {
        let data = sample();
        let result = filter(&data, &Query::from_inputs("Neurology", Some("West"))).unwrap();
        assert_eq!(result.groups.len(), 1);
        assert!(result.groups[0].is_empty());
        assert_eq!(result.non_empty_groups().count(), 0);
        assert!(result.is_no_match());
    }

    #[test]
    fn test_unknown_specialty_is_no_match() {
        let data = sample();
        let result = filter(&data, &Query::from_inputs("Dermatology", None)).unwrap();
        assert!(result.groups.is_empty());
        assert!(result.is_no_match());
    }

    #[test]
    fn test_specialty_is_case_sensitive() {
        let data = sample();
        let result = filter(&data, &Query::from_inputs("cardiology", None)).unwrap();
        assert!(result.is_no_match());
    }

    #[test]
    fn test_empty_specialty_rejected() {
        let data = sample();
        let err = filter(&data, &Query::from_inputs("", None)).unwrap_err();
        assert!(matches!(err, FinderError::MissingSpecialty));
    }

    #[test]
    fn test_idempotent() {
        let data = sample();
        let query = Query::from_inputs("Cardiology", None);
        assert_eq!(filter(&data, &query).unwrap(), filter(&data, &query).unwrap());
    }

    #[test]
    fn test_group_keeps_dataset_order() {
        let data = vec![
            DoctorRecord::new(9, "NY", 1.0, "East", "Cardiology"),
            DoctorRecord::new(4, "NJ", 2.0, "East", "Cardiology"),
            DoctorRecord::new(7, "CT", 3.0, "East", "Cardiology"),
        ];
        let result = filter(&data, &Query::from_inputs("Cardiology", None)).unwrap();
        let npis: Vec<u64> = result.rows().map(|r| r.npi.value()).collect();
        assert_eq!(npis, vec![9, 4, 7]);
    }

    #[test]
    fn test_blank_region_left_out_of_grouping() {
        let data = vec![
            DoctorRecord::new(1, "NY", 30.0, "", "Cardiology"),
            DoctorRecord::new(2, "MA", 10.0, "East", "Cardiology"),
        ];
        let result = filter(&data, &Query::from_inputs("Cardiology", None)).unwrap();
        assert_eq!(result.region_names(), vec!["East"]);
        assert_eq!(result.groups[0].rows, vec![&data[1]]);
    }
}
