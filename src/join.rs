use crate::error::{ChartError, Result};
use crate::types::EducationRecord;
use std::collections::HashMap;

/// O(1) lookup from county fips to its education record, built once at load
/// time. On duplicate fips the first record in dataset order wins.
#[derive(Debug)]
pub struct JoinIndex {
    by_fips: HashMap<u32, EducationRecord>,
}

impl JoinIndex {
    pub fn new(records: &[EducationRecord]) -> Self {
        let mut by_fips = HashMap::with_capacity(records.len());
        for record in records {
            by_fips.entry(record.fips).or_insert_with(|| record.clone());
        }
        Self { by_fips }
    }

    /// Resolves a county identifier. A miss is a `JoinMismatch`, never a
    /// default record.
    pub fn lookup(&self, fips: u32) -> Result<&EducationRecord> {
        self.by_fips
            .get(&fips)
            .ok_or(ChartError::JoinMismatch { fips })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(fips: u32, name: &str, pct: f64) -> EducationRecord {
        EducationRecord {
            fips,
            area_name: name.to_string(),
            state: "TS".to_string(),
            bachelors_or_higher: pct,
        }
    }

    #[test]
    fn repeated_lookups_return_equal_records() {
        let index = JoinIndex::new(&[rec(1, "A", 10.0), rec(2, "B", 50.0)]);
        let first = index.lookup(2).unwrap().clone();
        let second = index.lookup(2).unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn missing_fips_is_a_join_mismatch() {
        let index = JoinIndex::new(&[rec(1, "A", 10.0)]);
        match index.lookup(4) {
            Err(ChartError::JoinMismatch { fips }) => assert_eq!(fips, 4),
            other => panic!("expected JoinMismatch, got {:?}", other),
        }
    }

    #[test]
    fn first_record_wins_on_duplicate_fips() {
        let index = JoinIndex::new(&[rec(7, "First", 12.0), rec(7, "Second", 99.0)]);
        let found = index.lookup(7).unwrap();
        assert_eq!(found.area_name, "First");
        assert_eq!(found.bachelors_or_higher, 12.0);
    }
}
