//! Whole-table row sorting.
//!
//! Sorting by several names applies successive stable single-column sorts,
//! each of which rewrites the *entire* row order via the store's
//! permutation primitive. The observable consequence: the last-sorted
//! name dominates, and earlier names only break ties that the later sorts
//! preserve through stability. This order sensitivity is the contract,
//! tested explicitly, not an accident to be fixed into a composite-key
//! sort.

use crate::column::SortOptions;
use crate::error::Result;
use crate::table::Table;

impl Table {
    /// Sort rows by each of `names` in turn (stable per column).
    ///
    /// Absent values sort to the front. With `asc: false` the present
    /// partition is reversed.
    pub fn sort_by_names(&mut self, names: &[&str], asc: bool) -> Result<()> {
        let options = SortOptions {
            nils_first: true,
            asc,
        };
        for name in names {
            let permutation = self.column(name)?.sort_permutation(options);
            self.store_mut().subset_to(&permutation);
            self.sync();
        }
        Ok(())
    }

    /// Non-mutating form of [`Table::sort_by_names`].
    pub fn sorted_by_names(&self, names: &[&str], asc: bool) -> Result<Table> {
        let mut out = self.clone();
        out.sort_by_names(names, asc)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::table::Table;
    use crate::value::Value;

    fn ints(vals: &[i64]) -> Vec<Value> {
        vals.iter().map(|&v| Value::Int(v)).collect()
    }

    #[test]
    fn single_key_sort_reorders_every_column() {
        let mut table = Table::from_pairs(vec![
            ("k".to_string(), ints(&[3, 1, 2])),
            ("v".to_string(), ints(&[30, 10, 20])),
        ])
        .unwrap();
        table.sort_by_names(&["k"], true).unwrap();
        assert_eq!(table.column("k").unwrap(), &ints(&[1, 2, 3]));
        assert_eq!(table.column("v").unwrap(), &ints(&[10, 20, 30]));
    }

    #[test]
    fn descending_sort_reverses_present_partition() {
        let mut table = Table::from_pairs(vec![(
            "k".to_string(),
            vec![Value::Int(2), Value::Nil, Value::Int(0), Value::Int(1)],
        )])
        .unwrap();
        table.sort_by_names(&["k"], false).unwrap();
        assert_eq!(
            table.column("k").unwrap(),
            &vec![Value::Nil, Value::Int(2), Value::Int(1), Value::Int(0)]
        );
    }

    #[test]
    fn sort_last_key_dominates() {
        let mut table = Table::from_pairs(vec![
            ("a".to_string(), ints(&[2, 1, 2, 1])),
            ("b".to_string(), ints(&[9, 8, 7, 6])),
        ])
        .unwrap();
        table.sort_by_names(&["b", "a"], true).unwrap();
        // The later sort (by `a`) is the dominant order; the earlier sort
        // (by `b`) survives only as tie-break order within equal `a`.
        assert_eq!(table.column("a").unwrap(), &ints(&[1, 1, 2, 2]));
        assert_eq!(table.column("b").unwrap(), &ints(&[6, 8, 7, 9]));
    }

    #[test]
    fn non_mutating_sort_leaves_the_original() {
        let table = Table::from_pairs(vec![("k".to_string(), ints(&[2, 1]))]).unwrap();
        let sorted = table.sorted_by_names(&["k"], true).unwrap();
        assert_eq!(table.column("k").unwrap(), &ints(&[2, 1]));
        assert_eq!(sorted.column("k").unwrap(), &ints(&[1, 2]));
    }
}
