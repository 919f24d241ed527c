//! Grouping rows by key tuples.
//!
//! `group_indexes` partitions row positions by the tuple of values at the
//! named columns (or by a caller-supplied key function over the row
//! cursor). Tuple equality uses the hashable key form of each value, so
//! numeric sentinels group together. Key order is the insertion order of
//! first occurrence. `group_by` materializes the same partition into
//! sub-tables.

use std::collections::HashMap;

use crate::error::Result;
use crate::row::{RowRef, RowView};
use crate::table::Table;
use crate::value::{Value, ValueKey};

/// One key group: the key's value tuple and the row positions sharing it.
pub type KeyGroup = (Vec<Value>, Vec<usize>);

impl Table {
    /// Group row positions by the value tuple at `names`, in
    /// first-occurrence key order.
    pub fn group_indexes(&self, names: &[&str]) -> Result<Vec<KeyGroup>> {
        // Resolve once so an unknown name fails before any scanning.
        let columns: Vec<&crate::column::Column> =
            names.iter().map(|n| self.column(n)).collect::<Result<_>>()?;

        let mut groups: Vec<KeyGroup> = Vec::new();
        let mut slots: HashMap<Vec<ValueKey>, usize> = HashMap::new();
        for i in 0..self.nrow() {
            let tuple: Vec<Value> = columns
                .iter()
                .map(|c| c.values()[i].clone())
                .collect();
            let key: Vec<ValueKey> = tuple.iter().map(Value::key).collect();
            match slots.get(&key) {
                Some(&slot) => groups[slot].1.push(i),
                None => {
                    slots.insert(key, groups.len());
                    groups.push((tuple, vec![i]));
                }
            }
        }
        Ok(groups)
    }

    /// Group row positions by the result of `key_fn` applied to each row.
    pub fn group_indexes_by<F>(&self, mut key_fn: F) -> Vec<(Value, Vec<usize>)>
    where
        F: FnMut(&RowRef<'_>) -> Value,
    {
        let mut scratch = RowView::new();
        scratch.resync_accessors(self.store().names(), self.store().generation());

        let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
        let mut slots: HashMap<ValueKey, usize> = HashMap::new();
        for i in 0..self.nrow() {
            if scratch.set_position(i as i64, self.nrow()).is_err() {
                continue;
            }
            let value = key_fn(&RowRef::new(self.store(), &scratch));
            match slots.get(&value.key()) {
                Some(&slot) => groups[slot].1.push(i),
                None => {
                    slots.insert(value.key(), groups.len());
                    groups.push((value, vec![i]));
                }
            }
        }
        groups
    }

    /// The grouping of [`Table::group_indexes`] materialized into
    /// sub-tables via row-subset extraction.
    pub fn group_by(&self, names: &[&str]) -> Result<Vec<(Vec<Value>, Table)>> {
        Ok(self
            .group_indexes(names)?
            .into_iter()
            .map(|(key, positions)| (key, self.subset_rows(&positions)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> Table {
        Table::from_pairs(vec![
            (
                "city".to_string(),
                vec![
                    Value::from("oslo"),
                    Value::from("bergen"),
                    Value::from("oslo"),
                    Value::from("oslo"),
                    Value::from("bergen"),
                ],
            ),
            (
                "qty".to_string(),
                vec![
                    Value::Int(1),
                    Value::Int(2),
                    Value::Int(3),
                    Value::Int(4),
                    Value::Int(5),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn group_indexes_keeps_first_occurrence_key_order() {
        let groups = orders().group_indexes(&["city"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, vec![Value::from("oslo")]);
        assert_eq!(groups[0].1, vec![0, 2, 3]);
        assert_eq!(groups[1].0, vec![Value::from("bergen")]);
        assert_eq!(groups[1].1, vec![1, 4]);
    }

    #[test]
    fn multi_name_grouping_uses_the_whole_tuple() {
        let table = Table::from_pairs(vec![
            (
                "a".to_string(),
                vec![Value::Int(1), Value::Int(1), Value::Int(2)],
            ),
            (
                "b".to_string(),
                vec![Value::Int(1), Value::Int(2), Value::Int(1)],
            ),
        ])
        .unwrap();
        let groups = table.group_indexes(&["a", "b"]).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, vec![Value::Int(1), Value::Int(1)]);
    }

    #[test]
    fn sentinel_keys_group_together() {
        let table = Table::from_pairs(vec![(
            "k".to_string(),
            vec![Value::NAN, Value::Float(1.0), Value::NAN],
        )])
        .unwrap();
        let groups = table.group_indexes(&["k"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, vec![0, 2]);
    }

    #[test]
    fn group_indexes_by_uses_the_row_cursor() {
        let table = orders();
        let groups = table.group_indexes_by(|row| {
            match row.get("qty") {
                Ok(Value::Int(q)) if q % 2 == 0 => Value::from("even"),
                _ => Value::from("odd"),
            }
        });
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Value::from("odd"));
        assert_eq!(groups[0].1, vec![0, 2, 4]);
        assert_eq!(groups[1].1, vec![1, 3]);
    }

    #[test]
    fn group_by_materializes_sub_tables() {
        let grouped = orders().group_by(&["city"]).unwrap();
        assert_eq!(grouped[0].1.nrow(), 3);
        assert_eq!(grouped[1].1.nrow(), 2);
        assert_eq!(
            grouped[1].1.column("qty").unwrap(),
            &vec![Value::Int(2), Value::Int(5)]
        );
    }

    #[test]
    fn unknown_group_name_fails_before_scanning() {
        assert!(orders().group_indexes(&["nope"]).is_err());
    }
}
