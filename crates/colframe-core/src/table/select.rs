//! Row selection, rejection, and the sibling-synchronized row filters.
//!
//! Every operation here funnels into the store's two structural
//! primitives (`subset_to` / `remove_at`), so removing rows via any of
//! them leaves all columns at the new, shorter equal length with the same
//! positions removed everywhere.

use crate::error::Result;
use crate::index::{self, RowSelector};
use crate::row::{RowRef, RowView};
use crate::table::Table;
use crate::value::Value;

impl Table {
    /// Positions of rows satisfying `predicate`, scanned with a private
    /// cursor so the shared cursor does not move.
    fn matching_positions<F>(&self, mut predicate: F) -> Vec<usize>
    where
        F: FnMut(&RowRef<'_>) -> bool,
    {
        let mut scratch = RowView::new();
        scratch.resync_accessors(self.store().names(), self.store().generation());
        (0..self.nrow())
            .filter(|&i| {
                // nrow > 0 here, so the position is always resolvable.
                scratch.set_position(i as i64, self.nrow()).is_ok()
                    && predicate(&RowRef::new(self.store(), &scratch))
            })
            .collect()
    }

    /// New table holding the rows for which `predicate` is true.
    pub fn select<F>(&self, predicate: F) -> Table
    where
        F: FnMut(&RowRef<'_>) -> bool,
    {
        let positions = self.matching_positions(predicate);
        self.subset_rows(&positions)
    }

    /// New table holding the rows for which `predicate` is false.
    pub fn reject<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(&RowRef<'_>) -> bool,
    {
        self.select(|row| !predicate(row))
    }

    /// Keep only the rows for which `predicate` is true, in place.
    pub fn select_in_place<F>(&mut self, predicate: F)
    where
        F: FnMut(&RowRef<'_>) -> bool,
    {
        let positions = self.matching_positions(predicate);
        self.store_mut().subset_to(&positions);
        self.sync();
    }

    /// Drop the rows for which `predicate` is true, in place.
    pub fn reject_in_place<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&RowRef<'_>) -> bool,
    {
        self.select_in_place(|row| !predicate(row));
    }

    /// Drop every row whose value in `name` is absent (nil or the
    /// sentinel).
    pub fn compact(&mut self, name: &str) -> Result<()> {
        let positions = self.column(name)?.present_positions();
        self.store_mut().subset_to(&positions);
        self.sync();
        Ok(())
    }

    /// Drop every row whose value in `name` equals `value` (sentinels
    /// match sentinels).
    pub fn delete_value(&mut self, name: &str, value: &Value) -> Result<()> {
        let positions = self.column(name)?.positions_where(|v| v.same(value));
        self.store_mut().remove_at(&positions);
        self.sync();
        Ok(())
    }

    /// Keep only the first row of each duplicate group in `name`, in
    /// first-occurrence order.
    pub fn uniq_by(&mut self, name: &str) -> Result<()> {
        let positions = self.column(name)?.unique_positions();
        self.store_mut().subset_to(&positions);
        self.sync();
        Ok(())
    }

    /// Remove the last `count` rows and return them as a table.
    pub fn pop_rows(&mut self, count: usize) -> Table {
        let count = count.min(self.nrow());
        let start = self.nrow() - count;
        let popped: Vec<usize> = (start..self.nrow()).collect();
        let out = self.subset_rows(&popped);
        self.store_mut().remove_at(&popped);
        self.sync();
        out
    }

    /// Remove the first `count` rows.
    pub fn shift_rows(&mut self, count: usize) {
        self.store_mut().shift(count);
        self.sync();
    }

    /// Keep only the rows addressed by `selectors`, in selection order
    /// (duplicates preserved).
    pub fn select_rows_at(&mut self, selectors: &[RowSelector]) -> Result<()> {
        let positions = index::resolve_indices(selectors, self.nrow())?;
        self.store_mut().subset_to(&positions);
        self.sync();
        Ok(())
    }

    /// Drop the rows addressed by `selectors` (deduplicated).
    pub fn delete_rows_at(&mut self, selectors: &[RowSelector]) -> Result<()> {
        let positions = index::resolve_unique_sorted(selectors, self.nrow())?;
        self.store_mut().remove_at(&positions);
        self.sync();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::people;
    use crate::value::Value;

    fn assert_rectangular(table: &Table, nrow: usize) {
        for name in table.column_names() {
            assert_eq!(table.column(name).unwrap().len(), nrow);
        }
    }

    #[test]
    fn select_and_reject_split_by_predicate() {
        let table = people();
        let adults = table.select(|row| {
            matches!(row.get("age"), Ok(Value::Int(age)) if age >= 30)
        });
        assert_eq!(adults.nrow(), 2);
        let minors = table.reject(|row| {
            matches!(row.get("age"), Ok(Value::Int(age)) if age >= 30)
        });
        assert_eq!(minors.nrow(), 2);
        // Originals untouched.
        assert_eq!(table.nrow(), 4);
    }

    #[test]
    fn in_place_selection_keeps_all_columns_aligned() {
        let mut table = people();
        table.select_in_place(|row| {
            matches!(row.get("age"), Ok(Value::Int(age)) if age < 60)
        });
        assert_eq!(table.nrow(), 3);
        assert_rectangular(&table, 3);
    }

    #[test]
    fn compact_drops_rows_with_absent_values_everywhere() {
        let mut table = people();
        table
            .set_column(
                "nick",
                vec![
                    Value::from("an"),
                    Value::Nil,
                    Value::from("ci"),
                    Value::Nil,
                ],
            )
            .unwrap();
        table.compact("nick").unwrap();
        assert_eq!(table.nrow(), 2);
        assert_rectangular(&table, 2);
        assert_eq!(
            table.column("name").unwrap(),
            &vec![Value::from("ann"), Value::from("cid")]
        );
    }

    #[test]
    fn delete_value_matches_sentinels_too() {
        let mut table = people();
        table
            .set_column(
                "rate",
                vec![Value::Float(1.0), Value::NAN, Value::Float(2.0), Value::NAN],
            )
            .unwrap();
        table.delete_value("rate", &Value::NAN).unwrap();
        assert_eq!(table.nrow(), 2);
        assert_rectangular(&table, 2);
    }

    #[test]
    fn uniq_keeps_first_occurrences() {
        let mut table = Table::from_pairs(vec![
            (
                "k".to_string(),
                vec![Value::Int(1), Value::Int(2), Value::Int(1), Value::Int(3)],
            ),
            (
                "v".to_string(),
                vec![Value::Int(10), Value::Int(20), Value::Int(30), Value::Int(40)],
            ),
        ])
        .unwrap();
        table.uniq_by("k").unwrap();
        assert_eq!(
            table.column("v").unwrap(),
            &vec![Value::Int(10), Value::Int(20), Value::Int(40)]
        );
        assert_rectangular(&table, 3);
    }

    #[test]
    fn pop_rows_returns_the_removed_tail() {
        let mut table = people();
        let popped = table.pop_rows(2);
        assert_eq!(table.nrow(), 2);
        assert_eq!(popped.nrow(), 2);
        assert_eq!(popped.row_values(0).unwrap()[0], Value::from("cid"));
        assert_rectangular(&table, 2);
    }

    #[test]
    fn positional_row_edits_preserve_duplicates_then_dedup_on_delete() {
        let mut table = people();
        table
            .select_rows_at(&[
                RowSelector::Index(0),
                RowSelector::Index(0),
                RowSelector::Index(2),
            ])
            .unwrap();
        assert_eq!(table.nrow(), 3);
        assert_eq!(table.row_values(1).unwrap()[0], Value::from("ann"));

        let mut table = people();
        table
            .delete_rows_at(&[
                RowSelector::Index(1),
                RowSelector::Index(-3),
                RowSelector::Index(3),
            ])
            .unwrap();
        assert_eq!(table.nrow(), 2);
        assert_eq!(table.row_values(1).unwrap()[0], Value::from("cid"));
    }
}
