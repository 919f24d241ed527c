//! End-to-end workflows over the public API: build, index, filter, sort,
//! group, merge, append, and hand rows to an external encoder.

use colframe_core::{
    Fetched, JoinKind, Operand, RangeSelector, Selector, Table, TableSource, Value,
};

fn ints(vals: &[i64]) -> Vec<Value> {
    vals.iter().map(|&v| Value::Int(v)).collect()
}

fn strs(vals: &[&str]) -> Vec<Value> {
    vals.iter().map(|&v| Value::from(v)).collect()
}

fn sales() -> Table {
    Table::from_pairs(vec![
        (
            "region".to_string(),
            strs(&["north", "south", "north", "east", "south", "north"]),
        ),
        ("units".to_string(), ints(&[12, 7, 3, 9, 14, 5])),
        (
            "price".to_string(),
            vec![
                Value::Float(2.5),
                Value::Float(3.0),
                Value::Nil,
                Value::Float(1.25),
                Value::Float(2.0),
                Value::Float(4.0),
            ],
        ),
    ])
    .unwrap()
}

#[test]
fn build_index_and_mutate() {
    let mut table = sales();
    assert_eq!(table.shape(), (6, 3));

    // Float columns coerce the absence marker to the numeric sentinel.
    let price = table.column("price").unwrap();
    assert!(price.values()[2].is_nan());

    // Mixed 2-D read: one name plus one range selects a sub-column.
    let fetched = table
        .get(&[
            Selector::from("units"),
            Selector::from(RangeSelector::closed(0, 2)),
        ])
        .unwrap();
    assert_eq!(fetched, Fetched::Values(ints(&[12, 7, 3])));

    // Point write, then read it back.
    table
        .set(
            &[Selector::from("units"), Selector::from(-1)],
            Operand::Scalar(Value::Int(6)),
        )
        .unwrap();
    assert_eq!(
        table
            .get(&[Selector::from("units"), Selector::from(-1)])
            .unwrap(),
        Fetched::Scalar(Value::Int(6))
    );
}

#[test]
fn derived_column_from_arithmetic() {
    let mut table = sales();
    let revenue = {
        let units = table.column("units").unwrap();
        let price = table.column("price").unwrap();
        units.multiply(&Operand::from(price)).unwrap()
    };
    table
        .set_column("revenue", revenue.into_values())
        .unwrap();
    assert_eq!(table.ncol(), 4);
    let revenue = table.column("revenue").unwrap();
    assert_eq!(revenue.values()[0], Value::Float(30.0));
    // The sentinel propagates through arithmetic.
    assert!(revenue.values()[2].is_nan());
}

#[test]
fn filter_sort_group_pipeline() {
    let mut table = sales();
    table.select_in_place(|row| {
        matches!(row.get("units"), Ok(Value::Int(u)) if u >= 5)
    });
    assert_eq!(table.nrow(), 5);

    table.sort_by_names(&["units"], false).unwrap();
    assert_eq!(
        table.column("units").unwrap().values()[0],
        Value::Int(14)
    );

    let groups = table.group_by(&["region"]).unwrap();
    let north = groups
        .iter()
        .find(|(key, _)| key[0] == Value::from("north"))
        .map(|(_, sub)| sub)
        .unwrap();
    assert_eq!(north.nrow(), 2);
    assert_eq!(north.column("units").unwrap().sum(), Value::Int(17));
}

#[test]
fn merge_then_append_keeps_rectangularity() {
    let left = Table::from_pairs(vec![
        ("region".to_string(), strs(&["north", "south", "west"])),
        ("target".to_string(), ints(&[20, 15, 10])),
    ])
    .unwrap();
    let totals = Table::from_pairs(vec![
        ("region".to_string(), strs(&["north", "south", "east"])),
        ("actual".to_string(), ints(&[20, 21, 9])),
    ])
    .unwrap();

    let mut merged = left.merge(&totals, &["region"], JoinKind::Outer).unwrap();
    assert_eq!(merged.column_names(), ["region", "target", "actual"]);
    assert_eq!(merged.nrow(), 4);
    // The unmatched sides carry absence markers.
    assert!(merged.column("actual").unwrap().values()[2].is_absent());
    assert!(merged.column("target").unwrap().values()[3].is_absent());

    merged
        .append(TableSource::MappingRows(vec![vec![
            ("region".to_string(), Value::from("midland")),
            ("actual".to_string(), Value::Int(4)),
        ]]))
        .unwrap();
    assert_eq!(merged.nrow(), 5);
    for name in merged.column_names() {
        assert_eq!(merged.column(name).unwrap().len(), 5);
    }
    assert!(merged.column("target").unwrap().values()[4].is_absent());
}

#[test]
fn cursor_survives_structural_churn() {
    let mut table = sales();
    table.seek_row(1).unwrap();
    assert_eq!(table.row().get("region").unwrap(), Value::from("south"));

    table.rename_column("region", "zone").unwrap();
    assert!(table.row().get("region").is_err());
    assert_eq!(table.row().get("zone").unwrap(), Value::from("south"));

    table.delete_column("price").unwrap();
    assert!(table.row().get("price").is_err());
    assert_eq!(table.ncol(), 2);
}

#[test]
fn row_mappings_feed_an_external_encoder() {
    let table = Table::from_pairs(vec![
        ("id".to_string(), ints(&[1, 2])),
        ("label".to_string(), strs(&["a", "b"])),
    ])
    .unwrap();

    let rows = table.to_row_mappings();
    let encoded: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::Value::Object(
                row.iter()
                    .map(|(name, value)| {
                        (name.clone(), serde_json::to_value(value).unwrap())
                    })
                    .collect(),
            )
        })
        .collect();

    assert_eq!(encoded[0]["id"], serde_json::json!(1));
    assert_eq!(encoded[1]["label"], serde_json::json!("b"));
}

#[test]
fn forbidden_store_mutations_are_rejected() {
    use colframe_core::ColumnStore;

    let mut store = ColumnStore::new();
    store.set("a", ints(&[1, 2])).unwrap();
    let err = store.replace().unwrap_err();
    assert!(err.to_string().contains("column synchronization"));
    assert!(store.transform_keys().is_err());
    assert!(store.transform_values().is_err());
}
