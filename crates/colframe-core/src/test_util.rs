//! Shared table fixtures for unit tests.

use crate::table::Table;
use crate::value::Value;

/// Four people with a string, an integer, and a float column.
pub(crate) fn people() -> Table {
    Table::from_pairs(vec![
        (
            "name".to_string(),
            vec![
                Value::from("ann"),
                Value::from("bob"),
                Value::from("cid"),
                Value::from("dan"),
            ],
        ),
        (
            "age".to_string(),
            vec![
                Value::Int(34),
                Value::Int(25),
                Value::Int(61),
                Value::Int(19),
            ],
        ),
        (
            "score".to_string(),
            vec![
                Value::Float(8.0),
                Value::Float(7.5),
                Value::Float(9.1),
                Value::Float(6.0),
            ],
        ),
    ])
    .unwrap()
}

/// Left side of the country-join fixture.
pub(crate) fn gdb_table() -> Table {
    Table::from_pairs(vec![
        (
            "country".to_string(),
            ["UG", "UK", "UK", "DK", "DK", "USA", "USA", "NO"]
                .iter()
                .map(|&c| Value::from(c))
                .collect(),
        ),
        (
            "gdb".to_string(),
            (0..8).map(Value::Int).collect(),
        ),
    ])
    .unwrap()
}

/// Right side of the country-join fixture.
pub(crate) fn gni_table() -> Table {
    Table::from_pairs(vec![
        (
            "country".to_string(),
            ["FR", "UK", "JP", "DK", "DK", "USA"]
                .iter()
                .map(|&c| Value::from(c))
                .collect(),
        ),
        (
            "gni".to_string(),
            (8..14).map(Value::Int).collect(),
        ),
    ])
    .unwrap()
}
