//! Build two small tables, join them on a key column, then filter, derive,
//! and sort the result using the core API.

use colframe_core::{JoinKind, Operand, Table, TableSource, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let gdb = Table::from_pairs(vec![
        (
            "country".to_string(),
            ["UG", "UK", "UK", "DK", "DK", "USA", "USA", "NO"]
                .iter()
                .map(|&c| Value::from(c))
                .collect(),
        ),
        ("gdb".to_string(), (0..8).map(Value::Int).collect()),
    ])?;
    let gni = Table::from_pairs(vec![
        (
            "country".to_string(),
            ["FR", "UK", "JP", "DK", "DK", "USA"]
                .iter()
                .map(|&c| Value::from(c))
                .collect(),
        ),
        ("gni".to_string(), (8..14).map(Value::Int).collect()),
    ])?;

    let mut joined = gdb.merge(&gni, &["country"], JoinKind::Outer)?;
    println!("outer join:\n{joined}\n");

    // Rows where both measures are present.
    joined.select_in_place(|row| {
        row.get("gdb").map(|v| !v.is_absent()).unwrap_or(false)
            && row.get("gni").map(|v| !v.is_absent()).unwrap_or(false)
    });

    // Derive a spread column and sort by it, largest first.
    let spread = {
        let gdb = joined.column("gdb")?;
        let gni = joined.column("gni")?;
        gni.subtract(&Operand::from(gdb))?
    };
    joined.set_column("spread", spread.into_values())?;
    joined.sort_by_names(&["spread"], false)?;
    println!("matched rows by spread:\n{joined}\n");

    // Late rows may carry a column the table has never seen.
    joined.append(TableSource::MappingRows(vec![vec![
        ("country".to_string(), Value::from("SE")),
        ("note".to_string(), Value::from("estimate")),
    ]]))?;
    println!("after append:\n{joined}");

    Ok(())
}
