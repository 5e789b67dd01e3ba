use super::*;

fn sample_table() -> Table {
    Table::new(vec![
        Column::text("Product", ["A", "B", "C"]),
        Column::numeric("Sales", [100.0, 200.0, 300.0]),
        Column::numeric("Quantity", [10.0, 20.0, 30.0]),
    ])
    .expect("columns have equal length")
}

#[test]
fn basic_shape() {
    let table = sample_table();

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 3);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["Product", "Sales", "Quantity"]
    );
}

#[test]
fn first_numeric_column_is_leftmost() {
    let table = sample_table();

    let column = table.first_numeric_column().expect("table has numeric columns");
    assert_eq!(column.name(), "Sales");
    assert_eq!(table.numeric_columns().count(), 2);
}

#[test]
fn no_numeric_columns() {
    let table = Table::new(vec![Column::text("name", ["x", "y"])]).expect("valid table");
    assert!(table.first_numeric_column().is_none());
}

#[test]
fn column_lookup_is_exact() {
    let table = sample_table();

    assert!(table.column("Sales").is_some());
    assert!(table.column("sales").is_none());
    assert!(table.column("Revenue").is_none());
}

#[test]
fn length_mismatch_is_rejected() {
    let result = Table::new(vec![
        Column::numeric("a", [1.0, 2.0]),
        Column::numeric("b", [1.0]),
    ]);

    match result {
        Err(TableError::LengthMismatch {
            column,
            expected,
            found,
        }) => {
            assert_eq!(column, "b");
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }
}

#[test]
fn no_columns_is_rejected() {
    assert!(matches!(Table::new(Vec::new()), Err(TableError::NoColumns)));
}

#[test]
fn column_type_inference() {
    let mixed = Column::new(
        "mixed",
        vec![CellValue::Number(1.0), CellValue::Text("a".to_string())],
    );
    assert_eq!(mixed.kind(), ColumnType::Text);

    let sparse = Column::new("sparse", vec![CellValue::Missing, CellValue::Number(2.0)]);
    assert_eq!(sparse.kind(), ColumnType::Numeric);
    assert_eq!(sparse.missing_count(), 1);

    let empty = Column::new("empty", vec![CellValue::Missing]);
    assert_eq!(empty.kind(), ColumnType::Text);
}

#[test]
fn cell_display() {
    assert_eq!(CellValue::Number(100.0).to_string(), "100");
    assert_eq!(CellValue::Number(100.5).to_string(), "100.5");
    assert_eq!(CellValue::Missing.to_string(), "NaN");
    assert_eq!(CellValue::Boolean(true).to_string(), "True");
    assert_eq!(CellValue::Text("abc".to_string()).to_string(), "abc");
}

#[test]
fn row_access() {
    let table = sample_table();

    let row = table.row(1).expect("row 1 exists");
    assert_eq!(row.len(), 3);
    assert_eq!(*row[0], CellValue::Text("B".to_string()));
    assert_eq!(*row[1], CellValue::Number(200.0));
    assert!(table.row(3).is_none());
}

#[test]
fn text_rendering_is_aligned() {
    let table = sample_table();

    let expected = "   Product  Sales  Quantity\n\
                    0        A    100        10\n\
                    1        B    200        20\n\
                    2        C    300        30";
    assert_eq!(table.to_text(), expected);
}

#[test]
fn text_rendering_lists_every_row() {
    let table = Table::new(vec![Column::numeric("n", (0..12).map(f64::from))])
        .expect("valid table");

    let text = table.to_text();
    assert_eq!(text.lines().count(), 13);
    assert!(text.lines().nth(11).is_some_and(|l| l.starts_with("10")));
}
