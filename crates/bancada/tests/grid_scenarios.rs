//! End-to-end grid scenarios through the public API, driven against the
//! mock application model.

use bancada::mock::{FakeColumn, FakeColumnKind, FakeGrid, MockDriver};
use bancada::{
    init_tracing, CellState, EditableGrid, Locator, PageDriver, SELECT_COLUMN_NAME,
};
use std::sync::Arc;

fn study_grid() -> (Arc<MockDriver>, EditableGrid) {
    let driver = Arc::new(MockDriver::with_app(FakeGrid::new(
        vec![
            FakeColumn::select(),
            FakeColumn::new("Name", FakeColumnKind::Text),
            FakeColumn::new("Age", FakeColumnKind::Integer),
        ],
        vec![
            vec![String::new(), "Ada".into(), "36".into()],
            vec![String::new(), "Grace".into(), "45".into()],
            vec![String::new(), "Edsger".into(), "72".into()],
        ],
    )));
    let grid = EditableGrid::new(
        Arc::clone(&driver) as Arc<dyn PageDriver>,
        Locator::css("div.editable-grid"),
    );
    (driver, grid)
}

#[tokio::test]
async fn select_all_round_trips_through_the_header_checkbox() {
    init_tracing();
    let (_driver, grid) = study_grid();

    assert_eq!(
        grid.column_names().await.unwrap(),
        vec![SELECT_COLUMN_NAME, "Name", "Age"]
    );
    grid.select_all(true).await.unwrap();
    assert!(grid.are_all_rows_selected().await.unwrap());
    grid.select_all(false).await.unwrap();
    assert!(!grid.are_all_rows_selected().await.unwrap());
}

#[tokio::test]
async fn integer_edit_round_trips_as_text() {
    let (_driver, grid) = study_grid();

    grid.set_cell_value(0, "Age", 17).await.unwrap();
    assert_eq!(grid.cell_value(0, "Age").await.unwrap(), "17");
    assert_eq!(grid.cell_error(0, "Age").await.unwrap(), None);
}

#[tokio::test]
async fn pasted_two_by_two_block_lands_at_the_anchor() {
    let (_driver, grid) = study_grid();

    grid.paste_from_cell(0, "Name", "A\tB\nC\tD").await.unwrap();
    assert_eq!(grid.cell_value(0, "Name").await.unwrap(), "A");
    assert_eq!(grid.cell_value(0, "Age").await.unwrap(), "B");
    assert_eq!(grid.cell_value(1, "Name").await.unwrap(), "C");
    assert_eq!(grid.cell_value(1, "Age").await.unwrap(), "D");
    assert_eq!(grid.row_count().await.unwrap(), 3);
}

#[tokio::test]
async fn keyboard_range_selection_paints_states() {
    let (_driver, grid) = study_grid();

    grid.select_range((0, "Name"), (2, "Age")).await.unwrap();
    assert_eq!(
        grid.cell_state(0, "Name").await.unwrap(),
        CellState::Selected
    );
    for row in 1..3 {
        assert_eq!(
            grid.cell_state(row, "Age").await.unwrap(),
            CellState::InSelection
        );
    }
    grid.clear_selection().await.unwrap();
    assert_eq!(grid.cell_state(2, "Age").await.unwrap(), CellState::Idle);
}
