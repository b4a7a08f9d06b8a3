use chrono::{TimeZone, Utc};

use rust_data_filtering::detection::{DetectionOptions, detect_column_types};
use rust_data_filtering::filters::{
    FilterEngine, FilterOperator, FilterState, FilterUpdate, FilterValue, FilterValues,
    GeneratorOptions, RangeFilter, RangeMode, SearchFilter,
};
use rust_data_filtering::ingestion::{CsvOptions, read_csv_from_path};
use rust_data_filtering::types::{ColumnInfo, ColumnStatistics, ColumnType, DataSet, Value};

fn people() -> (DataSet, Vec<ColumnInfo>) {
    let ds = read_csv_from_path("tests/fixtures/people.csv", &CsvOptions::default()).unwrap();
    let columns = detect_column_types(&ds, &DetectionOptions::default());
    (ds, columns)
}

fn names(ds: &DataSet) -> Vec<String> {
    ds.rows.iter().map(|r| r[1].to_string()).collect()
}

fn range_of(engine: &FilterEngine, id: &str) -> RangeFilter {
    match &engine.filter(id).unwrap().values {
        FilterValues::Range(r) => r.clone(),
        other => panic!("expected range values, got {other:?}"),
    }
}

#[test]
fn select_a_keeps_only_a_rows() {
    let ds = DataSet::new(
        vec!["letter".into()],
        vec![
            vec![Value::from("A")],
            vec![Value::from("B")],
            vec![Value::from("A")],
        ],
    );
    let columns = detect_column_types(&ds, &DetectionOptions::default());
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());

    engine.update_filter(
        "filter-0",
        FilterUpdate::values(FilterValues::Select(vec![
            FilterValue::new("A", true),
            FilterValue::new("B", false),
        ])),
    );
    let out = engine.apply_filters(&ds);
    assert_eq!(out.rows, vec![vec![Value::from("A")], vec![Value::from("A")]]);
    assert_eq!(out.headers, ds.headers);
}

#[test]
fn continuous_range_is_inclusive() {
    let ds = DataSet::new(
        vec!["v".into()],
        [5, 10, 50, 90, 95]
            .into_iter()
            .map(|v| vec![Value::Int64(v)])
            .collect(),
    );
    let columns = detect_column_types(&ds, &DetectionOptions::default());
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());

    let mut range = range_of(&engine, "filter-0");
    range.current_min = 10.0;
    range.current_max = 90.0;
    engine.update_filter("filter-0", FilterUpdate::values(FilterValues::Range(range)));

    let out = engine.apply_filters(&ds);
    let kept: Vec<&Value> = out.rows.iter().map(|r| &r[0]).collect();
    assert_eq!(kept, vec![&Value::Int64(10), &Value::Int64(50), &Value::Int64(90)]);
}

#[test]
fn binned_range_uses_selected_bins() {
    let (ds, columns) = people();
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());

    // id spans 1..6 in five unit-wide bins; keep [1,2) and [5,6].
    let mut range = range_of(&engine, "filter-0");
    range.mode = RangeMode::Binned;
    range.selected_range_ids = Some(vec!["range-0".into(), "range-4".into()]);
    engine.update_filter("filter-0", FilterUpdate::values(FilterValues::Range(range.clone())));
    assert_eq!(names(&engine.apply_filters(&ds)), vec!["Ada", "Alan", "Barbara"]);

    range.selected_range_ids = Some(Vec::new());
    engine.update_filter("filter-0", FilterUpdate::values(FilterValues::Range(range)));
    assert_eq!(engine.apply_filters(&ds).row_count(), 0);
}

#[test]
fn all_bins_selected_keeps_every_numeric_row() {
    let cells = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0, f64::INFINITY];
    let ds = DataSet::new(
        vec!["v".into()],
        cells.iter().map(|v| vec![Value::Float64(*v)]).collect(),
    );
    let mut column = ColumnInfo::new("v", 0, ColumnType::Number);
    column.sample_values = cells[..6].iter().map(|v| Value::Float64(*v)).collect();
    column.statistics = Some(ColumnStatistics::Number {
        min: 1.0,
        max: f64::INFINITY,
        average: None,
    });
    let mut engine = FilterEngine::from_columns(&[column], &GeneratorOptions::default());

    let mut range = range_of(&engine, "filter-0");
    range.mode = RangeMode::Binned;
    assert_eq!(range.selected_range_ids.as_ref().map(Vec::len), Some(5));
    assert!(engine.update_filter("filter-0", FilterUpdate::values(FilterValues::Range(range))));
    assert_eq!(engine.apply_filters(&ds), ds);
}

#[test]
fn boolean_date_and_null_filters_over_text_cells() {
    let (ds, columns) = people();
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());

    // active: "true"/"yes" rows.
    engine.update_filter("filter-3", FilterUpdate::values(FilterValues::Boolean(Some(true))));
    assert_eq!(names(&engine.apply_filters(&ds)), vec!["Ada", "Linus", "Alan"]);

    // joined in 2020 or later; Margaret (no date) fails.
    let FilterValues::Date(mut date) = engine.filter("filter-4").unwrap().values.clone() else {
        panic!("expected date values");
    };
    date.current_start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    engine.update_filter("filter-4", FilterUpdate::values(FilterValues::Date(date)));
    assert_eq!(names(&engine.apply_filters(&ds)), vec!["Ada", "Linus", "Alan"]);

    // age is null.
    engine.update_filter("filter-2-null", FilterUpdate::active(true));
    assert_eq!(names(&engine.apply_filters(&ds)), vec!["Linus"]);

    engine.update_filter(
        "filter-2-null",
        FilterUpdate::operator(FilterOperator::IsNotNull),
    );
    assert_eq!(names(&engine.apply_filters(&ds)), vec!["Ada", "Alan"]);
    assert_eq!(engine.active_filter_count(), 3);
}

#[test]
fn search_filter_on_mixed_column() {
    let ds = DataSet::new(
        vec!["note".into()],
        vec![
            vec![Value::from("Shipped Monday")],
            vec![Value::Int64(42)],
            vec![Value::from("shipping delayed")],
            vec![Value::Null],
        ],
    );
    let columns = detect_column_types(&ds, &DetectionOptions::default());
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
    assert_eq!(engine.filter("filter-0").unwrap().operator, FilterOperator::Contains);

    engine.update_filter(
        "filter-0",
        FilterUpdate::values(FilterValues::Search(SearchFilter {
            query: "SHIP".into(),
            ..Default::default()
        })),
    );
    assert_eq!(engine.filtered_row_indices(&ds), vec![0, 2]);

    engine.update_filter(
        "filter-0",
        FilterUpdate::values(FilterValues::Search(SearchFilter {
            query: "42".into(),
            exact_match: true,
            ..Default::default()
        })),
    );
    assert_eq!(engine.filtered_row_indices(&ds), vec![1]);
}

#[test]
fn exported_state_restores_identical_results() {
    let (ds, columns) = people();
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
    engine.update_filter("filter-3", FilterUpdate::values(FilterValues::Boolean(Some(false))));
    engine.update_filter(
        "filter-5",
        FilterUpdate::values(FilterValues::Select(vec![
            FilterValue::new("New York", true),
            FilterValue::new(Value::Null, true),
        ])),
    );
    let expected = engine.apply_filters(&ds);
    assert_eq!(names(&expected), vec!["Grace", "Barbara"]);

    let json = engine.export_filter_state().to_json().unwrap();

    let mut fresh = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
    let applied = fresh.import_filter_state(&FilterState::from_json(&json).unwrap());
    assert_eq!(applied, fresh.filters().len());
    assert_eq!(fresh.apply_filters(&ds), expected);
    assert_eq!(fresh.export_filter_state(), engine.export_filter_state());
}

#[test]
fn import_ignores_unknown_ids_and_reset_restores_defaults() {
    let (ds, columns) = people();
    let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
    let pristine = engine.filters().to_vec();

    let state = FilterState::from_json(
        r#"[
            {"id":"filter-3","active":true,"values":{"type":"boolean","values":true},"operator":"equals"},
            {"id":"filter-42","active":true,"values":{"type":"null","values":true},"operator":"is_null"}
        ]"#,
    )
    .unwrap();
    assert_eq!(engine.import_filter_state(&state), 1);
    assert_eq!(engine.apply_filters(&ds).row_count(), 3);

    engine.reset_all_filters();
    assert_eq!(engine.filters(), pristine.as_slice());
    assert_eq!(engine.apply_filters(&ds), ds);
}
