//! End-to-end tests for the analysis engine.

use std::io::Write;
use std::thread;

use tempfile::{NamedTempFile, TempDir};

use tabscope::{
    AbortSignal, AnalysisEngine, AnalysisError, AnalysisReport, Cardinality, Column, ColumnRef,
    Dataset, EngineConfig, InferredType, Loader, PatternKind, Table,
};

/// Helper to create a temporary file with given content.
fn create_test_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

/// `customers(id, email)` and `orders(order_id, customer_id)`.
fn customers_orders() -> Dataset {
    let customers = Table::new(
        "customers",
        vec![
            Column::new("id", 1..=10i64),
            Column::new("email", (1..=10).map(|i| format!("customer{i}@shop.example"))),
        ],
    );
    let orders = Table::new(
        "orders",
        vec![
            Column::new("order_id", 1..=30i64),
            Column::new("customer_id", (0..30i64).map(|i| i % 10 + 1)),
        ],
    );
    Dataset::new("shop", vec![customers, orders])
}

fn analyze(dataset: &Dataset) -> AnalysisReport {
    AnalysisEngine::new()
        .analyze(dataset)
        .expect("Analysis failed")
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_customers_orders_profiles() {
    let report = analyze(&customers_orders());

    let id = report.profile("customers", "id").unwrap();
    assert_eq!(id.inferred_type, InferredType::Identifier);
    assert!(id.confidence >= 0.95);

    let order_id = report.profile("orders", "order_id").unwrap();
    assert_eq!(order_id.inferred_type, InferredType::Identifier);
    assert!(order_id.confidence >= 0.95);

    let email = report.profile("customers", "email").unwrap();
    assert_eq!(email.pattern, Some(PatternKind::Email));

    let customer_id = report.profile("orders", "customer_id").unwrap();
    assert_eq!(customer_id.inferred_type, InferredType::Integer);
}

#[test]
fn test_customers_orders_relationship() {
    let report = analyze(&customers_orders());

    assert_eq!(report.relationships.len(), 1);
    let relationship = &report.relationships[0];
    assert_eq!(relationship.source, ColumnRef::new("customers", "id"));
    assert_eq!(relationship.target, ColumnRef::new("orders", "customer_id"));
    assert_eq!(relationship.cardinality, Cardinality::OneToMany);
    assert!(relationship.confidence >= 0.5);
    assert_eq!(relationship.evidence.containment, 1.0);
}

#[test]
fn test_report_layout_and_summary() {
    let report = analyze(&customers_orders());

    assert_eq!(report.dataset_id, "shop");
    assert_eq!(report.summary.total_tables, 2);
    assert_eq!(report.summary.total_rows, 40);
    assert_eq!(report.summary.total_columns, 4);
    assert_eq!(report.summary.total_relationships, 1);

    let customers = report.table("customers").unwrap();
    assert_eq!(customers.row_count, 10);
    assert!(customers.candidate_keys.contains(&"id".to_string()));
    for axis in [
        customers.quality.completeness,
        customers.quality.consistency,
        customers.quality.uniqueness,
        customers.quality.validity,
        customers.quality.accuracy,
    ] {
        assert!((0.0..=100.0).contains(&axis));
    }
}

#[test]
fn test_report_json_round_trip() {
    let report = analyze(&customers_orders());

    let compact = report.to_json().unwrap();
    assert_eq!(AnalysisReport::from_json(&compact).unwrap(), report);

    let pretty = report.to_json_pretty().unwrap();
    assert_eq!(AnalysisReport::from_json(&pretty).unwrap(), report);

    let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
    assert!(value["tables"]["customers"]["columns"]["email"].is_object());
    assert!(value["tables"]["orders"]["quality"]["completeness"].is_number());
    assert!(value["correlations"].is_array());
    assert_eq!(value["relationships"][0]["cardinality"], "one_to_many");
}

#[test]
fn test_completeness_with_nulls() {
    // 100 cells, 20 nulls.
    let columns = (0..10)
        .map(|c| {
            Column::new(
                format!("c{c}"),
                (0..10).map(|r| if (r + c) % 5 == 0 { None } else { Some(r as f64 + 0.5) }),
            )
        })
        .collect();
    let report = analyze(&Dataset::new("d", vec![Table::new("t", columns)]));

    assert_eq!(report.table("t").unwrap().quality.completeness, 80.0);
}

#[test]
fn test_empty_table_scores_zero() {
    let table = Table::new(
        "empty",
        vec![Column::new("a", Vec::<i64>::new()), Column::new("b", Vec::<String>::new())],
    );
    let report = analyze(&Dataset::new("d", vec![table]));
    let empty = report.table("empty").unwrap();

    assert!(empty.is_ok());
    assert_eq!(empty.quality.overall(), 0.0);
    assert!(empty.outliers.is_empty());
    assert!(report.correlations.is_empty());
}

#[test]
fn test_outliers_are_idempotent() {
    let mut values: Vec<f64> = (0..40).map(|i| 10.0 + (i % 7) as f64 * 0.5).collect();
    values[13] = 95.0;
    let dataset = Dataset::new(
        "d",
        vec![Table::new("m", vec![Column::new("reading", values)])],
    );

    let first = analyze(&dataset);
    let second = analyze(&dataset);
    let outliers = &first.table("m").unwrap().outliers;

    assert_eq!(outliers, &second.table("m").unwrap().outliers);
    assert_eq!(outliers[0].rows, vec![13]);
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn test_zero_column_table_reported_inline() {
    let mut dataset = customers_orders();
    dataset.tables.insert(1, Table::new("nothing", vec![]));
    let report = analyze(&dataset);

    let keys: Vec<&str> = report.tables.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["customers", "nothing", "orders"]);
    assert!(report.table("nothing").unwrap().error.is_some());
    assert_eq!(report.relationships.len(), 1);
}

#[test]
fn test_empty_dataset_is_an_error() {
    let result = AnalysisEngine::new().analyze(&Dataset::new("none", vec![]));
    assert!(matches!(result, Err(AnalysisError::EmptyDataset(id)) if id == "none"));
}

#[test]
fn test_resource_exhausted() {
    let engine = AnalysisEngine::with_config(EngineConfig {
        max_cells: 50,
        ..EngineConfig::default()
    });
    let result = engine.analyze(&customers_orders());
    assert!(matches!(result, Err(AnalysisError::ResourceExhausted { limit: 50, .. })));
}

#[test]
fn test_abort_signal() {
    let abort = AbortSignal::new();
    abort.abort();
    let result = AnalysisEngine::new().analyze_with_abort(&customers_orders(), &abort);
    assert!(matches!(result, Err(AnalysisError::Aborted { .. })));

    let fresh = AbortSignal::new();
    assert!(AnalysisEngine::new()
        .analyze_with_abort(&customers_orders(), &fresh)
        .is_ok());
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_invocations_do_not_interfere() {
    let expected_shop = analyze(&customers_orders());
    let other = Dataset::new(
        "other",
        vec![Table::new(
            "readings",
            vec![
                Column::new("x", (0..50).map(|i| i as f64 * 0.5)),
                Column::new("y", (0..50).map(|i| i as f64 * 1.5 + 2.0)),
            ],
        )],
    );
    let expected_other = analyze(&other);

    let engine = AnalysisEngine::new();
    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = &engine;
                let dataset = if i % 2 == 0 { customers_orders() } else { other.clone() };
                scope.spawn(move || (i, engine.analyze(&dataset).expect("Analysis failed")))
            })
            .collect();

        for handle in handles {
            let (i, report) = handle.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(report, expected_shop);
            } else {
                assert_eq!(report, expected_other);
            }
        }
    });
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_files_and_analyze() {
    let customers = create_test_file(
        ".csv",
        "id,email,country\n1,a@x.org,NZ\n2,b@x.org,AU\n3,c@x.org,NZ\n4,d@x.org,NA\n",
    );
    let orders = create_test_file(
        ".tsv",
        "order_id\tcustomer_id\tamount\n1\t1\t9.5\n2\t1\t12.0\n3\t2\t3.25\n4\t4\t8.0\n5\t4\t1.0\n",
    );

    let loader = Loader::new();
    let customers = loader.load_file(customers.path()).unwrap();
    let orders = loader.load_file(orders.path()).unwrap();
    assert_eq!(customers.source.row_count, 4);
    assert_eq!(orders.source.column_count, 3);

    let dataset = Dataset::new("files", vec![customers.table, orders.table]);
    let report = analyze(&dataset);
    assert_eq!(report.tables.len(), 2);
}

#[test]
fn test_load_json_records_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.json");
    std::fs::write(
        &path,
        r#"[{"event_id": 1, "kind": "click"}, {"event_id": 2, "kind": "view"}, {"event_id": 3}]"#,
    )
    .unwrap();

    let loaded = Loader::new().load_file(&path).unwrap();
    assert_eq!(loaded.table.name, "events");
    assert_eq!(loaded.source.path.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.table.column("kind").unwrap().null_count(), 1);
}

#[test]
fn test_float_formatted_keys_still_join() {
    let mut customers = String::from("id,email\n");
    for i in 1..=20 {
        customers.push_str(&format!("{i},customer{i}@shop.example\n"));
    }
    // Exported through a float column: `7.0` rather than `7`.
    let mut orders = String::from("order_id,customer_id\n");
    for i in 0..60 {
        orders.push_str(&format!("{},{}.0\n", i + 1, i % 20 + 1));
    }

    let loader = Loader::new();
    let customers = loader.load_bytes("customers.csv", customers.as_bytes()).unwrap();
    let orders = loader.load_bytes("orders.csv", orders.as_bytes()).unwrap();
    let report = analyze(&Dataset::new("shop", vec![customers.table, orders.table]));

    let customer_id = report.profile("orders", "customer_id").unwrap();
    assert_eq!(customer_id.inferred_type, InferredType::Integer);

    assert_eq!(report.relationships.len(), 1);
    let relationship = &report.relationships[0];
    assert_eq!(relationship.source, ColumnRef::new("customers", "id"));
    assert_eq!(relationship.target, ColumnRef::new("orders", "customer_id"));
    assert_eq!(relationship.evidence.containment, 1.0);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = Loader::new().load_file(dir.path().join("absent.csv"));
    assert!(matches!(result, Err(AnalysisError::Io { .. })));
}
