//! Unit tests for the create-once / append-after sink

use geo_types::{Geometry, Point};
use shp2pgis::Feature;
use shp2pgis::services::sink::memory::MemoryDatabase;
use shp2pgis::services::sink::table_state::{TableState, TableStateSink, WriteOutcome};
use shp2pgis::services::sink::{GeometryLayout, TableRef, WritePath};
use std::thread;

fn sink(initial: TableState) -> TableStateSink {
    TableStateSink::new(
        TableRef::qualified("public", "results"),
        TableRef::unqualified("results"),
        GeometryLayout {
            column: "geom".to_string(),
            srid: 0,
        },
        initial,
    )
}

fn batch(len: usize) -> Vec<Feature> {
    (0..len)
        .map(|i| Feature::new(Geometry::Point(Point::new(i as f64, 0.0))))
        .collect()
}

#[test]
fn initial_state_inverts_create_flag() {
    assert_eq!(TableState::from_create_flag(true), TableState::Pending);
    assert_eq!(TableState::from_create_flag(false), TableState::Exists);
}

#[test]
fn creates_exactly_once_then_appends() {
    let db = MemoryDatabase::new();
    let sink = sink(TableState::Pending);

    for n in 1..=5 {
        sink.write(&db, &batch(n)).unwrap();
    }

    assert_eq!(db.count(WritePath::Create), 1);
    assert_eq!(db.count(WritePath::Append), 4);
    assert_eq!(sink.state(), TableState::Exists);

    let writes = db.writes();
    assert_eq!(writes[0].path, WritePath::Create);
    assert_eq!(writes[0].row_count, 1);
    assert!(writes[1..].iter().all(|w| w.path == WritePath::Append));
}

#[test]
fn create_path_is_qualified_and_append_path_is_not() {
    let db = MemoryDatabase::new();
    let sink = sink(TableState::Pending);
    sink.write(&db, &batch(1)).unwrap();
    sink.write(&db, &batch(1)).unwrap();

    let writes = db.writes();
    assert_eq!(writes[0].table, TableRef::qualified("public", "results"));
    assert_eq!(writes[1].table, TableRef::unqualified("results"));
}

#[test]
fn failed_create_is_retried_by_next_batch() {
    let db = MemoryDatabase::new();
    db.fail_next_creates(1);
    let sink = sink(TableState::Pending);

    assert!(sink.write(&db, &batch(2)).is_err());
    assert_eq!(sink.state(), TableState::Pending);

    let outcome = sink.write(&db, &batch(3)).unwrap();
    assert_eq!(
        outcome,
        WriteOutcome::Written {
            path: WritePath::Create,
            rows: 3
        }
    );
    assert_eq!(sink.state(), TableState::Exists);
    assert_eq!(db.count(WritePath::Create), 1);
}

#[test]
fn empty_batch_is_a_no_op() {
    let db = MemoryDatabase::new();
    let sink = sink(TableState::Pending);

    assert_eq!(sink.write(&db, &[]).unwrap(), WriteOutcome::Skipped);
    assert!(db.writes().is_empty());
    assert_eq!(sink.state(), TableState::Pending);
}

#[test]
fn existing_table_only_appends() {
    let db = MemoryDatabase::new();
    let sink = sink(TableState::Exists);

    for _ in 0..3 {
        sink.write(&db, &batch(1)).unwrap();
    }

    assert_eq!(db.count(WritePath::Create), 0);
    assert_eq!(db.count(WritePath::Append), 3);
}

#[test]
fn concurrent_writers_create_once() {
    let db = MemoryDatabase::new();
    let sink = sink(TableState::Pending);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..10 {
                    sink.write(&db, &batch(1)).unwrap();
                }
            });
        }
    });

    assert_eq!(db.count(WritePath::Create), 1);
    assert_eq!(db.count(WritePath::Append), 79);
    assert_eq!(db.writes()[0].path, WritePath::Create);
}
