//! Command execution benchmarks.
//!
//! Measures the cost of running statements end to end through a
//! [`Session`] backed by [`MemoryStore`], across a few representative
//! command sequences.
//!
//! ```bash
//! cargo bench
//! ```

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kestrel_exec::analytics::AnalyticsManager;
use kestrel_exec::datasource::{DataSourceManager, Response};
use kestrel_exec::display::Display;
use kestrel_exec::error::{KestrelError, Result};
use kestrel_exec::session::Session;
use kestrel_exec::statement::{GetSource, ParamValue, Statement, TimeRange};
use kestrel_exec::store::memory::MemoryStore;
use kestrel_exec::symboltable::VarStruct;
use smol_str::SmolStr;

struct NoDataSource;
impl DataSourceManager for NoDataSource {
    fn query(&self, _: &str, _: &str, _: &str) -> Result<Response> {
        Err(KestrelError::DataSource("benchmark has no live datasource".into()))
    }
}

struct NoAnalytics;
impl AnalyticsManager for NoAnalytics {
    fn execute(
        &self,
        _: &str,
        _: &[VarStruct],
        _: &str,
        _: &BTreeMap<SmolStr, ParamValue>,
    ) -> Result<Display> {
        Err(KestrelError::Analytics("benchmark has no live analytics manager".into()))
    }
}

fn new_session() -> Session {
    Session::new(
        "bench-session",
        Box::new(MemoryStore::new()),
        Box::new(NoDataSource),
        Box::new(NoAnalytics),
    )
}

fn process_rows(n: usize) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = (0..n)
        .map(|i| serde_json::json!({"type": "process", "pid": i, "name": format!("p{i}.exe")}))
        .collect();
    serde_json::Value::Array(rows)
}

fn bench_new_and_disp(c: &mut Criterion) {
    let mut group = c.benchmark_group("new_and_disp");
    for size in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut session = new_session();
                session
                    .execute(&Statement::New {
                        output: "procs".into(),
                        type_: Some("process".into()),
                        data: process_rows(size),
                    })
                    .unwrap();
                black_box(
                    session
                        .execute(&Statement::Disp {
                            input: "procs".into(),
                            attrs: vec![],
                            limit: None,
                        })
                        .unwrap(),
                );
            });
        });
    }
    group.finish();
}

fn bench_find_identical_entity(c: &mut Criterion) {
    c.bench_function("find_identical_entity", |b| {
        b.iter(|| {
            let mut session = new_session();
            session
                .execute(&Statement::New {
                    output: "x".into(),
                    type_: Some("process".into()),
                    data: process_rows(50),
                })
                .unwrap();
            black_box(
                session
                    .execute(&Statement::Find {
                        output: "y".into(),
                        type_: "process".into(),
                        input: "x".into(),
                        relation: "".into(),
                        reversed: false,
                        timerange: TimeRange::unbounded(),
                    })
                    .unwrap(),
            );
        });
    });
}

fn bench_get_with_empty_pattern(c: &mut Criterion) {
    c.bench_function("get_with_empty_pattern_result", |b| {
        b.iter(|| {
            let mut session = new_session();
            black_box(
                session
                    .execute(&Statement::Get {
                        output: "z".into(),
                        type_: "process".into(),
                        patternbody: "<missing>".into(),
                        timerange: TimeRange::unbounded(),
                        source: GetSource::Variablesource("missing".into()),
                    })
                    .is_err(),
            );
        });
    });
}

criterion_group!(benches, bench_new_and_disp, bench_find_identical_entity, bench_get_with_empty_pattern);
criterion_main!(benches);
