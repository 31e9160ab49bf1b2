use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use recorm::qb::{QueryState, substitute, upsert_sql};
use recorm::{Param, Row, Value, escape_literal, params};

/// `col0 = ? and col1 = ? ...` with `n` markers and matching values.
fn condition(n: usize) -> (String, Vec<Param>) {
    let template = (0..n)
        .map(|i| format!("col{i} = ?"))
        .collect::<Vec<_>>()
        .join(" and ");
    let values = (0..n)
        .map(|i| {
            if i % 2 == 0 {
                Param::from(i as i64)
            } else {
                Param::from(format!("it's {i}"))
            }
        })
        .collect();
    (template, values)
}

fn bench_substitute(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/substitute");

    for n in [1, 5, 10, 50, 100] {
        let (template, values) = condition(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                black_box(substitute(
                    &template,
                    values.clone(),
                    '?',
                    &escape_literal,
                    "where",
                ))
            });
        });
    }

    group.finish();
}

fn bench_select_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/select");

    for n in [1, 5, 10, 50] {
        let (template, values) = condition(n);
        let fragment = substitute(&template, values, '?', &escape_literal, "where")
            .unwrap_or_default();
        let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
                let mut state = QueryState::new("t");
                let _ = state.select(&cols);
                state.push_where(&fragment);
                let _ = state.order(&["col0 DESC"]);
                let _ = state.limit(20, Some(10));
                black_box(state.to_sql());
            });
        });
    }

    group.finish();
}

fn bench_where_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/where_in");

    for n in [5, 20, 100, 500] {
        let ids: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| {
                let template = recorm::qb::make_where_in("id", params![ids.clone()], '?');
                black_box(substitute(
                    &template,
                    params![ids.clone()],
                    '?',
                    &escape_literal,
                    "where",
                ))
            });
        });
    }

    group.finish();
}

fn bench_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/upsert");
    let columns: Vec<String> = ["id", "name", "score"].map(String::from).to_vec();
    let primary_key = vec!["id".to_string()];

    for n in [1, 10, 100, 1000] {
        let rows: Vec<Row> = (0..n)
            .map(|i| {
                Row::from_pairs([
                    ("id", Value::Int(i)),
                    ("name", Value::from(format!("user {i}"))),
                    ("score", Value::Float(i as f64 / 3.0)),
                ])
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| {
                black_box(upsert_sql(
                    "scores",
                    &columns,
                    &primary_key,
                    rows,
                    &escape_literal,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_substitute,
    bench_select_assembly,
    bench_where_in,
    bench_upsert
);
criterion_main!(benches);
