//! Statement cache lookups and the SQL rendering they save.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kmedia_orm::cache::{StatementCache, UpdateStatement, cache_key};
use kmedia_orm::{Condition, Sql};
use std::sync::Arc;

const COLUMNS: [&str; 8] = [
    "name",
    "parent_id",
    "catorder",
    "secure",
    "visible",
    "open",
    "label",
    "user_id",
];

fn render_update(columns: &[&str]) -> String {
    let mut q = Sql::new("UPDATE \"catalogs\" SET ");
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            q.push(",");
        }
        q.push_quoted(col).push("=").push_bind(0i32);
    }
    q.push(" WHERE \"id\"=").push_bind(1i32);
    q.to_sql()
}

fn bench_cache_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_cache/key");
    for n in [1, 4, 8] {
        let whitelist = &COLUMNS[..n];
        group.bench_with_input(BenchmarkId::from_parameter(n), &whitelist, |b, wl| {
            b.iter(|| black_box(cache_key(&[*wl, &["id"][..]])));
        });
    }
    group.finish();
}

fn bench_hit_vs_render(c: &mut Criterion) {
    let cache: StatementCache<UpdateStatement> = StatementCache::new("update");
    for n in 1..=COLUMNS.len() {
        let cols = &COLUMNS[..n];
        cache.insert(
            cache_key(&[cols]),
            Arc::new(UpdateStatement {
                sql: render_update(cols),
                value_columns: cols.to_vec(),
            }),
        );
    }

    let mut group = c.benchmark_group("statement_cache/update");
    let key = cache_key(&[&COLUMNS[..]]);
    group.bench_function("hit", |b| b.iter(|| black_box(cache.get(&key))));
    group.bench_function("render", |b| b.iter(|| black_box(render_update(&COLUMNS))));
    group.finish();
}

fn bench_where_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_cache/where");
    for n in [1, 4, 16] {
        let conditions: Vec<Condition> = (0..n)
            .map(|i| Condition::eq(format!("col{i}"), i as i32).unwrap())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &conditions, |b, conds| {
            b.iter(|| {
                let mut q = Sql::new("SELECT * FROM \"catalogs\"");
                q.push_where_and(conds);
                black_box(q.to_sql());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cache_key, bench_hit_vs_render, bench_where_render);
criterion_main!(benches);
