use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use mwviews::{Granularity, PageviewTable, Timestamp};
use mwviews_client::aggregation::{ArticleItem, merge, roll_up_monthly};
use mwviews_client::{FetchOutcome, RawResult};
use mwviews_core::dates::sequence;
use serde_json::json;
use std::hint::black_box;

const DAYS: i64 = 365;

fn subjects(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Article_{i}")).collect()
}

fn start() -> Timestamp {
    Timestamp::from_date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap())
}

fn end() -> Timestamp {
    Timestamp::from_date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap() + chrono::Duration::days(DAYS - 1))
}

fn create_results(subjects: &[String]) -> Vec<RawResult> {
    subjects
        .iter()
        .enumerate()
        .map(|(n, article)| {
            let items: Vec<_> = sequence(start(), end(), Granularity::Daily)
                .enumerate()
                .map(|(i, ts)| {
                    json!({
                        "article": article,
                        "timestamp": ts.format(),
                        "views": (i * 7 + n) as u64,
                    })
                })
                .collect();
            RawResult {
                url: format!("https://example.org/{article}"),
                outcome: FetchOutcome::Response {
                    status: 200,
                    body: Some(json!({ "items": items })),
                },
            }
        })
        .collect()
}

fn benchmark_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    group.sample_size(20);

    for count in [1, 10, 50] {
        let names = subjects(count);
        let results = create_results(&names);

        group.bench_function(format!("merge_{count}_articles_one_year"), |b| {
            b.iter(|| {
                let mut table =
                    PageviewTable::seeded(sequence(start(), end(), Granularity::Daily), &names);
                let usable = merge::<ArticleItem>(&mut table, black_box(&results)).unwrap();
                black_box((usable, table))
            });
        });
    }

    group.finish();
}

fn benchmark_monthly_roll_up(c: &mut Criterion) {
    let mut group = c.benchmark_group("monthly_roll_up");

    let names = subjects(20);
    let results = create_results(&names);
    let mut daily = PageviewTable::seeded(sequence(start(), end(), Granularity::Daily), &names);
    merge::<ArticleItem>(&mut daily, &results).unwrap();

    group.bench_function("roll_up_20_articles_one_year", |b| {
        b.iter(|| black_box(roll_up_monthly(black_box(&daily))));
    });

    group.finish();
}

criterion_group!(benches, benchmark_merge, benchmark_monthly_roll_up);
criterion_main!(benches);
