use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradestat_core::engine::analyze;
use gradestat_core::loader::{read_csv, RawCell, RawTable};
use gradestat_core::model::{ClassId, ScoreTable, StudentRecord, SubjectConfig, SubjectMap};
use gradestat_core::schema::ColumnSchema;
use gradestat_core::statistics::{trimmed_average, SubjectStats};

fn make_scores(n: usize) -> Vec<f64> {
    (0..n).map(|i| ((i * 37) % 101) as f64).collect()
}

fn make_table(students: usize, classes: usize) -> ScoreTable {
    (0..students)
        .map(|i| {
            StudentRecord::new(
                ClassId::new((i % classes + 1).to_string()),
                SubjectMap::from_fn(|s| ((i * 31 + s as usize * 17) % 101) as f64),
            )
        })
        .collect()
}

fn bench_trimmed_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("trimmed_average");

    for n in [40, 400, 4000] {
        let scores = make_scores(n);
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| trimmed_average(black_box(&scores)))
        });
    }

    group.bench_function("subject_stats n=400", |b| {
        let scores = make_scores(400);
        b.iter(|| SubjectStats::compute(black_box(&scores), black_box(100.0)))
    });

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let config = SubjectConfig::default();

    group.bench_function("grade of 400 in 10 classes", |b| {
        let table = make_table(400, 10);
        b.iter(|| analyze(black_box(&table), black_box(&config)))
    });

    group.bench_function("grade of 4000 in 80 classes", |b| {
        let table = make_table(4000, 80);
        b.iter(|| analyze(black_box(&table), black_box(&config)))
    });

    group.finish();
}

fn bench_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaning");
    let schema = ColumnSchema::default();

    let mut csv = String::from("title\n,\n,\nheader\n");
    for i in 0..1000 {
        let mut fields = vec![String::new(); 20];
        fields[1] = (i % 12 + 1).to_string();
        for col in [7, 10, 13, 16, 19] {
            fields[col] = if i % 50 == 0 {
                "absent".to_string()
            } else {
                ((i * col) % 101).to_string()
            };
        }
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    group.bench_function("csv 1000 rows", |b| {
        b.iter(|| {
            read_csv(black_box(csv.as_bytes()))
                .and_then(|raw| raw.into_score_table(&schema))
        })
    });

    group.bench_function("raw table 1000 rows", |b| {
        let rows: Vec<Vec<RawCell>> = (0..1004)
            .map(|i| {
                (0..20)
                    .map(|c| RawCell::Number(((i * c) % 101) as f64))
                    .collect()
            })
            .collect();
        b.iter(|| RawTable::new(black_box(rows.clone())).into_score_table(&schema))
    });

    group.finish();
}

criterion_group!(benches, bench_trimmed_average, bench_analyze, bench_cleaning);
criterion_main!(benches);
