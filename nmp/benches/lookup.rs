use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nmp::postcode::{normalize, pack};
use nmp::{sort_by_distance, LatLon, PostcodePack};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{PackFixture, Records};

const BUCKET_SIZE: usize = 1000;

/// `SW1A 1AA`, `SW1A 1AB`, ... in code order.
fn postcodes() -> Vec<String> {
    let letters = b'A'..=b'Z';
    (b'1'..=b'9')
        .flat_map(|d| {
            letters.clone().flat_map(move |f| {
                (b'A'..=b'Z').map(move |g| format!("SW1A{}{}{}", d as char, f as char, g as char))
            })
        })
        .take(BUCKET_SIZE)
        .collect()
}

/// One dense bucket of delta-encoded records.
fn create_pack(postcodes: &[String]) -> PostcodePack {
    let first = pack(&normalize(&postcodes[0]).unwrap()).unwrap();
    let mut records = Records::new().absolute(first, 30_000, 30_000);
    for i in 1..postcodes.len() {
        let step = if i % 2 == 0 { 3 } else { -2 };
        records = records.delta(1, step, -step);
    }
    let bytes = PackFixture::new().bucket(b"SW", records).build();
    PostcodePack::from_bytes(bytes).unwrap()
}

fn bench_single_lookup(c: &mut Criterion) {
    let postcodes = postcodes();
    let pack = create_pack(&postcodes);
    let first = postcodes[0].clone();
    let last = postcodes[BUCKET_SIZE - 1].clone();

    c.bench_function("lookup_first_in_bucket", |b| {
        b.iter(|| black_box(pack.lookup(black_box(&first)).unwrap()));
    });

    c.bench_function("lookup_last_in_bucket", |b| {
        b.iter(|| black_box(pack.lookup(black_box(&last)).unwrap()));
    });

    c.bench_function("lookup_not_found", |b| {
        b.iter(|| black_box(pack.lookup(black_box("SW9Z9ZZ")).is_err()));
    });
}

fn bench_lookup_many(c: &mut Criterion) {
    let postcodes = postcodes();
    let pack = create_pack(&postcodes);

    c.bench_function("lookup_many_1000_same_bucket", |b| {
        b.iter(|| black_box(pack.lookup_many(black_box(&postcodes))));
    });
}

fn bench_normalize_and_pack(c: &mut Criterion) {
    c.bench_function("normalize_and_pack", |b| {
        b.iter(|| {
            let postcode = normalize(black_box("SW1A1AA")).unwrap();
            black_box(pack(&postcode).unwrap())
        });
    });
}

fn bench_sort_by_distance(c: &mut Criterion) {
    let points: Vec<LatLon> = (0..BUCKET_SIZE)
        .map(|i| {
            let frac = i as f64 / BUCKET_SIZE as f64;
            LatLon::new(50.0 + frac * 8.0, -5.0 + ((i * 7919) % 1000) as f64 / 200.0)
        })
        .collect();
    let reference = LatLon::new(51.5074, -0.1278);

    c.bench_function("sort_1000_by_distance", |b| {
        b.iter(|| black_box(sort_by_distance(black_box(&points), reference)));
    });
}

criterion_group!(
    benches,
    bench_single_lookup,
    bench_lookup_many,
    bench_normalize_and_pack,
    bench_sort_by_distance,
);
criterion_main!(benches);
