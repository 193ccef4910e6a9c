#[cfg(feature = "bench")]
use std::time::Duration;

#[cfg(feature = "bench")]
use criterion::{Criterion, criterion_group, criterion_main};

#[cfg(feature = "bench")]
use doubles_draw::{Roster, SchedulerConfig, generate_schedule};
#[cfg(feature = "bench")]
use rand::{SeedableRng, rngs::StdRng};

#[cfg(feature = "bench")]
fn names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}")).collect()
}

#[cfg(feature = "bench")]
fn schedules(c: &mut Criterion) {
    let config = SchedulerConfig::default();

    let equal = Roster::Mixed {
        pool_a: names("a", 12),
        pool_b: names("b", 12),
    };
    let unequal = Roster::Mixed {
        pool_a: names("a", 19),
        pool_b: names("b", 20),
    };
    let same_pool = Roster::SamePool(names("p", 16));

    c.bench_function("equal_pools", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| generate_schedule(&equal, 5, &config, &mut rng));
    });

    c.bench_function("unequal_pools", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| generate_schedule(&unequal, 4, &config, &mut rng));
    });

    c.bench_function("same_pool", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| generate_schedule(&same_pool, 5, &config, &mut rng));
    });
}

#[cfg(feature = "bench")]
criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10)).sample_size(10);
    targets = schedules
}

#[cfg(feature = "bench")]
criterion_main!(benches);

#[cfg(not(feature = "bench"))]
fn main() {
    eprintln!("You must enable pass `--features=bench`");
}
