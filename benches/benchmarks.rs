use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use statecast::{BehaviorSubject, Observable, ObservableStore, Snapshot, State, Subject};

#[derive(Clone)]
struct Counter {
    value: usize,
    name: String,
}

#[derive(Default)]
struct CounterPatch {
    value: Option<usize>,
    name: Option<String>,
}

impl State for Counter {
    type Patch = CounterPatch;

    fn merge(&self, patch: &CounterPatch) -> Self {
        Self {
            value: patch.value.unwrap_or(self.value),
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
        }
    }
}

fn subject_next_benchmark(c: &mut Criterion) {
    let subject: Subject<i32> = Subject::new();
    let _sub = subject.subscribe(|v: &i32| {
        black_box(v);
    });

    c.bench_function("subject_next", |b| {
        let mut i = 0;
        b.iter(|| {
            subject.next(black_box(i));
            i += 1;
        });
    });
}

fn behavior_subscribe_benchmark(c: &mut Criterion) {
    let subject = BehaviorSubject::new(42);

    c.bench_function("behavior_subscribe", |b| {
        b.iter(|| {
            let sub = subject.subscribe(|v: &i32| {
                black_box(v);
            });
            sub.unsubscribe();
        });
    });
}

fn store_update_benchmark(c: &mut Criterion) {
    let store = ObservableStore::new();
    store
        .setup(Counter {
            value: 0,
            name: "test".to_string(),
        })
        .unwrap();

    c.bench_function("store_update", |b| {
        let mut i = 0;
        b.iter(|| {
            store
                .update_state(CounterPatch {
                    value: Some(black_box(i)),
                    ..Default::default()
                })
                .unwrap();
            i += 1;
        });
    });
}

fn dynamic_store_update_benchmark(c: &mut Criterion) {
    let store = ObservableStore::new();
    store
        .setup(Snapshot::new().with("user", "Noran").with("count", 0))
        .unwrap();

    c.bench_function("dynamic_store_update", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store
                .update_state(Snapshot::new().with("count", black_box(i)))
                .unwrap();
            i += 1;
        });
    });
}

fn store_selection_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_select");

    for subscriber_count in [1, 10, 100].iter() {
        let store = ObservableStore::new();
        store
            .setup(Counter {
                value: 0,
                name: "test".to_string(),
            })
            .unwrap();

        let subs: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                store
                    .select(|s: &Counter| s.value)
                    .unwrap()
                    .subscribe(|v: &usize| {
                        black_box(v);
                    })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    store
                        .update_state(CounterPatch {
                            value: Some(black_box(i)),
                            ..Default::default()
                        })
                        .unwrap();
                    i += 1;
                });
            },
        );

        for sub in subs {
            sub.unsubscribe();
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    subject_next_benchmark,
    behavior_subscribe_benchmark,
    store_update_benchmark,
    dynamic_store_update_benchmark,
    store_selection_benchmark,
);
criterion_main!(benches);
