use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vring::{Consumer, ConsumerStatus, DefaultFactory, Producer, Queue, QueueConfig};

const MESSAGES: u64 = 2_000_000;

fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MESSAGES));

    group.bench_function("claim_publish_consume", |b| {
        b.iter(|| {
            let factory = DefaultFactory::<u64>::new();
            let mut queue = Queue::new(
                "bench",
                QueueConfig {
                    size: 1 << 16,
                    starting_value: 0,
                },
                &factory,
            )
            .unwrap();
            let p0 = queue.attach_producer("p0", 4096).unwrap();
            let c0 = queue.attach_consumer("c0").unwrap();
            let queue = Arc::new(queue);

            let producer_queue = queue.clone();
            let producer_handle = thread::spawn(move || {
                let mut producer = Producer::new(producer_queue, p0);
                for i in 0..MESSAGES {
                    let mut claimed = producer.claim();
                    *claimed.value_mut() = i;
                    drop(claimed);
                    if (i + 1) % 4096 == 0 {
                        producer.publish();
                    }
                }
                producer.eof();
            });

            let mut consumer = Consumer::new(queue.clone(), c0);
            let mut received = 0u64;
            loop {
                match consumer.next() {
                    ConsumerStatus::Ok(v) => {
                        black_box(*v);
                        received += 1;
                    }
                    ConsumerStatus::Eof => break,
                    ConsumerStatus::Flush => continue,
                }
            }

            producer_handle.join().unwrap();
            assert_eq!(received, MESSAGES);
        });
    });

    group.finish();
}

fn bench_mpsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpsc");

    for &num_producers in &[2usize, 4] {
        let per_producer = MESSAGES / num_producers as u64;
        group.throughput(Throughput::Elements(per_producer * num_producers as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_1C")),
            &num_producers,
            |b, &n| {
                b.iter(|| {
                    let factory = DefaultFactory::<u64>::new();
                    let mut queue = Queue::new(
                        "bench",
                        QueueConfig {
                            size: 1 << 16,
                            starting_value: 0,
                        },
                        &factory,
                    )
                    .unwrap();
                    let producer_indices: Vec<_> =
                        (0..n).map(|i| queue.attach_producer(format!("p{i}"), 4096).unwrap()).collect();
                    let c0 = queue.attach_consumer("c0").unwrap();
                    let queue = Arc::new(queue);

                    let handles: Vec<_> = producer_indices
                        .into_iter()
                        .map(|idx| {
                            let q = queue.clone();
                            thread::spawn(move || {
                                let mut producer = Producer::new(q, idx);
                                for i in 0..per_producer {
                                    let mut claimed = producer.claim();
                                    *claimed.value_mut() = i;
                                    drop(claimed);
                                    if (i + 1) % 4096 == 0 {
                                        producer.publish();
                                    }
                                }
                                producer.eof();
                            })
                        })
                        .collect();

                    let mut consumer = Consumer::new(queue.clone(), c0);
                    let mut received = 0u64;
                    loop {
                        match consumer.next() {
                            ConsumerStatus::Ok(v) => {
                                black_box(*v);
                                received += 1;
                            }
                            ConsumerStatus::Eof => break,
                            ConsumerStatus::Flush => continue,
                        }
                    }

                    for h in handles {
                        h.join().unwrap();
                    }
                    assert_eq!(received, per_producer * n as u64);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_spsc, bench_mpsc);
criterion_main!(benches);
