//! Benchmarks for the admission pools and a dispatch pass.
//!
//! Benchmarks cover:
//! - OrderedPool sync under shuffled insertion order
//! - OrderedPool drain from the front
//! - JobPool resync of an unchanged listing
//! - A full dispatch pass against the in-memory store

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cicd_scheduler::core::{
    by_creation_time, IntegrationJob, JobExecutor, JobNode, JobPool, OrderedPool, Scheduler,
};
use cicd_scheduler::infra::InMemoryJobStore;
use cicd_scheduler::util::Signal;
use tokio::runtime::Runtime;

struct BenchExecutor;

#[async_trait]
impl JobExecutor for BenchExecutor {
    async fn start(&self, _job: &IntegrationJob) -> Result<(), String> {
        Ok(())
    }
}

fn shuffled_jobs(count: usize) -> Vec<IntegrationJob> {
    let mut jobs: Vec<IntegrationJob> = (0..count)
        .map(|i| IntegrationJob::new("bench", format!("job-{i}"), (i / 4) as u128))
        .collect();
    jobs.shuffle(&mut rand::rng());
    jobs
}

// ============================================================================
// OrderedPool
// ============================================================================

fn bench_ordered_pool_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_pool_sync");
    for size in [100_usize, 1_000, 5_000] {
        let nodes: Vec<JobNode> = shuffled_jobs(size).iter().map(JobNode::from).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &nodes, |b, nodes| {
            b.iter(|| {
                let mut pool = OrderedPool::<JobNode>::new(by_creation_time);
                for node in nodes {
                    pool.sync(node.clone());
                }
                black_box(pool.len())
            });
        });
    }
    group.finish();
}

fn bench_ordered_pool_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_pool_pop_front");
    for size in [100_usize, 1_000, 5_000] {
        let mut filled = OrderedPool::<JobNode>::new(by_creation_time);
        for job in shuffled_jobs(size) {
            filled.sync(JobNode::from(&job));
        }
        let nodes: Vec<JobNode> = filled.iter().cloned().collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &nodes, |b, nodes| {
            b.iter_batched(
                || {
                    let mut pool = OrderedPool::<JobNode>::new(by_creation_time);
                    for node in nodes {
                        pool.sync(node.clone());
                    }
                    pool
                },
                |mut pool| {
                    while let Some(node) = pool.pop_front() {
                        black_box(node);
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// ============================================================================
// JobPool and dispatch
// ============================================================================

fn bench_job_pool_resync(c: &mut Criterion) {
    let jobs = shuffled_jobs(1_000);
    let (signal, _rx) = Signal::channel();
    let mut pool = JobPool::new(signal);
    for job in &jobs {
        pool.sync_job(job);
    }

    c.bench_function("job_pool_resync_unchanged_1000", |b| {
        b.iter(|| {
            for job in &jobs {
                pool.sync_job(black_box(job));
            }
        });
    });
}

fn bench_dispatch_pass(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let store = Arc::new(InMemoryJobStore::new());
    for job in shuffled_jobs(500) {
        store.upsert(job);
    }
    // Cap of zero keeps the listing unchanged between iterations.
    let (_scheduler, mut dispatcher) = Scheduler::new(
        store,
        Arc::new(BenchExecutor),
        Arc::new(0_usize),
        Duration::from_secs(3),
    );

    c.bench_function("dispatch_pass_500_pending", |b| {
        b.iter(|| rt.block_on(async { black_box(dispatcher.dispatch().await.expect("dispatch")) }));
    });
}

criterion_group!(
    benches,
    bench_ordered_pool_sync,
    bench_ordered_pool_drain,
    bench_job_pool_resync,
    bench_dispatch_pass
);
criterion_main!(benches);
