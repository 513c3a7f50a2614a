use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use wfg::{CycleResolver, TranIndex, Wfg};

struct NoopResolver;
impl CycleResolver for NoopResolver {
    fn resolve(&self, _tran_index: TranIndex, _arg: u64) {}
}

fn resolver() -> Arc<dyn CycleResolver> {
    Arc::new(NoopResolver)
}

fn six_vertex_graph() -> Wfg {
    let wfg = Wfg::new();
    wfg.alloc_nodes(6).unwrap();
    wfg.insert_out_edges(0, &[1], resolver(), 0).unwrap();
    wfg.insert_out_edges(1, &[2, 3], resolver(), 0).unwrap();
    wfg.insert_out_edges(2, &[3, 5], resolver(), 0).unwrap();
    wfg.insert_out_edges(3, &[5], resolver(), 0).unwrap();
    wfg.insert_out_edges(4, &[0], resolver(), 0).unwrap();
    wfg.insert_out_edges(5, &[0, 4], resolver(), 0).unwrap();
    wfg
}

fn saturated_graph(n: usize) -> Wfg {
    let wfg = Wfg::new();
    wfg.alloc_nodes(n).unwrap();
    for w in 0..n {
        let holders: Vec<TranIndex> = (0..n).filter(|&h| h != w).collect();
        wfg.insert_out_edges(w, &holders, resolver(), 0).unwrap();
    }
    wfg
}

fn bench_six_vertex(c: &mut Criterion) {
    let wfg = six_vertex_graph();
    c.bench_function("detect_cycle six-vertex example", |b| {
        b.iter(|| wfg.detect_cycle().unwrap());
    });
}

fn bench_pruned_search(c: &mut Criterion) {
    let wfg = saturated_graph(6);
    c.bench_function("detect_cycle pruned at default caps", |b| {
        b.iter(|| wfg.detect_cycle().unwrap());
    });
}

criterion_group!(benches, bench_six_vertex, bench_pruned_search);
criterion_main!(benches);
