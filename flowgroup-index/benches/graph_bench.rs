// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Similarity graph construction benchmark
//!
//! Run with: cargo bench -p flowgroup-index --bench graph_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flowgroup_core::SequenceStore;
use flowgroup_index::{build_graph, common_subsequences, connected_components};

fn generate_store(processes: usize, seed: usize) -> SequenceStore {
    SequenceStore::from_pairs((0..processes).map(|p| {
        let len = 4 + (p * 7 + seed) % 6;
        let sequence = (0..len)
            .map(|i| (100 + (p * 13 + i * 31 + seed) % 40) as i64)
            .collect();
        (format!("Process-{p}"), sequence)
    }))
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");
    for &n in &[100usize, 500, 1000] {
        let store = generate_store(n, 3);
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| build_graph(black_box(store), 0.6))
        });
    }
    group.finish();
}

fn bench_components(c: &mut Criterion) {
    let store = generate_store(1000, 5);
    let graph = build_graph(&store, 0.3);
    let ids = store.ids();
    c.bench_function("connected_components_1000", |b| {
        b.iter(|| connected_components(black_box(&ids), black_box(&graph.edges)))
    });
}

fn bench_subsequences(c: &mut Criterion) {
    let store = generate_store(500, 11);
    c.bench_function("common_subsequences_500", |b| {
        b.iter(|| common_subsequences(black_box(&store), 3))
    });
}

criterion_group!(benches, bench_build_graph, bench_components, bench_subsequences);
criterion_main!(benches);
