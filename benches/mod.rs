use criterion::{criterion_group, criterion_main};

mod sdram;

criterion_group!(
    benches,
    sdram::engine::bench_fill,
    sdram::engine::bench_verify,
    sdram::engine::bench_exercise,
    sdram::shell::bench_dispatch
);
criterion_main!(benches);
