use criterion::{Criterion, Throughput};
use sdramdiag::system::shell::{Command, Dispatch, Shell, ShellResult};
use std::fmt::Write;

fn nop(calls: &mut u64, _out: &mut dyn Write, argv: &[&str]) -> ShellResult {
    *calls += argv.len() as u64;
    ShellResult::Ok
}

const TABLE: [Command<u64>; 4] = [
    Command {
        name: "mem",
        description: "",
        handler: nop,
    },
    Command {
        name: "threads",
        description: "",
        handler: nop,
    },
    Command {
        name: "sdram",
        description: "",
        handler: nop,
    },
    Command {
        name: "normal",
        description: "",
        handler: nop,
    },
];

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let line = "normal a b c";
    group.throughput(Throughput::Bytes(line.len() as u64));
    group.bench_function("dispatch", |b| {
        let shell = Shell::new(&TABLE);
        let mut calls = 0u64;
        let mut out = String::new();
        b.iter(|| {
            out.clear();
            assert_eq!(
                shell.dispatch(&mut calls, &mut out, line),
                Dispatch::Handled(ShellResult::Ok)
            );
        })
    });
    group.finish();
}
