use criterion::{BatchSize, Criterion, Throughput};
use sdramdiag::sdram::{Mode, ModeControl, Sdram, Target};
use sdramdiag::storage::SliceRegion;
use sdramdiag::timing::Clock;
use std::sync::OnceLock;
use std::time::Instant;

const BANK_SIZE: usize = 256 * 1024;

/// Host clock in microseconds since the first read.
pub struct HostClock;

fn epoch() -> &'static Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now)
}

impl Clock for HostClock {
    fn now(&self) -> u32 {
        epoch().elapsed().as_micros() as u32
    }

    fn frequency(&self) -> u32 {
        1_000_000
    }
}

/// Controller that confirms every command immediately.
pub struct Idle(Mode);

impl ModeControl for Idle {
    fn command(&mut self, target: Target) {
        self.0 = target.mode();
    }

    fn is_busy(&mut self) -> bool {
        false
    }

    fn mode(&mut self) -> Mode {
        self.0
    }
}

fn engine(bank: &mut [u8]) -> Sdram<SliceRegion<'_>, HostClock, Idle> {
    Sdram::new(SliceRegion::new(bank), HostClock, Idle(Mode::Normal))
}

pub fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    group.throughput(Throughput::Bytes(BANK_SIZE as u64));
    let mut bank = vec![0u8; BANK_SIZE];
    group.bench_function("fill", |b| {
        let mut sdram = engine(&mut bank);
        b.iter(|| sdram.fill(0x3C).expect("fill failed"))
    });
    group.finish();
}

pub fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    group.throughput(Throughput::Bytes(BANK_SIZE as u64));
    let mut bank = vec![0u8; BANK_SIZE];
    group.bench_function("verify", |b| {
        let mut sdram = engine(&mut bank);
        sdram.fill(0x3C).expect("fill failed");
        b.iter(|| sdram.verify(0x3C).expect("verify failed"))
    });
    group.finish();
}

pub fn bench_exercise(c: &mut Criterion) {
    let mut group = c.benchmark_group("exercise");
    group.throughput(Throughput::Bytes(3 * BANK_SIZE as u64));
    group.bench_function("exercise", |b| {
        b.iter_batched_ref(
            || vec![0u8; BANK_SIZE],
            |bank| {
                engine(bank).exercise(0x5A).expect("exercise failed");
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}
