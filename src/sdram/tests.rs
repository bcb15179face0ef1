use super::*;
use crate::storage::{ReadStorage, SliceRegion};
use core::cell::Cell;

const REGION_SIZE: usize = 4096;

struct StepClock {
    now: Cell<u32>,
}

impl Clock for StepClock {
    fn now(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(2_000));
        t
    }

    fn frequency(&self) -> u32 {
        1_000_000
    }
}

/// Controller whose busy flag stays set for a fixed number of polls and which
/// either obeys commands or stays stuck in one mode.
struct MockController {
    mode: Mode,
    stuck: bool,
    busy_polls: u32,
    remaining: u32,
    commands: u32,
    polls: u32,
    mode_reads_while_busy: u32,
}

impl MockController {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            stuck: false,
            busy_polls: 3,
            remaining: 0,
            commands: 0,
            polls: 0,
            mode_reads_while_busy: 0,
        }
    }
}

impl ModeControl for MockController {
    fn command(&mut self, target: Target) {
        self.commands += 1;
        self.remaining = self.busy_polls;
        if !self.stuck {
            self.mode = target.mode();
        }
    }

    fn is_busy(&mut self) -> bool {
        self.polls += 1;
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    fn mode(&mut self) -> Mode {
        if self.remaining > 0 {
            self.mode_reads_while_busy += 1;
        }
        self.mode
    }
}

fn engine(bank: &mut [u8]) -> Sdram<SliceRegion<'_>, StepClock, MockController> {
    Sdram::new(
        SliceRegion::new(bank),
        StepClock { now: Cell::new(0) },
        MockController::new(Mode::Normal),
    )
}

#[test]
fn test_pattern_wraps_modulo_256() {
    assert_eq!(pattern_byte(0x3C, 0), 0x3C);
    assert_eq!(pattern_byte(0x3C, 12345), 117);
    assert_eq!(pattern_byte(0xFF, 1), 0);
    assert_eq!(pattern_byte(0, 256), 0);
}

#[test]
fn test_fill_then_verify_succeeds_for_every_base() {
    let mut bank = vec![0u8; 1024];
    let mut sdram = engine(&mut bank);
    for base in 0..=255u8 {
        sdram.fill(base).unwrap();
        assert_eq!(sdram.verify(base), Ok(()));
    }
}

#[test]
fn test_fill_stores_expected_bytes() {
    let mut bank = vec![0u8; REGION_SIZE];
    let mut sdram = engine(&mut bank);
    sdram.fill(0x3C).unwrap();
    let bytes = sdram.region().as_slice();
    assert_eq!(bytes[0], 0x3C);
    assert_eq!(bytes[1], 0x3D);
    assert_eq!(bytes[0xC4], 0x00);
    assert_eq!(bytes[REGION_SIZE - 1], pattern_byte(0x3C, (REGION_SIZE - 1) as u32));
}

#[test]
fn test_erase_then_verify_reports_offset_zero() {
    let mut bank = vec![0xAAu8; REGION_SIZE];
    let mut sdram = engine(&mut bank);
    sdram.erase().unwrap();
    assert!(sdram.region().as_slice().iter().all(|&b| b == 0));

    assert_eq!(
        sdram.verify(0x3C),
        Err(Error::Mismatch(Mismatch {
            offset: 0,
            expected: 0x3C,
            actual: 0,
        }))
    );
}

#[test]
fn test_verify_stops_at_first_mismatch() {
    let mut bank = vec![0u8; REGION_SIZE];
    let mut sdram = engine(&mut bank);
    sdram.fill(7).unwrap();

    // Two faults: only the lower one may be reported.
    sdram.region_mut().write_byte(2000, 0xEE).unwrap();
    sdram.region_mut().write_byte(3000, 0xEE).unwrap();

    match sdram.verify(7) {
        Err(Error::Mismatch(m)) => {
            assert_eq!(m.offset, 2000);
            assert_eq!(m.expected, pattern_byte(7, 2000));
            assert_eq!(m.actual, 0xEE);
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

/// Region that counts reads so tests can see where a scan stopped.
struct CountingRegion<'a> {
    inner: SliceRegion<'a>,
    reads: usize,
}

impl ReadStorage for CountingRegion<'_> {
    type Error = storage::Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.reads += bytes.len();
        self.inner.read(offset, bytes)
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

impl Storage for CountingRegion<'_> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.inner.write(offset, bytes)
    }
}

#[test]
fn test_verify_never_reads_past_the_fault() {
    let mut bank = vec![0u8; REGION_SIZE];
    let region = CountingRegion {
        inner: SliceRegion::new(&mut bank),
        reads: 0,
    };
    let mut sdram = Sdram::new(
        region,
        StepClock { now: Cell::new(0) },
        MockController::new(Mode::Normal),
    );
    sdram.fill(1).unwrap();
    sdram.region_mut().inner.as_mut_slice()[41] ^= 0xFF;

    assert!(matches!(sdram.verify(1), Err(Error::Mismatch(m)) if m.offset == 41));
    assert_eq!(sdram.region().reads, 42);
}

#[test]
fn test_read_sweep_touches_every_byte_once() {
    let mut bank = vec![0u8; REGION_SIZE];
    let region = CountingRegion {
        inner: SliceRegion::new(&mut bank),
        reads: 0,
    };
    let mut sdram = Sdram::new(
        region,
        StepClock { now: Cell::new(0) },
        MockController::new(Mode::Normal),
    );
    sdram.read_sweep().unwrap();
    assert_eq!(sdram.region().reads, REGION_SIZE);
}

#[test]
fn test_timed_operations_report_milliseconds() {
    let mut bank = vec![0u8; 256];
    let mut sdram = engine(&mut bank);
    // Each start/stop pair spans one clock step of 2000 ticks at 1 MHz.
    assert_eq!(sdram.fill_timed(0x10), Ok(2));
    assert_eq!(sdram.read_sweep_timed(), Ok(2));
    assert_eq!(sdram.verify_timed(0x10), Ok(2));
    assert_eq!(sdram.erase_timed(), Ok(2));
}

#[test]
fn test_exercise_reports_each_pass() {
    let mut bank = vec![0u8; 512];
    let mut sdram = engine(&mut bank);
    let report = sdram.exercise(0x3C).unwrap();
    assert_eq!(
        report,
        ExerciseReport {
            write_ms: 2,
            read_ms: 2,
            check_ms: 2,
        }
    );
    assert_eq!(report.total_ms(), 6);
    assert_eq!(sdram.verify(0x3C), Ok(()));
}

#[test]
fn test_mode_transition_polls_busy_before_confirming() {
    let mut bank = vec![0u8; 16];
    let mut sdram = engine(&mut bank);

    sdram.mode_transition(Target::SelfRefresh).unwrap();
    assert_eq!(sdram.mode_state(), ModeState::SelfRefresh);

    let ctrl = &sdram.controller;
    assert_eq!(ctrl.commands, 1);
    // Three busy polls plus the one that saw the flag clear.
    assert_eq!(ctrl.polls, 4);
    assert_eq!(ctrl.mode_reads_while_busy, 0);
}

#[test]
fn test_mode_transition_reissues_when_already_in_target() {
    let mut bank = vec![0u8; 16];
    let mut sdram = engine(&mut bank);

    sdram.mode_transition(Target::Normal).unwrap();
    sdram.mode_transition(Target::Normal).unwrap();
    assert_eq!(sdram.controller.commands, 2);
    assert_eq!(sdram.controller.polls, 8);
    assert_eq!(sdram.mode_state(), ModeState::Normal);
}

#[test]
fn test_mode_transition_reports_unconfirmed_mode() {
    let mut bank = vec![0u8; 16];
    let mut sdram = engine(&mut bank);
    sdram.controller.stuck = true;

    for initial in [Mode::Normal, Mode::PowerDown] {
        sdram.controller.mode = initial;
        assert_eq!(
            sdram.mode_transition(Target::SelfRefresh),
            Err(Error::NotConfirmed {
                target: Target::SelfRefresh,
                actual: initial,
            })
        );
        assert_eq!(sdram.mode_state(), ModeState::Unknown);
    }
}

#[test]
fn test_mode_transition_times_out_when_busy_never_clears() {
    let mut bank = vec![0u8; 16];
    let mut sdram = engine(&mut bank).with_poll_limit(Some(10));
    sdram.controller.busy_polls = u32::MAX;

    assert_eq!(sdram.mode_transition(Target::Normal), Err(Error::Timeout));
    assert_eq!(sdram.controller.polls, 10);
    assert_eq!(sdram.mode_state(), ModeState::Unknown);
}

#[test]
fn test_unbounded_poll_waits_for_busy_to_clear() {
    let mut bank = vec![0u8; 16];
    let mut sdram = engine(&mut bank).with_poll_limit(None);
    sdram.controller.busy_polls = 100_000;

    assert_eq!(sdram.mode_transition(Target::SelfRefresh), Ok(()));
    assert_eq!(sdram.controller.polls, 100_001);
}

/// Region claiming more bytes than a `u32` offset can address. Any access
/// is a test failure.
struct OversizedRegion {
    accesses: usize,
}

impl ReadStorage for OversizedRegion {
    type Error = storage::Error;

    fn read(&mut self, _offset: u32, _bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.accesses += 1;
        Ok(())
    }

    fn capacity(&self) -> usize {
        usize::MAX
    }
}

impl Storage for OversizedRegion {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        self.accesses += 1;
        Ok(())
    }
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_oversized_region_is_rejected_before_any_access() {
    let mut sdram = Sdram::new(
        OversizedRegion { accesses: 0 },
        StepClock { now: Cell::new(0) },
        MockController::new(Mode::Normal),
    );
    let rejected = Err(Error::Storage(storage::Error::OutOfBounds));

    assert_eq!(sdram.fill(0x3C), rejected);
    assert_eq!(sdram.erase_timed().map(|_| ()), rejected);
    assert_eq!(sdram.verify(0x3C), rejected);
    assert_eq!(sdram.exercise(0x3C).map(|_| ()), rejected);
    assert_eq!(sdram.region().accesses, 0);
}
