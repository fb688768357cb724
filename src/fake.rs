//! Test doubles: a PMU whose counters tick at a fixed rate against a
//! virtual clock, and a sleeper that advances that clock instantly.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crate::count::{Pmu, PmuCounter, Stat};
use crate::error::CounterOp;
use crate::event::CounterSpec;
use crate::sampling::{Cancel, Sleep, Wake};

#[derive(Clone, Default)]
pub struct VirtualClock(Rc<Cell<Duration>>);

impl VirtualClock {
    pub fn now(&self) -> Duration {
        self.0.get()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

/// Open/release bookkeeping shared by a [`FakePmu`] and its counters.
#[derive(Clone, Default)]
pub struct Ledger {
    attempts: Rc<Cell<usize>>,
    acquired: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl Ledger {
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    fn bump(cell: &Cell<usize>) {
        cell.set(cell.get() + 1);
    }
}

pub const DEFAULT_RATE: u64 = 1_000;

pub struct FakePmu {
    pub clock: VirtualClock,
    pub ledger: Ledger,
    rates: HashMap<String, u64>,
    unsupported: HashSet<String>,
    failures: HashMap<String, (CounterOp, usize)>,
}

impl FakePmu {
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            ledger: Ledger::default(),
            rates: HashMap::new(),
            unsupported: HashSet::new(),
            failures: HashMap::new(),
        }
    }

    /// Events per virtual second for `name`, [`DEFAULT_RATE`] otherwise.
    pub fn with_rate(mut self, name: &str, rate: u64) -> Self {
        self.rates.insert(name.to_string(), rate);
        self
    }

    /// Opening `name` fails with ENOENT.
    pub fn unsupported(mut self, name: &str) -> Self {
        self.unsupported.insert(name.to_string());
        self
    }

    /// The `nth` (1-based) call of `op` on `name` fails with EIO.
    pub fn fail_on(mut self, name: &str, op: CounterOp, nth: usize) -> Self {
        self.failures.insert(name.to_string(), (op, nth));
        self
    }
}

impl Pmu for FakePmu {
    type Counter = FakeCounter;

    fn open(&mut self, spec: &CounterSpec) -> io::Result<FakeCounter> {
        Ledger::bump(&self.ledger.attempts);
        if self.unsupported.contains(&spec.name) {
            return Err(io::Error::from_raw_os_error(libc::ENOENT));
        }
        Ledger::bump(&self.ledger.acquired);

        Ok(FakeCounter {
            clock: self.clock.clone(),
            rate: self.rates.get(&spec.name).copied().unwrap_or(DEFAULT_RATE),
            started: Cell::new(None),
            count: Cell::new(0),
            calls: RefCell::new(HashMap::new()),
            failure: self.failures.get(&spec.name).copied(),
            released: self.ledger.released.clone(),
        })
    }
}

pub struct FakeCounter {
    clock: VirtualClock,
    rate: u64,
    started: Cell<Option<Duration>>,
    count: Cell<u64>,
    calls: RefCell<HashMap<CounterOp, usize>>,
    failure: Option<(CounterOp, usize)>,
    released: Rc<Cell<usize>>,
}

impl FakeCounter {
    fn check(&self, op: CounterOp) -> io::Result<()> {
        let mut calls = self.calls.borrow_mut();
        let nth = calls.entry(op).or_default();
        *nth += 1;
        match self.failure {
            Some((fail_op, fail_nth)) if fail_op == op && fail_nth == *nth => {
                Err(io::Error::from_raw_os_error(libc::EIO))
            }
            _ => Ok(()),
        }
    }

    fn running(&self) -> u64 {
        match self.started.get() {
            Some(since) => self.rate * (self.clock.now() - since).as_secs(),
            None => 0,
        }
    }
}

impl PmuCounter for FakeCounter {
    fn clear_count(&self) -> io::Result<()> {
        self.check(CounterOp::Reset)?;
        self.count.set(0);
        if self.started.get().is_some() {
            self.started.set(Some(self.clock.now()));
        }
        Ok(())
    }

    fn enable(&self) -> io::Result<()> {
        self.check(CounterOp::Enable)?;
        if self.started.get().is_none() {
            self.started.set(Some(self.clock.now()));
        }
        Ok(())
    }

    fn disable(&self) -> io::Result<()> {
        self.check(CounterOp::Disable)?;
        self.count.set(self.count.get() + self.running());
        self.started.set(None);
        Ok(())
    }

    fn stat(&self) -> io::Result<Stat> {
        self.check(CounterOp::Read)?;
        Ok(Stat {
            count: self.count.get() + self.running(),
            time_enabled: None,
            time_running: None,
        })
    }
}

impl Drop for FakeCounter {
    fn drop(&mut self) {
        Ledger::bump(&self.released);
    }
}

/// Advances a [`VirtualClock`] instead of blocking.
pub struct FakeSleep {
    clock: VirtualClock,
    slack: Duration,
    sleeps: Rc<Cell<usize>>,
    cancel: Option<(usize, Cancel, Wake)>,
}

impl FakeSleep {
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            slack: Duration::ZERO,
            sleeps: Rc::default(),
            cancel: None,
        }
    }

    /// Every sleep overshoots by `slack`.
    pub fn with_slack(mut self, slack: Duration) -> Self {
        self.slack = slack;
        self
    }

    /// Requests cancellation on the `nth` sleep and reports `wake` for it.
    pub fn cancel_on(mut self, nth: usize, cancel: Cancel, wake: Wake) -> Self {
        self.cancel = Some((nth, cancel, wake));
        self
    }

    pub fn sleeps(&self) -> Rc<Cell<usize>> {
        self.sleeps.clone()
    }
}

impl Sleep for FakeSleep {
    fn sleep(&mut self, interval: Duration) -> Wake {
        let nth = self.sleeps.get() + 1;
        self.sleeps.set(nth);
        self.clock.advance(interval + self.slack);

        match &self.cancel {
            Some((at, cancel, wake)) if *at == nth => {
                cancel.cancel();
                *wake
            }
            _ => Wake::Elapsed,
        }
    }
}

/// In-memory sink that stays readable after being moved into a writer.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that accepts the first `ok` writes and fails every later one,
/// like a disk filling up.
pub struct BrokenPipe {
    ok: usize,
}

impl BrokenPipe {
    pub fn after(ok: usize) -> Self {
        Self { ok }
    }
}

impl Write for BrokenPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.ok == 0 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.ok -= 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
