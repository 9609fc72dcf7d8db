//! Phase timers for the solvers.
//!
//! Timers are keyed by static names and nest through the `timeit!` macro.
//! The solvers read [`Timers::total_time`] to enforce their time limits.

use std::collections::HashMap;
use std::time::Duration;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        use web_time::Instant;
    } else {
        use std::time::Instant;
    }
}

#[derive(Debug, Default)]
struct PhaseTimer {
    start: Option<Instant>,
    elapsed: Duration,
}

impl PhaseTimer {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    fn elapsed(&self) -> Duration {
        match self.start {
            Some(instant) => self.elapsed + instant.elapsed(),
            None => self.elapsed,
        }
    }
}

/// Collection of named phase timers.   The root timer (the first
/// one started) measures the whole solve.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    timers: HashMap<&'static str, PhaseTimer>,
    root: Option<&'static str>,
}

impl Timers {
    pub fn reset(&mut self) {
        self.stack.clear();
        self.timers.clear();
        self.root = None;
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        if self.root.is_none() {
            self.root = Some(key);
        }
        self.timers.entry(key).or_default().start();
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(key) = self.stack.pop() {
            if let Some(t) = self.timers.get_mut(key) {
                t.stop();
            }
        }
    }

    /// Elapsed time for a named phase
    pub fn elapsed(&self, key: &'static str) -> Duration {
        self.timers.get(key).map_or(Duration::ZERO, PhaseTimer::elapsed)
    }

    /// Elapsed time of the root phase, including time still running
    pub fn total_time(&self) -> Duration {
        self.root.map_or(Duration::ZERO, |key| self.elapsed(key))
    }

    /// One line per phase, sorted by name
    pub fn print(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        let mut keys: Vec<_> = self.timers.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(out, "  {:<16} : {:?}", key, self.elapsed(key))?;
        }
        Ok(())
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

#[test]
fn test_timers() {
    let mut timers = Timers::default();
    timeit! {timers => "solve"; {
        timeit!{timers => "inner"; {
            let _ = (0..1000).sum::<u64>();
        }}
    }}
    assert!(timers.total_time() >= timers.elapsed("inner"));
    assert_eq!(timers.elapsed("missing"), Duration::ZERO);

    let mut out = Vec::new();
    timers.print(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.find("inner").unwrap() < text.find("solve").unwrap());
}
