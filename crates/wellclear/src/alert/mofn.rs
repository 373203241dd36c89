/**
* Alert-level smoothing across ticks.
*
* One window exists per (ownship, intruder) pair. The M-of-N vote reports
* the highest level `ℓ ≥ 1` occurring at least `m` times (counting levels
* `≥ ℓ`) among the last `n` raw levels. The window resets when input time
* regresses or when the gap since the previous sample exceeds the
* hysteresis time. A minimum-dwell rule holds a raised alert at its
* previous value until the persistence time has elapsed since it was first
* raised.
*/
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct MofNWindow {
    window: VecDeque<usize>,
    last_time: f64,
    /// Level currently reported after persistence
    current: usize,
    /// Time the current positive level was first raised
    raised_time: f64,
}

impl Default for MofNWindow {
    fn default() -> Self {
        MofNWindow {
            window: VecDeque::new(),
            last_time: f64::NEG_INFINITY,
            current: 0,
            raised_time: f64::NEG_INFINITY,
        }
    }
}

impl MofNWindow {
    pub fn new() -> Self {
        MofNWindow::default()
    }

    pub fn reset(&mut self) {
        *self = MofNWindow::default();
    }

    /// The pure M-of-N vote over the current window.
    fn vote(&self, m: usize) -> usize {
        let m = m.max(1);
        let top = self.window.iter().copied().max().unwrap_or(0);
        (1..=top)
            .rev()
            .find(|level| {
                self.window.iter().filter(|raw| **raw >= *level).count() >= m
            })
            .unwrap_or(0)
    }

    /// Feed one raw level and return the smoothed level. `m = 0` or
    /// `n = 0` disables the vote and reports the raw level, still subject
    /// to the persistence dwell.
    pub fn update(
        &mut self,
        raw: usize,
        time: f64,
        m: usize,
        n: usize,
        hysteresis_time: f64,
        persistence_time: f64,
    ) -> usize {
        if time < self.last_time
            || (hysteresis_time > 0.0
                && time - self.last_time > hysteresis_time)
        {
            self.reset();
        }
        self.last_time = time;

        let voted = if m == 0 || n == 0 {
            raw
        } else {
            self.window.push_back(raw);
            while self.window.len() > n {
                self.window.pop_front();
            }
            self.vote(m)
        };

        if voted >= self.current {
            if voted > 0 && (self.current == 0 || voted > self.current) {
                self.raised_time = time;
            }
            self.current = voted;
        } else if self.current > 0
            && persistence_time > 0.0
            && time - self.raised_time < persistence_time
        {
            // dwell: hold the previous positive level
        } else {
            self.current = voted;
            if voted > 0 {
                self.raised_time = time;
            }
        }
        self.current
    }
}
