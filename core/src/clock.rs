use serde::{Deserialize, Serialize};

use crate::Seat;

/// Two independent countdowns, only the one whose turn is running drains.
///
/// Time is supplied by the caller in milliseconds so the arithmetic stays
/// deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnClock {
    initial_millis: u64,
    time_left_millis: [u64; 2],
    turn_started_at: Option<u64>,
}

impl TurnClock {
    pub fn new(initial_millis: u64) -> Self {
        Self {
            initial_millis,
            time_left_millis: [initial_millis; 2],
            turn_started_at: None,
        }
    }

    pub fn initial_millis(&self) -> u64 {
        self.initial_millis
    }

    pub fn time_left(&self, seat: Seat) -> u64 {
        self.time_left_millis[seat.index()]
    }

    /// Start of the running turn, `None` while stopped.
    pub fn turn_started_at(&self) -> Option<u64> {
        self.turn_started_at
    }

    pub fn is_running(&self) -> bool {
        self.turn_started_at.is_some()
    }

    pub fn start(&mut self, now: u64) {
        self.turn_started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.turn_started_at = None;
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        self.turn_started_at
            .map_or(0, |started| now.saturating_sub(started))
    }

    /// Subtracts the running turn's elapsed time from `seat`, floored at zero.
    ///
    /// Returns the charged amount. The clock keeps running; callers restart or
    /// stop it once the move is resolved.
    pub fn charge(&mut self, seat: Seat, now: u64) -> u64 {
        let elapsed = self.elapsed(now);
        let left = &mut self.time_left_millis[seat.index()];
        *left = left.saturating_sub(elapsed);
        elapsed
    }

    /// Remaining time for `seat` if its turn were charged at `now`, without mutating.
    pub fn projected_time_left(&self, seat: Seat, now: u64) -> u64 {
        self.time_left(seat).saturating_sub(self.elapsed(now))
    }

    pub fn expire(&mut self, seat: Seat) {
        self.time_left_millis[seat.index()] = 0;
    }

    /// First seat whose stored clock has run out.
    pub fn timed_out_seat(&self) -> Option<Seat> {
        if self.time_left(Seat::First) == 0 {
            Some(Seat::First)
        } else if self.time_left(Seat::Second) == 0 {
            Some(Seat::Second)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_only_touches_given_seat() {
        let mut clock = TurnClock::new(30_000);
        clock.start(1_000);

        assert_eq!(clock.charge(Seat::First, 5_500), 4_500);
        assert_eq!(clock.time_left(Seat::First), 25_500);
        assert_eq!(clock.time_left(Seat::Second), 30_000);
    }

    #[test]
    fn charge_floors_at_zero() {
        let mut clock = TurnClock::new(1_000);
        clock.start(0);
        clock.charge(Seat::Second, 10_000);
        assert_eq!(clock.time_left(Seat::Second), 0);
        assert_eq!(clock.timed_out_seat(), Some(Seat::Second));
    }

    #[test]
    fn projection_does_not_mutate() {
        let mut clock = TurnClock::new(2_000);
        clock.start(100);
        assert_eq!(clock.projected_time_left(Seat::First, 1_100), 1_000);
        assert_eq!(clock.projected_time_left(Seat::First, 5_000), 0);
        assert_eq!(clock.time_left(Seat::First), 2_000);
    }

    #[test]
    fn stopped_clock_charges_nothing() {
        let mut clock = TurnClock::new(2_000);
        assert!(!clock.is_running());
        assert_eq!(clock.charge(Seat::First, 9_999), 0);
        assert_eq!(clock.time_left(Seat::First), 2_000);
    }

    #[test]
    fn clock_before_start_time_charges_nothing() {
        let mut clock = TurnClock::new(2_000);
        clock.start(500);
        assert_eq!(clock.charge(Seat::First, 100), 0);
    }
}
