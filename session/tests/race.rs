mod common;

use common::*;
use duelsweeper_core::{GameError, MatchStatus};
use std::sync::{Arc, Barrier};
use std::thread;

// Sweep and an overdue move hit the same match at once. Whichever locks
// first finishes it; the other must observe the finished match.
#[test]
fn sweep_and_late_move_finish_once() {
    for _ in 0..64 {
        let harness = Harness::new();
        let started = harness.start(8, 8, &BEGINNER_MINES);
        harness.clock.set(60_000);
        let barrier = Arc::new(Barrier::new(2));

        let sweeper = {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                service.sweep_timeouts()
            })
        };
        let mover = {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            let (id, player) = (started.id.clone(), started.first.clone());
            thread::spawn(move || {
                barrier.wait();
                service.make_move(&id, &player, (1, 1))
            })
        };

        let swept = sweeper.join().unwrap();
        let moved = mover.join().unwrap();

        match moved {
            Ok(snapshot) => {
                assert_eq!(swept, 0);
                assert!(snapshot.game_over);
            }
            Err(err) => {
                assert_eq!(swept, 1);
                assert_eq!(
                    err,
                    GameError::InvalidState {
                        actual: MatchStatus::GameOver
                    }
                );
            }
        }
        assert_eq!(harness.game_over_count(), 1);
        let snapshot = harness.service.get_match(&started.id).unwrap();
        assert_eq!(snapshot.player1_time_left_millis, 0);
        assert_eq!(snapshot.winner_id.as_deref(), Some(started.second.as_str()));
    }
}

#[test]
fn concurrent_disconnects_finish_once() {
    for _ in 0..64 {
        let harness = Harness::new();
        let started = harness.start(8, 8, &BEGINNER_MINES);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [started.first.clone(), started.second.clone()]
            .into_iter()
            .map(|player| {
                let service = Arc::clone(&harness.service);
                let barrier = Arc::clone(&barrier);
                let id = started.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.handle_disconnect(&id, &player)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().unwrap().game_over);
        }

        assert_eq!(harness.game_over_count(), 1);
        let winner = harness.service.get_match(&started.id).unwrap().winner_id;
        assert!(winner == Some(started.first.clone()) || winner == Some(started.second.clone()));
    }
}

// Alice's only safe cell clears the board while Bob walks away. Either way
// Alice wins, and only one finish is broadcast.
#[test]
fn winning_move_and_disconnect_finish_once() {
    for _ in 0..64 {
        let harness = Harness::new();
        let started = harness.start(1, 2, &[(0, 1)]);
        let barrier = Arc::new(Barrier::new(2));

        let leaver = {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            let (id, player) = (started.id.clone(), started.second.clone());
            thread::spawn(move || {
                barrier.wait();
                service.handle_disconnect(&id, &player)
            })
        };
        let mover = {
            let service = Arc::clone(&harness.service);
            let barrier = Arc::clone(&barrier);
            let (id, player) = (started.id.clone(), started.first.clone());
            thread::spawn(move || {
                barrier.wait();
                service.make_move(&id, &player, (0, 0))
            })
        };

        assert!(leaver.join().unwrap().unwrap().game_over);
        match mover.join().unwrap() {
            Ok(snapshot) => {
                assert!(snapshot.game_over);
                assert_eq!(snapshot.player(&started.first).map(|p| p.score), Some(1));
            }
            Err(err) => assert_eq!(
                err,
                GameError::InvalidState {
                    actual: MatchStatus::GameOver
                }
            ),
        }

        assert_eq!(harness.game_over_count(), 1);
        let snapshot = harness.service.get_match(&started.id).unwrap();
        assert_eq!(snapshot.winner_id.as_deref(), Some(started.first.as_str()));
    }
}
