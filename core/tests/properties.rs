//! Invariants checked over many seeded games.

use hco_core::{is_stuck, slide, Board, Direction, Element, Game, GameState};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const SEEDS: u64 = 200;
const MAX_STEPS: usize = 400;

/// Play a seeded game with random directions, calling `check` with the
/// state before and after every step.
fn play(seed: u64, mut check: impl FnMut(Direction, GameState, GameState, bool)) {
    let mut game = Game::new(seed);
    let mut picker = SmallRng::seed_from_u64(seed ^ 0x9e37_79b9);
    for _ in 0..MAX_STEPS {
        if game.is_done() {
            break;
        }
        let direction = Direction::ALL[picker.gen_range(0..4)];
        let before = game.state();
        let result = game.step(direction);
        check(direction, before, game.state(), result.changed);
    }
}

#[test]
fn rotation_round_trips() {
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..100 {
        let mut board = Board::EMPTY;
        for _ in 0..rng.gen_range(0..16) {
            board = board.with_random_tile(&mut rng);
        }
        let (merged, _) = board.move_left();
        for b in [board, merged] {
            assert_eq!(b.rotate(1).rotate(3), b);
            assert_eq!(b.rotate(4), b);
            for a in 0..4u8 {
                for c in 0..4u8 {
                    assert_eq!(b.rotate(a).rotate(c), b.rotate((a + c) % 4));
                }
            }
        }
    }
}

#[test]
fn ineffective_moves_change_nothing() {
    for seed in 0..SEEDS {
        play(seed, |direction, before, after, changed| {
            let slid = slide(before.board(), direction).0;
            if slid == *before.board() {
                assert!(!changed);
                assert_eq!(after, before);
            } else {
                assert!(changed);
            }
        });
    }
}

#[test]
fn score_only_grows_on_merges() {
    for seed in 0..SEEDS {
        play(seed, |_, before, after, changed| {
            assert!(after.score() >= before.score());
            if !changed {
                return;
            }
            let merged = after.board().tile_count() < before.board().tile_count() + 1;
            assert_eq!(after.score() > before.score(), merged);
        });
    }
}

#[test]
fn accepted_moves_conserve_tiles() {
    for seed in 0..SEEDS {
        play(seed, |direction, before, after, changed| {
            if !changed {
                return;
            }
            let (slid, reward) = slide(before.board(), direction);
            let merges = before.board().tile_count() - slid.tile_count();
            assert_eq!(
                after.board().tile_count(),
                before.board().tile_count() - merges + 1
            );
            assert_eq!(after.score(), before.score() + reward);

            // Exactly one cell went from empty to H.
            let spawned = slid
                .cells()
                .iter()
                .zip(after.board().cells())
                .filter(|(old, new)| old != new)
                .collect::<Vec<_>>();
            assert_eq!(spawned, vec![(&None, &Some(Element::H))]);
        });
    }
}

#[test]
fn game_over_iff_no_direction_moves() {
    for seed in 0..SEEDS {
        play(seed, |_, _, after, _| {
            let all_same = Direction::ALL
                .iter()
                .all(|&d| slide(after.board(), d).0 == *after.board());
            assert_eq!(after.is_game_over(), all_same);
            assert_eq!(after.is_game_over(), is_stuck(after.board()));
        });
    }
}

#[test]
fn games_eventually_end_and_restart_cleanly() {
    let mut finished = 0;
    for seed in 0..20 {
        let mut game = Game::new(seed);
        let mut picker = SmallRng::seed_from_u64(seed);
        for _ in 0..5_000 {
            if game.is_done() {
                break;
            }
            game.step(Direction::ALL[picker.gen_range(0..4)]);
        }
        if !game.is_done() {
            continue;
        }
        finished += 1;
        assert_eq!(game.legal_moves(), [false; 4]);

        game.restart();
        assert!(!game.is_done());
        assert_eq!(game.score(), 0);
        assert_eq!(game.board().tile_count(), 2);
        assert!(game
            .board()
            .cells()
            .iter()
            .flatten()
            .all(|&e| e == Element::H));
    }
    assert!(finished > 0);
}
