use std::time::Duration;

use piece_arena_core::{BoardSize, ManualClock, PieceConfig, PieceId, Point, RandomIds, Timestamp};
use piece_arena_system_ticker::{Config, Ticker};
use piece_arena_world::{query, Arena, Board};

#[test]
fn irregular_frames_drive_a_fixed_rate_simulation() {
    let clock = ManualClock::starting_at(Timestamp::from_millis(1_000));
    let mut arena = Arena::new(
        Board::new(BoardSize::new(1_000.0, 1_000.0)),
        clock.clone(),
        RandomIds::seeded(9),
    );
    let id = arena
        .spawn(
            PieceConfig::new(PieceId::new("walker"), Point::new(100.0, 100.0))
                .with_target(Point::new(900.0, 100.0))
                .with_speed(4.0)
                .with_lifespan(Duration::from_millis(400)),
        )
        .expect("valid piece");
    let mut ticker = Ticker::new(Config::new(Duration::from_millis(50), 5));

    let frames = [7, 33, 16, 61, 12, 45, 50, 26, 90, 10];
    let mut ticks = 0;
    for frame in frames {
        for _ in 0..ticker.advance(Duration::from_millis(frame)) {
            clock.advance(ticker.tick_interval());
            let _ = arena.step();
            ticks += 1;
        }
    }

    assert_eq!(ticks, 7, "350ms of frames at 50ms per tick");
    let options = query::piece_options(&arena, &id).expect("lifespan not reached");
    assert!((options.position.x - 128.0).abs() < 1e-9);
    assert_eq!(options.position.y, 100.0);

    for _ in 0..ticker.advance(Duration::from_millis(50)) {
        clock.advance(ticker.tick_interval());
        let _ = arena.step();
    }
    assert!(arena.board().is_empty(), "lifespan elapsed at 400ms");
}
