use std::{cell::RefCell, rc::Rc, time::Duration};

use piece_arena_core::{
    BoardSize, Command, ConfigError, Event, ManualClock, PieceConfig, PieceId, Point, RandomIds,
    Timestamp,
};
use piece_arena_world::{self as world, query, Arena, Board, DeathCallback};

const START: Timestamp = Timestamp::from_millis(10_000);

fn arena() -> (Arena<ManualClock, RandomIds>, ManualClock) {
    let clock = ManualClock::starting_at(START);
    let arena = Arena::new(
        Board::new(BoardSize::new(800.0, 600.0)),
        clock.clone(),
        RandomIds::seeded(0x4d59_5df4),
    );
    (arena, clock)
}

fn recorder() -> (Rc<RefCell<Vec<PieceId>>>, DeathCallback) {
    let deaths = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&deaths);
    let callback: DeathCallback = Box::new(move |id: &PieceId| sink.borrow_mut().push(id.clone()));
    (deaths, callback)
}

fn shooter(cooldown: Duration) -> PieceConfig {
    PieceConfig::new(PieceId::new("shooter"), Point::new(100.0, 100.0)).with_weapon(cooldown)
}

#[test]
fn valid_construction_registers_exactly_once() {
    let (mut arena, _) = arena();
    let id = arena
        .spawn(PieceConfig::new(PieceId::new("hero"), Point::new(30.0, 40.0)))
        .expect("valid piece");

    let matches = arena
        .board()
        .iter()
        .filter(|piece| piece.id() == &id)
        .count();
    assert_eq!(matches, 1);
    assert!(arena.timers().is_empty(), "no lifespan, no timer");
}

#[test]
fn failed_construction_leaves_board_untouched() {
    let (mut arena, _) = arena();
    let configs = [
        PieceConfig {
            position: Some(Point::new(5.0, 5.0)),
            ..PieceConfig::default()
        },
        PieceConfig {
            id: Some(PieceId::new("no-position")),
            lifespan: Some(100),
            ..PieceConfig::default()
        },
        PieceConfig::new(PieceId::new("zero-y"), Point::new(5.0, 0.0)),
    ];

    for config in configs {
        assert!(arena.spawn(config).is_err());
    }
    assert!(arena.board().is_empty());
    assert!(arena.timers().is_empty());
}

#[test]
fn lifespan_expiry_invokes_callback_once_then_deregisters() {
    let (mut arena, clock) = arena();
    let (deaths, callback) = recorder();
    let id = arena
        .spawn_with_callback(
            PieceConfig::new(PieceId::new("mayfly"), Point::new(50.0, 50.0))
                .with_lifespan(Duration::from_millis(250)),
            Some(callback),
        )
        .expect("valid piece");

    for _ in 0..5 {
        clock.advance(Duration::from_millis(40));
        assert!(arena.step().is_empty());
    }
    assert!(arena.board().contains(&id));

    clock.advance(Duration::from_millis(50));
    assert_eq!(arena.step(), vec![id.clone()]);
    assert!(!arena.board().contains(&id));
    assert_eq!(*deaths.borrow(), vec![id.clone()]);

    clock.advance(Duration::from_secs(10));
    assert!(arena.step().is_empty());
    assert_eq!(deaths.borrow().len(), 1);
}

#[test]
fn early_deconstruction_makes_timer_a_no_op() {
    let (mut arena, clock) = arena();
    let (deaths, callback) = recorder();
    let id = arena
        .spawn_with_callback(
            PieceConfig::new(PieceId::new("bolt"), Point::new(50.0, 50.0))
                .with_lifespan(Duration::from_millis(100)),
            Some(callback),
        )
        .expect("valid piece");

    assert!(arena.deconstruct(&id));
    assert!(!arena.deconstruct(&id));

    clock.advance(Duration::from_millis(100));
    assert!(arena.expire_due().is_empty());
    assert!(deaths.borrow().is_empty());
}

#[test]
fn fire_spawns_projectile_that_expires_after_half_a_second() {
    let (mut arena, clock) = arena();
    let shooter = arena
        .spawn(shooter(Duration::from_millis(200)))
        .expect("valid shooter");
    let (deaths, callback) = recorder();

    let projectile = arena
        .fire(&shooter, Point::new(400.0, 300.0), Some(callback))
        .expect("fresh weapon fires immediately");

    let options = query::piece_options(&arena, &projectile).expect("projectile registered");
    assert_eq!(options.class, "projectile piece");
    assert_eq!(options.size, 10.0);
    assert_eq!(options.speed, 8.0);
    assert_eq!(options.border_size, 2.0);
    assert_eq!(options.position, Point::new(100.0, 100.0));
    assert_eq!(options.target, Point::new(400.0, 300.0));
    assert_eq!(projectile.as_str().len(), 64);
    assert_eq!(
        arena.timers().next_due(),
        Some(START.saturating_add(Duration::from_millis(500)))
    );

    clock.advance(Duration::from_millis(499));
    assert!(arena.expire_due().is_empty());
    clock.advance(Duration::from_millis(1));
    assert_eq!(arena.expire_due(), vec![projectile.clone()]);
    assert_eq!(*deaths.borrow(), vec![projectile]);
    assert!(arena.board().contains(&shooter));
}

#[test]
fn second_shot_inside_cooldown_is_refused() {
    let (mut arena, clock) = arena();
    let shooter = arena
        .spawn(shooter(Duration::from_millis(200)))
        .expect("valid shooter");

    assert!(arena.fire(&shooter, Point::new(1.0, 1.0), None).is_some());
    let last = arena
        .board()
        .piece(&shooter)
        .and_then(|piece| piece.weapon().map(|weapon| weapon.last()));
    assert_eq!(last, Some(START));

    clock.advance(Duration::from_millis(199));
    assert!(arena.fire(&shooter, Point::new(1.0, 1.0), None).is_none());
    let last_after_refusal = arena
        .board()
        .piece(&shooter)
        .and_then(|piece| piece.weapon().map(|weapon| weapon.last()));
    assert_eq!(last_after_refusal, Some(START));
    assert_eq!(arena.board().len(), 2);

    clock.advance(Duration::from_millis(1));
    assert!(arena.fire(&shooter, Point::new(1.0, 1.0), None).is_some());
    assert_eq!(arena.board().len(), 3);
}

#[test]
fn unarmed_or_missing_shooters_do_nothing() {
    let (mut arena, _) = arena();
    let rock = arena
        .spawn(PieceConfig::new(PieceId::new("rock"), Point::new(10.0, 10.0)))
        .expect("valid piece");

    assert!(arena.fire(&rock, Point::new(1.0, 1.0), None).is_none());
    assert!(arena
        .fire(&PieceId::new("ghost"), Point::new(1.0, 1.0), None)
        .is_none());
    assert_eq!(arena.board().len(), 1);
}

#[test]
fn command_surface_broadcasts_lifecycle_events() {
    let (mut arena, clock) = arena();
    let mut events = Vec::new();

    world::apply(
        &mut arena,
        Command::Spawn {
            config: shooter(Duration::from_millis(100)),
        },
        &mut events,
    );
    world::apply(
        &mut arena,
        Command::Spawn {
            config: shooter(Duration::from_millis(100)),
        },
        &mut events,
    );
    world::apply(
        &mut arena,
        Command::Fire {
            piece: PieceId::new("shooter"),
            target: Point::new(300.0, 100.0),
        },
        &mut events,
    );

    assert_eq!(events.len(), 4, "unexpected events: {events:?}");
    assert!(matches!(&events[0], Event::PieceAdded { options } if options.id.as_str() == "shooter"));
    assert_eq!(
        events[1],
        Event::PieceRejected {
            reason: ConfigError::DuplicateId(PieceId::new("shooter")),
        }
    );
    let Event::ProjectileFired { shooter, projectile } = events[2].clone() else {
        panic!("expected projectile event, found {:?}", events[2]);
    };
    assert_eq!(shooter.as_str(), "shooter");
    assert!(matches!(&events[3], Event::PieceAdded { options } if options.id == projectile));

    events.clear();
    clock.advance(Duration::from_millis(500));
    world::apply(&mut arena, Command::ExpireDue, &mut events);
    assert_eq!(
        events,
        vec![Event::PieceExpired { piece: projectile }]
    );
}

#[test]
fn retargeting_steers_subsequent_ticks() {
    let (mut arena, _) = arena();
    let id = arena
        .spawn(
            PieceConfig::new(PieceId::new("runner"), Point::new(100.0, 100.0))
                .with_target(Point::new(200.0, 100.0))
                .with_speed(25.0),
        )
        .expect("valid piece");

    arena.tick();
    assert!(arena.update_target(&id, Point::new(125.0, 200.0)));
    arena.tick();

    let updates = query::piece_updates(&arena);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].position, Point::new(125.0, 125.0));
    assert_eq!(updates[0].target, Point::new(125.0, 200.0));
    assert!(!arena.update_target(&PieceId::new("ghost"), Point::new(1.0, 1.0)));
}

#[test]
fn zero_lifespan_arms_no_timer() {
    let (mut arena, clock) = arena();
    let (deaths, callback) = recorder();
    let id = arena
        .spawn_with_callback(
            PieceConfig::new(PieceId::new("evergreen"), Point::new(50.0, 50.0))
                .with_lifespan(Duration::ZERO),
            Some(callback),
        )
        .expect("valid piece");

    assert!(arena.timers().is_empty());
    assert_eq!(arena.timers().next_due(), None);

    clock.advance(Duration::from_secs(5));
    assert!(arena.step().is_empty());
    assert!(arena.board().contains(&id));
    assert!(deaths.borrow().is_empty());
}
