use lane_defence_core::{
    config::{Balance, LevelLayout},
    CellCoord,
    Command,
    DefenderKind,
    Event,
    NotificationBus,
    PlaceableKind,
};
use lane_defence_system_builder::{BuildError, BuildOption, BuildRequest, Builder};
use lane_defence_system_economy::Ledger;
use lane_defence_world::{self as world, query, World};

fn world() -> World {
    World::new(&LevelLayout::default(), Balance::default()).expect("default layout")
}

fn build_slot() -> CellCoord {
    LevelLayout::default().build_slots[0]
}

fn placeable_slot() -> CellCoord {
    LevelLayout::default().placeable_slots[0]
}

fn request(
    builder: &mut Builder,
    world: &World,
    ledger: &Ledger,
    option: BuildOption,
    cell: CellCoord,
) -> (Result<u64, BuildError>, Vec<Command>) {
    let mut commands = Vec::new();
    let result = builder.handle(
        BuildRequest::new(option, cell),
        ledger,
        |cell| query::slot(world, cell),
        &mut commands,
    );
    (result, commands)
}

#[test]
fn accepted_requests_spend_and_emit_placement() {
    let mut world = world();
    let mut builder = Builder::new(Balance::default());
    let ledger = Ledger::new(100, NotificationBus::new());

    let (result, commands) = request(
        &mut builder,
        &world,
        &ledger,
        BuildOption::Defender(DefenderKind::FastTower),
        build_slot(),
    );

    assert_eq!(result, Ok(50));
    assert_eq!(ledger.balance(), 50);
    assert_eq!(
        commands,
        vec![Command::PlaceDefender {
            kind: DefenderKind::FastTower,
            cell: build_slot(),
        }]
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert!(matches!(events.as_slice(), [Event::DefenderPlaced { .. }]));
}

#[test]
fn occupied_slots_are_refused_without_spending() {
    let mut world = world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceDefender {
            kind: DefenderKind::PowerTower,
            cell: build_slot(),
        },
        &mut events,
    );
    let mut builder = Builder::new(Balance::default());
    let ledger = Ledger::new(500, NotificationBus::new());

    let (result, commands) = request(
        &mut builder,
        &world,
        &ledger,
        BuildOption::Defender(DefenderKind::FastTower),
        build_slot(),
    );

    assert!(matches!(result, Err(BuildError::Occupied { .. })));
    assert!(commands.is_empty());
    assert_eq!(ledger.balance(), 500);
}

#[test]
fn slot_kinds_must_match_the_item() {
    let world = world();
    let mut builder = Builder::new(Balance::default());
    let ledger = Ledger::new(500, NotificationBus::new());

    let (tower_on_placeable, _) = request(
        &mut builder,
        &world,
        &ledger,
        BuildOption::Defender(DefenderKind::TankTower),
        placeable_slot(),
    );
    assert_eq!(
        tower_on_placeable,
        Err(BuildError::WrongSlot {
            cell: placeable_slot(),
            option: BuildOption::Defender(DefenderKind::TankTower),
        })
    );

    let (bomb_on_build, _) = request(
        &mut builder,
        &world,
        &ledger,
        BuildOption::Placeable(PlaceableKind::Bomb),
        build_slot(),
    );
    assert!(matches!(bomb_on_build, Err(BuildError::WrongSlot { .. })));

    let (nowhere, _) = request(
        &mut builder,
        &world,
        &ledger,
        BuildOption::Placeable(PlaceableKind::Bomb),
        CellCoord::new(0, 0),
    );
    assert_eq!(
        nowhere,
        Err(BuildError::NotASlot {
            cell: CellCoord::new(0, 0),
        })
    );
    assert_eq!(ledger.balance(), 500);
}

#[test]
fn insufficient_funds_leave_the_balance_untouched() {
    let world = world();
    let mut builder = Builder::new(Balance::default());
    let ledger = Ledger::new(60, NotificationBus::new());

    let (result, commands) = request(
        &mut builder,
        &world,
        &ledger,
        BuildOption::Defender(DefenderKind::TankTower),
        build_slot(),
    );

    assert_eq!(
        result,
        Err(BuildError::InsufficientFunds {
            cost: 150,
            balance: 60,
        })
    );
    assert!(commands.is_empty());
    assert_eq!(ledger.balance(), 60);
}

#[test]
fn placeables_do_not_occupy_their_slot() {
    let mut world = world();
    let mut builder = Builder::new(Balance::default());
    let ledger = Ledger::new(100, NotificationBus::new());

    for _ in 0..2 {
        let (result, commands) = request(
            &mut builder,
            &world,
            &ledger,
            BuildOption::Placeable(PlaceableKind::SpeedBump),
            placeable_slot(),
        );
        assert_eq!(result, Ok(25));
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }
    assert_eq!(ledger.balance(), 50);
    assert_eq!(query::placeables(&world).len(), 2);
}

#[test]
fn catalogue_lists_every_item_with_its_price() {
    let builder = Builder::new(Balance::default());
    let catalogue = builder.catalogue();

    assert_eq!(catalogue.len(), 7);
    assert_eq!(
        catalogue[0],
        (BuildOption::Defender(DefenderKind::FastTower), 50)
    );
    assert!(catalogue.contains(&(BuildOption::Placeable(PlaceableKind::Bomb), 40)));
}
