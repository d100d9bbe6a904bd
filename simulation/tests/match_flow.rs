use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use lane_defence_core::{
    config::{Balance, LevelLayout, PathSpec, SpawnGroup, WaveSchedule, WaveSpec},
    CellCoord,
    ChanceSource,
    DefenderKind,
    EnemyKind,
    Event,
    Notification,
    Outcome,
    PlaceableKind,
    StrikeLine,
};
use lane_defence_simulation::{MatchSetup, RunState, SeededChance, Simulation};
use lane_defence_system_air_strike::PendingStrike;
use lane_defence_system_builder::{BuildError, BuildOption, BuildRequest};
use tokio::{runtime::Handle, time};

const STEP: Duration = Duration::from_millis(100);

fn corridor() -> LevelLayout {
    LevelLayout {
        columns: 10,
        rows: 5,
        tile_size: 64.0,
        lane_offset_tiles: 0.25,
        paths: vec![PathSpec {
            name: "corridor".to_owned(),
            waypoints: vec![CellCoord::new(0, 2), CellCoord::new(9, 2)],
        }],
        build_slots: vec![
            CellCoord::new(1, 1),
            CellCoord::new(1, 3),
            CellCoord::new(6, 1),
        ],
        placeable_slots: vec![CellCoord::new(4, 2)],
    }
}

fn soldiers(count: u32) -> WaveSchedule {
    WaveSchedule {
        waves: vec![WaveSpec {
            start_delay_secs: 0.0,
            groups: vec![SpawnGroup {
                enemy: "soldier".to_owned(),
                count,
                gap_secs: 0.5,
            }],
            special_event_chance: 0.0,
        }],
    }
}

/// A single wave whose only attacker is the special-event aircraft.
fn raid_only() -> WaveSchedule {
    WaveSchedule {
        waves: vec![WaveSpec {
            start_delay_secs: 0.0,
            groups: Vec::new(),
            special_event_chance: 1.0,
        }],
    }
}

/// Replays fixed roll outcomes and records the probabilities asked for.
struct Scripted {
    outcomes: VecDeque<bool>,
    asked: Arc<Mutex<Vec<f32>>>,
}

impl ChanceSource for Scripted {
    fn succeeds(&mut self, probability: f32) -> bool {
        self.asked.lock().expect("roll log").push(probability);
        self.outcomes.pop_front().unwrap_or(false)
    }
}

fn simulation(schedule: WaveSchedule) -> Simulation {
    let setup = MatchSetup {
        balance: Balance::default(),
        level: corridor(),
        schedule,
    };
    Simulation::new(setup, Handle::current(), Box::new(SeededChance::new(1)))
        .expect("valid setup")
}

fn is_raid_event(event: &Event) -> bool {
    matches!(
        event,
        Event::RaidMidpointReached { .. }
            | Event::StrikeScheduled { .. }
            | Event::DefenderDestroyed { .. }
            | Event::StrikeLanded { .. }
    )
}

fn is_flak_event(event: &Event) -> bool {
    matches!(
        event,
        Event::FlakResolved { .. } | Event::EnemyKilled { .. } | Event::RaidMidpointReached { .. }
    )
}

fn record(simulation: &Simulation) -> Arc<Mutex<Vec<Notification>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _ = simulation.notifications().subscribe(move |notification| {
        sink.lock().expect("notification sink").push(*notification);
    });
    seen
}

fn run_until_decided(simulation: &mut Simulation, max_ticks: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        events.extend_from_slice(simulation.tick(STEP));
        if simulation.outcome().is_some() {
            break;
        }
    }
    events
}

fn tower(kind: DefenderKind, column: u32, row: u32) -> BuildRequest {
    BuildRequest::new(BuildOption::Defender(kind), CellCoord::new(column, row))
}

#[tokio::test(start_paused = true)]
async fn defended_corridor_ends_in_victory() {
    let mut simulation = simulation(soldiers(1));
    let seen = record(&simulation);

    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 1, 1)),
        Ok(50)
    );
    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 1, 3)),
        Ok(50)
    );
    assert_eq!(simulation.money(), 0);

    simulation.start();
    let events = run_until_decided(&mut simulation, 200);

    assert_eq!(simulation.outcome(), Some(Outcome::Victory));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyLeaked { .. })));
    assert_eq!(simulation.leak_ratio(), 0.0);
    assert_eq!(simulation.current_wave(), 1);
    assert_eq!(simulation.total_waves(), 1);

    let seen = seen.lock().expect("notification sink");
    assert!(seen.contains(&Notification::WaveStarted { wave: 1, total: 1 }));
    assert_eq!(
        seen.last(),
        Some(&Notification::GameOver {
            outcome: Outcome::Victory,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn undefended_leaks_end_in_defeat_and_stop_income() {
    let mut simulation = simulation(soldiers(3));
    let seen = record(&simulation);
    simulation.start();

    time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(simulation.money(), 110);

    let events = run_until_decided(&mut simulation, 200);
    assert_eq!(simulation.outcome(), Some(Outcome::Defeat));
    assert!(simulation.leak_ratio() >= 0.1);
    let leaks = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { .. }))
        .count();
    assert!(leaks >= 1);

    time::sleep(Duration::from_secs(5)).await;
    assert_eq!(simulation.money(), 110);

    let before = simulation.tick_index();
    assert!(simulation.tick(STEP).is_empty());
    assert_eq!(simulation.tick_index(), before);
    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 6, 1)),
        Err(BuildError::MatchOver)
    );

    let seen = seen.lock().expect("notification sink");
    let (power, leak_ratio) = seen
        .iter()
        .find_map(|notification| match notification {
            Notification::EnemyLeaked { power, leak_ratio } => Some((*power, *leak_ratio)),
            _ => None,
        })
        .expect("a leak was published");
    assert_eq!(power, 1);
    assert!((leak_ratio - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(
        seen.iter()
            .filter(|notification| matches!(notification, Notification::GameOver { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn ticks_before_start_and_while_paused_change_nothing() {
    let mut simulation = simulation(soldiers(2));
    assert_eq!(simulation.state(), RunState::Ready);
    assert!(simulation.tick(Duration::from_secs(1)).is_empty());
    assert_eq!(simulation.elapsed(), Duration::ZERO);

    simulation.start();
    let _ = simulation.tick(Duration::from_secs(1));
    assert_eq!(simulation.elapsed(), Duration::from_secs(1));
    let enemies = simulation.enemies().len();

    simulation.pause();
    assert_eq!(simulation.state(), RunState::Paused);
    assert!(simulation.tick(Duration::from_secs(1)).is_empty());
    assert_eq!(simulation.elapsed(), Duration::from_secs(1));
    assert_eq!(simulation.enemies().len(), enemies);

    simulation.resume();
    let _ = simulation.tick(STEP);
    assert_eq!(simulation.elapsed(), Duration::from_millis(1_100));
}

#[tokio::test(start_paused = true)]
async fn frame_clock_skips_paused_time() {
    let mut simulation = simulation(soldiers(1));
    simulation.start();

    time::advance(Duration::from_millis(40)).await;
    assert_eq!(simulation.advance_frame(), Duration::from_millis(40));

    simulation.pause();
    time::advance(Duration::from_secs(30)).await;
    simulation.resume();
    time::advance(Duration::from_millis(20)).await;
    assert_eq!(simulation.advance_frame(), Duration::from_millis(20));
    assert_eq!(simulation.elapsed(), Duration::from_millis(60));
}

#[tokio::test(start_paused = true)]
async fn failed_builds_cost_nothing() {
    let mut simulation = simulation(soldiers(1));

    assert!(matches!(
        simulation.build(tower(DefenderKind::TankTower, 1, 1)),
        Err(BuildError::InsufficientFunds { cost: 150, .. })
    ));
    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 1, 1)),
        Ok(50)
    );
    assert!(matches!(
        simulation.build(tower(DefenderKind::FastTower, 1, 1)),
        Err(BuildError::Occupied { .. })
    ));
    assert!(matches!(
        simulation.build(tower(DefenderKind::FastTower, 2, 2)),
        Err(BuildError::NotASlot { .. })
    ));
    assert_eq!(simulation.money(), 50);
    assert_eq!(simulation.defenders().len(), 1);

    let bomb = BuildRequest::new(
        BuildOption::Placeable(PlaceableKind::Bomb),
        CellCoord::new(4, 2),
    );
    assert_eq!(simulation.build(bomb), Ok(40));
    assert_eq!(simulation.placeables().len(), 1);
    assert_eq!(simulation.money(), 10);

    simulation.stop();
    assert_eq!(simulation.build(bomb), Err(BuildError::MatchOver));
}

#[tokio::test(start_paused = true)]
async fn raid_strike_destroys_the_busiest_row_and_frees_its_slots() {
    let mut balance = Balance::default();
    balance.money.start = 150;
    balance.raid.damage = 10_000;
    let setup = MatchSetup {
        balance,
        level: corridor(),
        schedule: raid_only(),
    };
    let mut simulation = Simulation::new(setup, Handle::current(), Box::new(SeededChance::new(1)))
        .expect("valid setup");
    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 1, 1)),
        Ok(50)
    );
    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 6, 1)),
        Ok(50)
    );
    let towers: Vec<_> = simulation
        .defenders()
        .iter()
        .map(|defender| defender.id)
        .collect();
    simulation.start();

    let mut timeline: Vec<Event> = Vec::new();
    while !timeline
        .iter()
        .any(|event| matches!(event, Event::StrikeScheduled { .. }))
    {
        assert!(simulation.tick_index() < 100, "strike was never scheduled");
        let events = simulation.tick(STEP);
        timeline.extend(events.iter().filter(|event| is_raid_event(event)).cloned());
    }
    let aircraft = simulation
        .enemies()
        .iter()
        .find(|enemy| enemy.kind == EnemyKind::Aircraft)
        .map(|enemy| enemy.id)
        .expect("the raid launched an aircraft");
    assert_eq!(
        simulation.pending_strikes(),
        &[PendingStrike {
            line: StrikeLine::Row(1),
            remaining: Duration::from_secs(1),
        }]
    );

    let mut warning_ticks = 0;
    let landing = loop {
        let events = simulation.tick(STEP).to_vec();
        if events
            .iter()
            .any(|event| matches!(event, Event::StrikeLanded { .. }))
        {
            break events;
        }
        warning_ticks += 1;
        assert!(!simulation.pending_strikes().is_empty());
    };
    assert_eq!(warning_ticks, 9);
    assert!(simulation.pending_strikes().is_empty());
    timeline.extend(landing.into_iter().filter(is_raid_event));

    assert_eq!(
        timeline,
        vec![
            Event::RaidMidpointReached { enemy: aircraft },
            Event::StrikeScheduled {
                line: StrikeLine::Row(1),
                delay: Duration::from_secs(1),
            },
            Event::DefenderDestroyed {
                defender: towers[0],
                kind: DefenderKind::FastTower,
                cell: CellCoord::new(1, 1),
            },
            Event::DefenderDestroyed {
                defender: towers[1],
                kind: DefenderKind::FastTower,
                cell: CellCoord::new(6, 1),
            },
            Event::StrikeLanded {
                line: StrikeLine::Row(1),
                defenders_hit: 2,
            },
        ]
    );

    assert!(simulation.defenders().is_empty());
    for cell in [CellCoord::new(1, 1), CellCoord::new(6, 1)] {
        let slot = simulation.grid().slot(cell).expect("build slot");
        assert!(slot.is_buildable());
    }
    assert_eq!(simulation.outcome(), None);
    assert_eq!(
        simulation.build(tower(DefenderKind::FastTower, 1, 1)),
        Ok(50)
    );
}

#[tokio::test(start_paused = true)]
async fn flak_rolls_flow_through_the_injected_chance_source() {
    let asked = Arc::new(Mutex::new(Vec::new()));
    let chance = Scripted {
        outcomes: VecDeque::from([true, false, true]),
        asked: Arc::clone(&asked),
    };
    let setup = MatchSetup {
        balance: Balance::default(),
        level: corridor(),
        schedule: raid_only(),
    };
    let mut simulation =
        Simulation::new(setup, Handle::current(), Box::new(chance)).expect("valid setup");
    assert_eq!(
        simulation.build(tower(DefenderKind::LightAirDefense, 1, 1)),
        Ok(75)
    );
    let flak = simulation
        .defenders()
        .iter()
        .map(|defender| defender.id)
        .next()
        .expect("air defense placed");
    simulation.start();

    let events = run_until_decided(&mut simulation, 100);
    let aircraft = events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, kind, .. } if kind.is_airborne() => Some(*enemy),
            _ => None,
        })
        .expect("the raid launched an aircraft");
    let flak_events: Vec<_> = events.into_iter().filter(is_flak_event).collect();

    assert_eq!(
        flak_events,
        vec![
            Event::FlakResolved {
                defender: flak,
                target: aircraft,
                hit: false,
            },
            Event::FlakResolved {
                defender: flak,
                target: aircraft,
                hit: true,
            },
            Event::EnemyKilled {
                enemy: aircraft,
                kind: EnemyKind::Aircraft,
            },
        ]
    );
    assert_eq!(*asked.lock().expect("roll log"), vec![1.0, 0.6, 0.6]);
    assert_eq!(simulation.outcome(), Some(Outcome::Victory));
    assert!(simulation.pending_strikes().is_empty());
}
