use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use lane_defence_core::{config::MoneyConfig, Notification, NotificationBus};
use lane_defence_system_economy::{Economy, EconomyState, Ledger};
use tokio::{runtime::Handle, time::sleep};

fn economy(start: u64) -> Economy {
    let config = MoneyConfig {
        start,
        income: 10,
        income_interval_secs: 1.0,
    };
    let ledger = Arc::new(Ledger::new(config.start, NotificationBus::new()));
    Economy::new(ledger, &config, Handle::current())
}

#[tokio::test(start_paused = true)]
async fn income_arrives_once_per_interval() {
    let mut economy = economy(100);
    economy.start();

    sleep(Duration::from_millis(500)).await;
    assert_eq!(economy.ledger().balance(), 100);

    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(economy.ledger().balance(), 110);

    sleep(Duration::from_millis(2_000)).await;
    assert_eq!(economy.ledger().balance(), 130);
}

#[tokio::test(start_paused = true)]
async fn starting_money_income_and_spending_scenario() {
    let mut economy = economy(100);
    economy.start();
    sleep(Duration::from_millis(1_500)).await;

    let ledger = Arc::clone(economy.ledger());
    assert_eq!(ledger.balance(), 110);
    assert!(ledger.spend(50));
    assert_eq!(ledger.balance(), 60);
    assert!(ledger.spend(50));
    assert_eq!(ledger.balance(), 10);
    assert!(!ledger.spend(50));
    assert_eq!(ledger.balance(), 10);
}

#[tokio::test(start_paused = true)]
async fn pausing_freezes_income_and_resuming_does_not_catch_up() {
    let mut economy = economy(0);
    economy.start();
    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(economy.ledger().balance(), 10);

    economy.pause();
    assert_eq!(economy.state(), EconomyState::Paused);
    sleep(Duration::from_secs(5)).await;
    assert_eq!(economy.ledger().balance(), 10);

    economy.resume();
    assert_eq!(economy.state(), EconomyState::Running);
    sleep(Duration::from_millis(800)).await;
    assert_eq!(economy.ledger().balance(), 10);

    sleep(Duration::from_millis(400)).await;
    assert_eq!(economy.ledger().balance(), 20);
}

#[tokio::test(start_paused = true)]
async fn repeated_start_and_resume_never_double_schedule() {
    let mut economy = economy(0);
    economy.start();
    economy.start();
    economy.resume();
    for _ in 0..3 {
        economy.pause();
        economy.resume();
    }

    sleep(Duration::from_millis(3_500)).await;
    assert_eq!(economy.ledger().balance(), 30);
}

#[tokio::test(start_paused = true)]
async fn stopping_ends_income_and_ignores_resume() {
    let mut economy = economy(0);
    economy.start();
    economy.stop();
    economy.resume();
    assert_eq!(economy.state(), EconomyState::Stopped);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(economy.ledger().balance(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_economy_aborts_its_task() {
    let bus = NotificationBus::new();
    let seen = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&seen);
    let _ = bus.subscribe(move |notification| {
        if matches!(notification, Notification::MoneyChanged { .. }) {
            *counter.lock().expect("counter") += 1;
        }
    });

    let config = MoneyConfig::default();
    let ledger = Arc::new(Ledger::new(0, bus));
    let mut economy = Economy::new(Arc::clone(&ledger), &config, Handle::current());
    economy.start();
    sleep(Duration::from_millis(1_500)).await;
    drop(economy);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(ledger.balance(), config.income);
    assert_eq!(*seen.lock().expect("counter"), 1);
}
