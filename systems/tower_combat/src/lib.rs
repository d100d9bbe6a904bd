#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands for ready defenders.

use lane_defence_core::{ChanceSource, Command, DefenderView, EnemyView, Weapon};

/// Defender combat system that queues firing commands for ready defenders.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::Fire` or `Command::FireFlak` for defenders that are
    /// off cooldown and hold a live target.
    ///
    /// Flak hits are rolled here so the world applies an already decided shot.
    pub fn handle(
        &mut self,
        defenders: &DefenderView,
        enemies: &EnemyView,
        chance: &mut dyn ChanceSource,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for defender in defenders.iter() {
            if defender.destroyed || !defender.ready_in.is_zero() {
                continue;
            }
            let Some(target) = defender.target else {
                continue;
            };
            if !enemies
                .get(target)
                .map_or(false, |enemy| enemy.state.is_alive())
            {
                continue;
            }

            let command = match defender.weapon {
                Weapon::Flak { hit_chance } => Command::FireFlak {
                    defender: defender.id,
                    target,
                    hit: chance.succeeds(hit_chance),
                },
                Weapon::Projectile { .. } | Weapon::Instant { .. } => Command::Fire {
                    defender: defender.id,
                    target,
                },
            };
            self.scratch.push(command);
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{
        CellCoord, DefenderId, DefenderKind, DefenderSnapshot, EnemyId, EnemyKind, EnemySnapshot,
        EnemyState, Vec2,
    };
    use std::time::Duration;

    struct Scripted(Vec<bool>);

    impl ChanceSource for Scripted {
        fn succeeds(&mut self, _probability: f32) -> bool {
            self.0.remove(0)
        }
    }

    fn defender(
        id: u32,
        weapon: Weapon,
        target: Option<u32>,
        ready_in: Duration,
    ) -> DefenderSnapshot {
        DefenderSnapshot {
            id: DefenderId::new(id),
            kind: match weapon {
                Weapon::Flak { .. } => DefenderKind::LightAirDefense,
                _ => DefenderKind::FastTower,
            },
            cell: CellCoord::new(id, 0),
            position: Vec2::ZERO,
            hp: 10,
            max_hp: 10,
            range_tiles: 3.0,
            weapon,
            target: target.map(EnemyId::new),
            ready_in,
            destroyed: false,
        }
    }

    fn enemy(id: u32, kind: EnemyKind, state: EnemyState) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind,
            state,
            position: Vec2::ZERO,
            hp: 10,
            max_hp: 10,
            progress: 0.0,
            lane: None,
            slow_multiplier: 1.0,
            power: 1,
        }
    }

    const GUN: Weapon = Weapon::Projectile {
        damage: 10,
        speed_tiles: 8.0,
    };

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = TowerCombat::new();
        let defenders = DefenderView::from_snapshots(vec![
            defender(2, GUN, Some(4), Duration::ZERO),
            defender(3, GUN, Some(4), Duration::from_millis(250)),
            defender(5, GUN, None, Duration::ZERO),
        ]);
        let enemies =
            EnemyView::from_snapshots(vec![enemy(4, EnemyKind::Soldier, EnemyState::Alive)]);
        let mut out = Vec::new();

        system.handle(&defenders, &enemies, &mut Scripted(Vec::new()), &mut out);

        assert_eq!(
            out,
            vec![Command::Fire {
                defender: DefenderId::new(2),
                target: EnemyId::new(4),
            }]
        );
    }

    #[test]
    fn flak_rolls_once_per_shot() {
        let mut system = TowerCombat::new();
        let flak = Weapon::Flak { hit_chance: 0.6 };
        let defenders = DefenderView::from_snapshots(vec![
            defender(1, flak, Some(9), Duration::ZERO),
            defender(2, flak, Some(9), Duration::ZERO),
        ]);
        let enemies =
            EnemyView::from_snapshots(vec![enemy(9, EnemyKind::Aircraft, EnemyState::Alive)]);
        let mut out = Vec::new();

        system.handle(
            &defenders,
            &enemies,
            &mut Scripted(vec![true, false]),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::FireFlak {
                    defender: DefenderId::new(1),
                    target: EnemyId::new(9),
                    hit: true,
                },
                Command::FireFlak {
                    defender: DefenderId::new(2),
                    target: EnemyId::new(9),
                    hit: false,
                },
            ]
        );
    }

    #[test]
    fn dead_or_missing_targets_are_skipped() {
        let mut system = TowerCombat::new();
        let defenders = DefenderView::from_snapshots(vec![
            defender(1, GUN, Some(3), Duration::ZERO),
            defender(2, GUN, Some(42), Duration::ZERO),
        ]);
        let enemies =
            EnemyView::from_snapshots(vec![enemy(3, EnemyKind::Soldier, EnemyState::Dead)]);
        let mut out = Vec::new();

        system.handle(&defenders, &enemies, &mut Scripted(Vec::new()), &mut out);

        assert!(out.is_empty());
    }
}
