#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Build request system that validates slots, charges the ledger and emits
//! placement commands.
//!
//! Money is only withdrawn once the slot check passed, and a failed
//! withdrawal emits nothing, so a rejected request never costs anything.

use lane_defence_core::{
    config::Balance, CellCoord, Command, DefenderId, DefenderKind, PlaceableKind,
};
use lane_defence_system_economy::Ledger;
use lane_defence_world::{SlotKind, SlotState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Item a player can buy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildOption {
    /// Tower or air defense occupying a build slot.
    Defender(DefenderKind),
    /// Speed bump or bomb dropped on a placeable slot.
    Placeable(PlaceableKind),
}

impl BuildOption {
    /// Every purchasable item, defenders first.
    #[must_use]
    pub fn all() -> Vec<Self> {
        DefenderKind::ALL
            .into_iter()
            .map(Self::Defender)
            .chain(PlaceableKind::ALL.into_iter().map(Self::Placeable))
            .collect()
    }

    /// Price of the item under the provided balance.
    #[must_use]
    pub fn cost(self, balance: &Balance) -> u64 {
        match self {
            Self::Defender(kind) => balance.defenders.get(kind).cost,
            Self::Placeable(kind) => balance.placeables.cost(kind),
        }
    }

    /// Slot kind the item must be placed on.
    #[must_use]
    pub const fn slot_kind(self) -> SlotKind {
        match self {
            Self::Defender(_) => SlotKind::Build,
            Self::Placeable(_) => SlotKind::Placeable,
        }
    }
}

/// Purchase requested by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Item to buy.
    pub option: BuildOption,
    /// Target tile.
    pub cell: CellCoord,
}

impl BuildRequest {
    /// Creates a new request.
    #[must_use]
    pub const fn new(option: BuildOption, cell: CellCoord) -> Self {
        Self { option, cell }
    }
}

/// Reasons a build request was refused. No money is spent in any case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The tile is not a slot.
    #[error("cell {cell:?} is not a slot")]
    NotASlot {
        /// Requested tile.
        cell: CellCoord,
    },
    /// The slot does not accept this kind of item.
    #[error("cell {cell:?} does not accept {option:?}")]
    WrongSlot {
        /// Requested tile.
        cell: CellCoord,
        /// Item that was refused.
        option: BuildOption,
    },
    /// Another defender already holds the slot.
    #[error("cell {cell:?} is occupied by {defender:?}")]
    Occupied {
        /// Requested tile.
        cell: CellCoord,
        /// Current occupant.
        defender: DefenderId,
    },
    /// The ledger cannot cover the price.
    #[error("cost {cost} exceeds balance {balance}")]
    InsufficientFunds {
        /// Price of the item.
        cost: u64,
        /// Balance at the time of the attempt.
        balance: u64,
    },
    /// The match is decided or stopped and accepts no more orders.
    #[error("the match no longer accepts build orders")]
    MatchOver,
}

/// Build system translating purchase requests into placement commands.
#[derive(Clone, Debug)]
pub struct Builder {
    balance: Balance,
}

impl Builder {
    /// Creates a builder pricing items with the provided balance.
    #[must_use]
    pub fn new(balance: Balance) -> Self {
        Self { balance }
    }

    /// Every purchasable item with its price.
    #[must_use]
    pub fn catalogue(&self) -> Vec<(BuildOption, u64)> {
        BuildOption::all()
            .into_iter()
            .map(|option| (option, option.cost(&self.balance)))
            .collect()
    }

    /// Validates the request, spends its price and emits the placement command.
    ///
    /// The `slot_at` closure should mirror the world's `query::slot` helper.
    /// Returns the amount spent.
    pub fn handle<F>(
        &mut self,
        request: BuildRequest,
        ledger: &Ledger,
        mut slot_at: F,
        out: &mut Vec<Command>,
    ) -> Result<u64, BuildError>
    where
        F: FnMut(CellCoord) -> Option<SlotState>,
    {
        let BuildRequest { option, cell } = request;
        let slot = slot_at(cell).ok_or(BuildError::NotASlot { cell })?;
        if slot.kind != option.slot_kind() {
            return Err(BuildError::WrongSlot { cell, option });
        }
        if let Some(defender) = slot.occupant {
            return Err(BuildError::Occupied { cell, defender });
        }

        let cost = option.cost(&self.balance);
        if !ledger.spend(cost) {
            return Err(BuildError::InsufficientFunds {
                cost,
                balance: ledger.balance(),
            });
        }

        debug!(?option, ?cell, cost, "build accepted");
        out.push(match option {
            BuildOption::Defender(kind) => Command::PlaceDefender { kind, cell },
            BuildOption::Placeable(kind) => Command::PlacePlaceable { kind, cell },
        });
        Ok(cost)
    }
}
