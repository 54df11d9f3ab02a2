// Copyright (C) 2026 StarHuntingGames
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::roster::PlayerId;

pub const WOLF_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Villager,
    Wolf,
    Seer,
}

impl Role {
    pub fn describe(self) -> &'static str {
        match self {
            Role::Villager => "a common villager",
            Role::Wolf => "a werewolf",
            Role::Seer => "the seer",
        }
    }
}

/// The hidden roles dealt at game start. Never changes afterwards, so it
/// doubles as the end-of-game reveal even after the living wolves thin out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    wolves: Vec<PlayerId>,
    seer: PlayerId,
    villagers: Vec<PlayerId>,
}

impl RoleAssignment {
    pub fn wolves(&self) -> &[PlayerId] {
        &self.wolves
    }

    pub fn seer(&self) -> PlayerId {
        self.seer
    }

    pub fn villagers(&self) -> &[PlayerId] {
        &self.villagers
    }

    pub fn role_of(&self, player: PlayerId) -> Option<Role> {
        if self.wolves.contains(&player) {
            Some(Role::Wolf)
        } else if self.seer == player {
            Some(Role::Seer)
        } else if self.villagers.contains(&player) {
            Some(Role::Villager)
        } else {
            None
        }
    }
}

/// Deal two wolves and a seer out of `live`; everyone else is a villager.
///
/// Picks are uniform without replacement: each one pops a random index
/// from whoever is still undealt.
pub fn assign_roles<R: Rng + ?Sized>(
    live: &[PlayerId],
    min_players: usize,
    rng: &mut R,
) -> Result<RoleAssignment, EngineError> {
    let need = min_players.max(WOLF_COUNT + 1);
    if live.len() < need {
        return Err(EngineError::InsufficientPlayers {
            have: live.len(),
            need,
        });
    }

    let mut pool = live.to_vec();
    let mut wolves = Vec::with_capacity(WOLF_COUNT);
    for _ in 0..WOLF_COUNT {
        wolves.push(pool.remove(rng.random_range(0..pool.len())));
    }
    let seer = pool.remove(rng.random_range(0..pool.len()));

    Ok(RoleAssignment {
        wolves,
        seer,
        villagers: pool,
    })
}
