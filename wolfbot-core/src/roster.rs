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

//! Who is playing, under which name, and whether they are still alive.
//!
//! Every participant gets a [`PlayerId`] seat when they join. Votes, targets
//! and the game-starter all point at seats, so a nick change only touches the
//! seat's display name and nothing else has to be re-keyed.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::roles::{Role, RoleAssignment};

/// Stable seat handed out on join. Never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Live,
    /// Died to the wolves or the mob.
    Killed,
    /// Left (or was removed) once the game was running.
    Departed,
    /// Left before roles were dealt; no longer part of the game at all.
    Withdrawn,
}

#[derive(Debug, Clone)]
struct Seat {
    name: String,
    standing: Standing,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    seats: Vec<Seat>,
    live: Vec<PlayerId>,
    /// In order of death.
    dead: Vec<PlayerId>,
    assignment: Option<RoleAssignment>,
    living_wolves: Vec<PlayerId>,
}

/// Compare nicks the way IRC servers do: ASCII case-insensitively, with
/// `{}|^` as the lowercase forms of `[]\~`.
pub fn names_match(left: &str, right: &str) -> bool {
    left.len() == right.len()
        && left
            .chars()
            .zip(right.chars())
            .all(|(a, b)| fold_nick_char(a) == fold_nick_char(b))
}

fn fold_nick_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        other => other.to_ascii_lowercase(),
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn join(&mut self, name: &str) -> Result<PlayerId, EngineError> {
        if let Some(existing) = self.find_live(name) {
            return Err(EngineError::AlreadyJoined(self.name(existing).to_string()));
        }

        let id = PlayerId(self.seats.len() as u32);
        self.seats.push(Seat {
            name: name.to_string(),
            standing: Standing::Live,
        });
        self.live.push(id);
        Ok(id)
    }

    /// Drop a player who leaves before roles are dealt. Returns false if they
    /// weren't live.
    pub fn withdraw(&mut self, player: PlayerId) -> bool {
        self.leave_live(player, Standing::Withdrawn)
    }

    /// Move a player who leaves mid-game to the dead list without counting
    /// them as a kill.
    pub fn depart(&mut self, player: PlayerId) -> bool {
        self.leave_live(player, Standing::Departed)
    }

    pub fn kill(&mut self, player: PlayerId) -> bool {
        self.leave_live(player, Standing::Killed)
    }

    fn leave_live(&mut self, player: PlayerId, standing: Standing) -> bool {
        let Some(position) = self.live.iter().position(|id| *id == player) else {
            return false;
        };
        self.live.remove(position);
        self.living_wolves.retain(|wolf| *wolf != player);
        if standing != Standing::Withdrawn {
            self.dead.push(player);
        }
        if let Some(seat) = self.seats.get_mut(player.0 as usize) {
            seat.standing = standing;
        }
        true
    }

    /// Give a seat a new display name. Refused only when a different live
    /// player already answers to it.
    pub fn rename(&mut self, player: PlayerId, new_name: &str) -> Result<(), EngineError> {
        if let Some(holder) = self.find_live(new_name)
            && holder != player
        {
            return Err(EngineError::NameTaken(new_name.to_string()));
        }
        let seat = self
            .seats
            .get_mut(player.0 as usize)
            .ok_or_else(|| EngineError::NotFound(new_name.to_string()))?;
        seat.name = new_name.to_string();
        Ok(())
    }

    /// Resolve a typed name to a seat, preferring the living over the dead.
    pub fn find(&self, token: &str) -> Option<PlayerId> {
        self.find_live(token).or_else(|| {
            self.dead
                .iter()
                .rev()
                .copied()
                .find(|id| names_match(self.name(*id), token))
        })
    }

    pub fn find_live(&self, token: &str) -> Option<PlayerId> {
        self.live
            .iter()
            .copied()
            .find(|id| names_match(self.name(*id), token))
    }

    pub fn lookup(&self, token: &str) -> Result<PlayerId, EngineError> {
        self.find(token)
            .ok_or_else(|| EngineError::NotFound(token.to_string()))
    }

    pub fn name(&self, player: PlayerId) -> &str {
        self.seats
            .get(player.0 as usize)
            .map_or("<unknown>", |seat| seat.name.as_str())
    }

    pub fn names(&self, players: &[PlayerId]) -> Vec<String> {
        players.iter().map(|id| self.name(*id).to_string()).collect()
    }

    pub fn standing(&self, player: PlayerId) -> Option<Standing> {
        self.seats.get(player.0 as usize).map(|seat| seat.standing)
    }

    pub fn is_live(&self, player: PlayerId) -> bool {
        self.standing(player) == Some(Standing::Live)
    }

    pub fn live(&self) -> &[PlayerId] {
        &self.live
    }

    pub fn dead(&self) -> &[PlayerId] {
        &self.dead
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn assign(&mut self, assignment: RoleAssignment) {
        self.living_wolves = assignment
            .wolves()
            .iter()
            .copied()
            .filter(|wolf| self.live.contains(wolf))
            .collect();
        self.assignment = Some(assignment);
    }

    pub fn assignment(&self) -> Option<&RoleAssignment> {
        self.assignment.as_ref()
    }

    pub fn role_of(&self, player: PlayerId) -> Option<Role> {
        self.assignment.as_ref()?.role_of(player)
    }

    pub fn living_wolves(&self) -> &[PlayerId] {
        &self.living_wolves
    }

    pub fn seer(&self) -> Option<PlayerId> {
        self.assignment.as_ref().map(RoleAssignment::seer)
    }

    pub fn living_seer(&self) -> Option<PlayerId> {
        self.seer().filter(|seer| self.is_live(*seer))
    }
}
