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

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::phase::Phase;
use crate::roles::Role;
use crate::roster::{PlayerId, Roster};

/// Votes needed to lynch with `live` players standing: strictly more than half.
pub fn majority(live: usize) -> usize {
    live / 2 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeerVision {
    pub target: PlayerId,
    pub is_wolf: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WolfVote {
    /// Every living wolf has named the same victim.
    Agreed(PlayerId),
    /// Every living wolf has voted, but not for the same victim.
    Disagreement,
    Waiting { remaining: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LynchVote {
    Majority(PlayerId),
    Pending {
        target: PlayerId,
        votes: usize,
        needed: usize,
    },
}

/// What a departure cleared out of the night's choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Released {
    pub seer_target: bool,
    pub wolf_target: bool,
}

/// The current phase's votes. Cleared on every phase change.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    wolf_votes: BTreeMap<PlayerId, PlayerId>,
    wolf_target: Option<PlayerId>,
    seer_target: Option<PlayerId>,
    lynch_votes: BTreeMap<PlayerId, PlayerId>,
}

impl VoteTally {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn seer_target(&self) -> Option<PlayerId> {
        self.seer_target
    }

    pub fn wolf_target(&self) -> Option<PlayerId> {
        self.wolf_target
    }

    pub fn wolf_votes(&self) -> impl Iterator<Item = (PlayerId, PlayerId)> + '_ {
        self.wolf_votes.iter().map(|(wolf, target)| (*wolf, *target))
    }

    pub fn lynch_votes(&self) -> impl Iterator<Item = (PlayerId, PlayerId)> + '_ {
        self.lynch_votes.iter().map(|(voter, target)| (*voter, *target))
    }

    pub fn has_lynch_vote(&self, voter: PlayerId) -> bool {
        self.lynch_votes.contains_key(&voter)
    }

    pub fn seer_see(
        &mut self,
        roster: &Roster,
        phase: Phase,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<SeerVision, EngineError> {
        if phase != Phase::Night {
            return Err(EngineError::WrongPhase("night"));
        }
        if roster.living_seer() != Some(voter) {
            return Err(EngineError::WrongRole("the seer"));
        }
        if self.seer_target.is_some() {
            return Err(EngineError::AlreadyActed);
        }
        if voter == target {
            return Err(EngineError::SelfTarget);
        }
        if !roster.is_live(target) {
            return Err(EngineError::TargetNotLiving(roster.name(target).to_string()));
        }

        self.seer_target = Some(target);
        Ok(SeerVision {
            target,
            is_wolf: roster.role_of(target) == Some(Role::Wolf),
        })
    }

    pub fn wolf_kill(
        &mut self,
        roster: &Roster,
        phase: Phase,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<WolfVote, EngineError> {
        if phase != Phase::Night {
            return Err(EngineError::WrongPhase("night"));
        }
        if !roster.living_wolves().contains(&voter) {
            return Err(EngineError::WrongRole("a werewolf"));
        }
        if voter == target {
            return Err(EngineError::SelfTarget);
        }
        if !roster.is_live(target) {
            return Err(EngineError::TargetNotLiving(roster.name(target).to_string()));
        }
        if roster.role_of(target) == Some(Role::Wolf) {
            return Err(EngineError::PackMember(roster.name(target).to_string()));
        }

        self.wolf_votes.insert(voter, target);
        Ok(self.settle_wolves(roster))
    }

    /// Re-derive the pack's choice from the votes of the wolves alive right now.
    pub fn settle_wolves(&mut self, roster: &Roster) -> WolfVote {
        self.wolf_target = None;
        let wolves = roster.living_wolves();
        let cast: Vec<PlayerId> = wolves
            .iter()
            .filter_map(|wolf| self.wolf_votes.get(wolf).copied())
            .filter(|target| roster.is_live(*target))
            .collect();

        if wolves.is_empty() || cast.len() < wolves.len() {
            return WolfVote::Waiting {
                remaining: wolves.len() - cast.len(),
            };
        }

        let first = cast[0];
        if cast.iter().all(|target| *target == first) {
            self.wolf_target = Some(first);
            WolfVote::Agreed(first)
        } else {
            WolfVote::Disagreement
        }
    }

    pub fn lynch_vote(
        &mut self,
        roster: &Roster,
        phase: Phase,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<LynchVote, EngineError> {
        if phase != Phase::Day {
            return Err(EngineError::WrongPhase("day"));
        }
        if !roster.is_live(voter) {
            return Err(EngineError::DeadPlayer);
        }
        if voter == target {
            return Err(EngineError::SelfTarget);
        }
        if !roster.is_live(target) {
            return Err(EngineError::TargetNotLiving(roster.name(target).to_string()));
        }

        self.lynch_votes.insert(voter, target);
        if let Some(victim) = self.lynch_majority(roster) {
            return Ok(LynchVote::Majority(victim));
        }
        Ok(LynchVote::Pending {
            target,
            votes: self.tally(roster).get(&target).copied().unwrap_or(0),
            needed: majority(roster.live_count()),
        })
    }

    /// Lynch votes per target, counting only living voters and targets.
    pub fn tally(&self, roster: &Roster) -> BTreeMap<PlayerId, usize> {
        let mut counts = BTreeMap::new();
        for (voter, target) in &self.lynch_votes {
            if roster.is_live(*voter) && roster.is_live(*target) {
                *counts.entry(*target).or_insert(0) += 1;
            }
        }
        counts
    }

    /// The target that has reached a majority of the current living count.
    pub fn lynch_majority(&self, roster: &Roster) -> Option<PlayerId> {
        let needed = majority(roster.live_count());
        self.tally(roster)
            .into_iter()
            .find(|(_, votes)| *votes >= needed)
            .map(|(target, _)| target)
    }

    /// Whether the night can end, and who dies if it does: the seer must be
    /// dead or have looked, and the pack must have agreed on a living victim.
    pub fn night_outcome(&self, roster: &Roster) -> Option<PlayerId> {
        let seer_done = roster.living_seer().is_none() || self.seer_target.is_some();
        if !seer_done {
            return None;
        }
        self.wolf_target.filter(|victim| roster.is_live(*victim))
    }

    /// Drop every vote cast by or against `player`, and release any night
    /// target that pointed at them.
    pub fn forget(&mut self, player: PlayerId) -> Released {
        let mut released = Released::default();

        self.wolf_votes.remove(&player);
        let before = self.wolf_votes.len();
        self.wolf_votes.retain(|_, target| *target != player);
        if self.wolf_votes.len() != before || self.wolf_target == Some(player) {
            released.wolf_target = true;
            self.wolf_target = None;
        }

        if self.seer_target == Some(player) {
            self.seer_target = None;
            released.seer_target = true;
        }

        self.lynch_votes.remove(&player);
        self.lynch_votes.retain(|_, target| *target != player);
        released
    }
}
