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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::roster::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    None,
    Starting,
    Night,
    Day,
    /// Only held while the closing narration is produced; the session
    /// resets to `None` before it finishes handling the event.
    Ended,
}

impl Phase {
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Night | Phase::Day)
    }
}

/// Where the game is in its NONE -> STARTING -> NIGHT <-> DAY -> ENDED cycle,
/// plus who holds the right to finalize or end it.
#[derive(Debug, Clone, Default)]
pub struct PhaseEngine {
    phase: Phase,
    /// Completed nights.
    round: u32,
    starter: Option<PlayerId>,
    starter_last_seen: Option<DateTime<Utc>>,
}

impl PhaseEngine {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn starter(&self) -> Option<PlayerId> {
        self.starter
    }

    pub fn open(&mut self, starter: PlayerId, at: DateTime<Utc>) -> Result<(), EngineError> {
        if self.phase != Phase::None {
            return Err(EngineError::GameInProgress);
        }
        self.phase = Phase::Starting;
        self.round = 0;
        self.starter = Some(starter);
        self.starter_last_seen = Some(at);
        Ok(())
    }

    pub fn begin_night(&mut self) -> Result<(), EngineError> {
        match self.phase {
            Phase::Starting | Phase::Day => {
                self.phase = Phase::Night;
                Ok(())
            }
            _ => Err(EngineError::WrongPhase("day")),
        }
    }

    pub fn begin_day(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Night {
            return Err(EngineError::WrongPhase("night"));
        }
        self.phase = Phase::Day;
        self.round += 1;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.phase = Phase::Ended;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether `actor` may finalize or end the game. Once the starter's
    /// authority has lapsed (or they left or died) anyone may.
    pub fn may_control(&self, actor: Option<PlayerId>) -> bool {
        match self.starter {
            None => true,
            Some(starter) => actor == Some(starter),
        }
    }

    /// Record that `actor` just said something. If it wasn't the starter and
    /// the starter has been quiet for longer than `timeout_seconds`, their
    /// authority lapses and the lapsed starter is returned.
    pub fn note_activity(
        &mut self,
        actor: Option<PlayerId>,
        at: DateTime<Utc>,
        timeout_seconds: u64,
    ) -> Option<PlayerId> {
        let starter = self.starter?;
        if actor == Some(starter) {
            self.starter_last_seen = Some(at);
            return None;
        }

        let last_seen = self.starter_last_seen?;
        let idle = at.signed_duration_since(last_seen).num_seconds();
        if idle > i64::try_from(timeout_seconds).unwrap_or(i64::MAX) {
            self.starter = None;
            self.starter_last_seen = None;
            return Some(starter);
        }
        None
    }

    /// Open control to everyone if `player` held it. Returns whether they did.
    pub fn release_starter(&mut self, player: PlayerId) -> bool {
        if self.starter == Some(player) {
            self.starter = None;
            self.starter_last_seen = None;
            true
        } else {
            false
        }
    }
}
