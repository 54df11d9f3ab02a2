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

use thiserror::Error;

/// Everything that can go wrong while handling a chat event.
///
/// None of these are fatal. The session turns each one into a reply for the
/// player who caused it, so the `Display` text is written for players.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("I don't understand '{0}'. Say 'help' for a list of commands.")]
    Parse(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("No game is in progress. Say 'start' to begin one.")]
    NoGame,
    #[error("No game is forming right now. Say 'start' to begin one.")]
    NotForming,
    #[error("A game is already in progress.")]
    GameInProgress,
    #[error("That can only be done during the {0}.")]
    WrongPhase(&'static str),
    #[error("Only {0} can do that.")]
    WrongRole(&'static str),
    #[error("You aren't playing in this game.")]
    NotPlaying,
    #[error("Dead players may only ask for 'stats', 'votes' or 'help'.")]
    DeadPlayer,
    #[error("You can't target yourself.")]
    SelfTarget,
    #[error("{0} is one of the pack.")]
    PackMember(String),
    #[error("{0} is not among the living.")]
    TargetNotLiving(String),
    #[error("You have already used your vision tonight.")]
    AlreadyActed,
    #[error("Only {0} may do that right now.")]
    NotAuthorized(String),
    #[error("Send '{0}' to me privately.")]
    MustBePrivate(&'static str),
    #[error("The name {0} already belongs to another player.")]
    NameTaken(String),
    #[error("Sorry, at least {need} players are needed to start; only {have} have joined.")]
    InsufficientPlayers { have: usize, need: usize },
    #[error("{0} has already joined.")]
    AlreadyJoined(String),
    #[error("Nobody called '{0}' is in the game.")]
    NotFound(String),
}

impl EngineError {
    /// Replies to these must never land in the public channel, whatever
    /// channel the offending command arrived on.
    pub fn is_private_only(&self) -> bool {
        matches!(self, Self::MustBePrivate(_))
    }

    /// Replies to these go to the whole room, whatever channel the command
    /// arrived on.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::InsufficientPlayers { .. })
    }
}
