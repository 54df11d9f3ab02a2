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

//! Moderator engine for Werewolf played over a chat room.
//!
//! A [`Session`] owns one room's game. Feed it [`ChatEvent`]s in arrival
//! order and deliver the [`Outbound`] lines it returns.

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod narration;
pub mod phase;
pub mod roles;
pub mod roster;
pub mod session;
pub mod votes;
pub mod win;

pub use command::{COMMANDS, Command, CommandKind, CommandSpec};
pub use config::{GameRules, expand_env_vars};
pub use error::EngineError;
pub use event::{ChatEvent, Outbound};
pub use phase::Phase;
pub use roles::Role;
pub use roster::PlayerId;
pub use session::{Session, SessionSnapshot, TallyEntry};
pub use win::Winner;
