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

use serde::{Deserialize, Serialize};

/// Something the chat transport saw happen in a room, delivered in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        from: String,
        text: String,
        /// Sent to the bot directly rather than said in the room.
        #[serde(default)]
        private: bool,
        /// The transport vouches that the sender is a room operator.
        #[serde(default)]
        operator: bool,
    },
    Joined {
        name: String,
    },
    Parted {
        name: String,
    },
    Quit {
        name: String,
    },
    Kicked {
        name: String,
    },
    NickChange {
        old: String,
        new: String,
    },
}

impl ChatEvent {
    pub fn message(from: &str, text: &str) -> Self {
        Self::Message {
            from: from.to_string(),
            text: text.to_string(),
            private: false,
            operator: false,
        }
    }

    pub fn private_message(from: &str, text: &str) -> Self {
        Self::Message {
            from: from.to_string(),
            text: text.to_string(),
            private: true,
            operator: false,
        }
    }

    /// The name of whoever caused the event.
    pub fn actor(&self) -> &str {
        match self {
            Self::Message { from, .. } => from,
            Self::Joined { name }
            | Self::Parted { name }
            | Self::Quit { name }
            | Self::Kicked { name } => name,
            Self::NickChange { old, .. } => old,
        }
    }
}

/// A line for the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Public { text: String },
    Private { to: String, text: String },
}

impl Outbound {
    pub fn public(text: impl Into<String>) -> Self {
        Self::Public { text: text.into() }
    }

    pub fn private(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Private {
            to: to.into(),
            text: text.into(),
        }
    }
}
