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

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_PLAYERS: usize = 6;
/// Two wolves, a seer and two villagers: the smallest table where the
/// wolves don't already have parity on the first night.
pub const MIN_SUPPORTED_PLAYERS: usize = 5;
pub const DEFAULT_STARTER_TIMEOUT_SECONDS: u64 = 120;

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Table rules for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub min_players: usize,
    /// How long the game-starter may stay silent, while others keep talking,
    /// before anyone may finalize or end the game.
    pub starter_timeout_seconds: u64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            starter_timeout_seconds: DEFAULT_STARTER_TIMEOUT_SECONDS,
        }
    }
}

impl GameRules {
    pub fn min_players(&self) -> usize {
        self.min_players.max(MIN_SUPPORTED_PLAYERS)
    }

    pub fn starter_timeout_seconds(&self) -> u64 {
        self.starter_timeout_seconds.max(1)
    }
}

/// Replace `${VAR_NAME}` patterns in a string with values from environment variables.
/// Unknown or unset variables are replaced with an empty string.
pub fn expand_env_vars(input: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
