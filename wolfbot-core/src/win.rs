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

use crate::roster::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Villagers,
    Wolves,
}

/// Decide whether the game is over. Villagers win once every wolf is gone;
/// wolves win as soon as they are no longer outnumbered by the rest.
pub fn evaluate(roster: &Roster) -> Option<Winner> {
    roster.assignment()?;

    let wolves = roster.living_wolves().len();
    let others = roster.live_count() - wolves;
    if wolves == 0 {
        Some(Winner::Villagers)
    } else if others <= wolves {
        Some(Winner::Wolves)
    } else {
        None
    }
}
