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

//! Everything the moderator says. Kept apart from the game logic so wording
//! can change without touching the state machine.

use crate::roles::Role;
use crate::win::Winner;

pub const NEW_GAME_TEXT: &str = "This is a game of paranoia and psychological intrigue. \
Everyone in this group appears to be a common villager, but three of you are 'special'. \
Two people are actually evil werewolves, seeking to kill everyone while concealing their \
identity. And one of you is also a 'seer'; you have the ability to learn whether a specific \
person is or is not a werewolf. The seer might not want to reveal their identity, as they \
become a prime werewolf target. As a community, your group objective is to weed out the \
werewolves and lynch them both, before you're all killed in your sleep.";

pub const WOLF_INTRO: &str = "You are a WEREWOLF. You want to kill everyone while they \
sleep. Whatever happens, don't let the villagers know!";

pub const SEER_INTRO: &str = "You're not an ordinary villager, but are a SEER. You'll have \
an occasional chance to privately learn whether someone is or isn't a werewolf. Keep your \
identity secret, or the werewolves may kill you!";

pub const VILLAGER_INTRO: &str = "You're an ordinary villager. When the time comes, be \
ready to join the mob and lynch a werewolf.";

/// "A", "A and B", "A, B and C".
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => "nobody".to_string(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {last}", rest.join(", ")),
    }
}

pub fn game_opened(starter: &str, min_players: usize) -> String {
    format!(
        "{starter} wants to play Werewolf! Say 'join' to take part. Once at least \
         {min_players} players have joined, {starter} can say 'start' again to begin."
    )
}

pub fn joined(name: &str, count: usize) -> String {
    format!("{name} has joined the game. {count} players so far.")
}

pub fn forming_hint(name: &str) -> String {
    format!("Welcome, {name}. A game of Werewolf is forming here; say 'join' to take part.")
}

pub fn intro(role: Role) -> &'static str {
    match role {
        Role::Wolf => WOLF_INTRO,
        Role::Seer => SEER_INTRO,
        Role::Villager => VILLAGER_INTRO,
    }
}

pub fn wolf_partner(partner: &str) -> String {
    format!("Your fellow werewolf is {partner}.")
}

pub fn new_game_begun() -> &'static str {
    "A new game has begun!"
}

pub fn night_falls(round: u32) -> String {
    if round == 0 {
        "Night falls on the village for the first time. Everyone goes to sleep... \
         but some of you are not sleeping."
            .to_string()
    } else {
        "Night falls once more. The villagers lock their doors and pray.".to_string()
    }
}

pub fn seer_prompt() -> &'static str {
    "Seer, you may now have a vision. Send me 'see <name>' privately to learn \
     whether that person is a werewolf."
}

pub fn wolf_prompt() -> &'static str {
    "Werewolves, choose your victim. Send me 'kill <name>' privately; the pack \
     must agree on the same name."
}

pub fn vision(target: &str, is_wolf: bool) -> String {
    if is_wolf {
        format!("Your vision is clear: {target} is a WEREWOLF!")
    } else {
        format!("Your vision is clear: {target} is a normal villager.")
    }
}

pub fn wolf_waiting(remaining: usize) -> String {
    format!("Your vote is in. Waiting on {remaining} more of the pack.")
}

pub fn wolf_disagreement() -> &'static str {
    "The pack disagrees on a victim. You must all name the same person."
}

pub fn wolf_agreed(victim: &str) -> String {
    format!("The pack has chosen {victim}.")
}

pub fn dawn(victim: &str, role: Option<Role>) -> String {
    let role = role.map_or("a stranger", Role::describe);
    format!(
        "The sun rises. The villagers find the mangled remains of {victim} in the square. \
         {victim} was {role}."
    )
}

pub fn day_begins(needed: usize) -> String {
    format!(
        "It is now day. Discuss, then vote with 'lynch <name>'. {needed} votes are \
         needed to lynch someone."
    )
}

pub fn lynch_vote(voter: &str, target: &str, votes: usize, needed: usize) -> String {
    format!("{voter} votes to lynch {target}. ({votes} of {needed} needed)")
}

pub fn lynched(victim: &str, role: Option<Role>) -> String {
    let role = role.map_or("a stranger", Role::describe);
    format!("The mob has spoken. {victim} is dragged away and lynched. {victim} was {role}.")
}

pub fn winners(winner: Winner) -> &'static str {
    match winner {
        Winner::Villagers => "The last werewolf is dead. The villagers have won!",
        Winner::Wolves => {
            "The werewolves now outnumber the living villagers and devour them. \
             The werewolves have won!"
        }
    }
}

pub fn reveal(wolves: &[String], seer: &str) -> String {
    format!(
        "The werewolves were {}. The seer was {seer}.",
        join_names(wolves)
    )
}

pub fn game_ended() -> &'static str {
    "The game has ended."
}

pub fn game_abandoned() -> &'static str {
    "Everyone has left, so the game is called off."
}

pub fn starter_lapsed(starter: &str) -> String {
    format!("{starter} has gone quiet, so anyone may now 'start' or 'end' the game.")
}

pub fn starter_died(starter: &str) -> String {
    format!("{starter} is dead, so anyone may now 'start' or 'end' the game.")
}

pub fn starter_left(starter: &str) -> String {
    format!("{starter} has left, so anyone may now 'start' or 'end' the game.")
}

pub fn departed(name: &str) -> String {
    format!("{name} has left the game.")
}

pub fn seer_released(target: &str) -> String {
    format!("{target} is no longer in the game. You may see again tonight.")
}

pub fn wolves_released(target: &str) -> String {
    format!("{target} is no longer in the game. Choose another victim.")
}
