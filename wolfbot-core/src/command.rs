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

use std::str::FromStr;

use serde::Serialize;

use crate::error::EngineError;

/// A parsed chat command. Target names are kept exactly as typed; they are
/// resolved against the roster by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Join,
    End,
    See(String),
    Kill(String),
    Lynch(String),
    Stats,
    Votes,
    Del(String),
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Start,
    Join,
    End,
    See,
    Kill,
    Lynch,
    Stats,
    Votes,
    Del,
    Help,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommandSpec {
    pub kind: CommandKind,
    pub word: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
}

impl CommandSpec {
    fn answers_to(&self, word: &str) -> bool {
        self.word.eq_ignore_ascii_case(word)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(word))
    }

    fn takes_target(&self) -> bool {
        matches!(
            self.kind,
            CommandKind::See | CommandKind::Kill | CommandKind::Lynch | CommandKind::Del
        )
    }
}

pub const COMMANDS: [CommandSpec; 10] = [
    CommandSpec {
        kind: CommandKind::Start,
        word: "start",
        aliases: &[],
        usage: "start",
        summary: "Begin forming a new game, or deal roles once enough players have joined.",
    },
    CommandSpec {
        kind: CommandKind::Join,
        word: "join",
        aliases: &[],
        usage: "join",
        summary: "Join the game that is forming.",
    },
    CommandSpec {
        kind: CommandKind::End,
        word: "end",
        aliases: &[],
        usage: "end",
        summary: "Stop the current game and reveal who was who.",
    },
    CommandSpec {
        kind: CommandKind::See,
        word: "see",
        aliases: &[],
        usage: "see <name>",
        summary: "Seer only, at night, in private: learn whether someone is a werewolf.",
    },
    CommandSpec {
        kind: CommandKind::Kill,
        word: "kill",
        aliases: &[],
        usage: "kill <name>",
        summary: "Werewolves only, at night, in private: vote on tonight's victim.",
    },
    CommandSpec {
        kind: CommandKind::Lynch,
        word: "lynch",
        aliases: &[],
        usage: "lynch <name>",
        summary: "During the day: vote to lynch someone. Voting again changes your vote.",
    },
    CommandSpec {
        kind: CommandKind::Stats,
        word: "stats",
        aliases: &["status"],
        usage: "stats",
        summary: "Show the phase, who is alive and dead, and the lynch tally.",
    },
    CommandSpec {
        kind: CommandKind::Votes,
        word: "votes",
        aliases: &[],
        usage: "votes",
        summary: "During the day: show who has voted and who hasn't.",
    },
    CommandSpec {
        kind: CommandKind::Del,
        word: "del",
        aliases: &[],
        usage: "del <name>",
        summary: "Remove a participant from the game.",
    },
    CommandSpec {
        kind: CommandKind::Help,
        word: "help",
        aliases: &[],
        usage: "help",
        summary: "List these commands.",
    },
];

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Start => CommandKind::Start,
            Self::Join => CommandKind::Join,
            Self::End => CommandKind::End,
            Self::See(_) => CommandKind::See,
            Self::Kill(_) => CommandKind::Kill,
            Self::Lynch(_) => CommandKind::Lynch,
            Self::Stats => CommandKind::Stats,
            Self::Votes => CommandKind::Votes,
            Self::Del(_) => CommandKind::Del,
            Self::Help => CommandKind::Help,
        }
    }

    /// Read-only commands, which dead players may still use.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Stats | Self::Votes | Self::Help)
    }
}

impl FromStr for Command {
    type Err = EngineError;

    /// Only the leading word picks the command. Anything after a command that
    /// takes no argument is ignored, so "start game" is just "start".
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let mut words = trimmed.split_whitespace();
        let word = words.next().unwrap_or_default();
        let spec = COMMANDS
            .iter()
            .find(|spec| spec.answers_to(word))
            .ok_or_else(|| EngineError::Parse(trimmed.to_string()))?;

        let target = words.next().map(str::to_string);
        if spec.takes_target() && target.is_none() {
            return Err(EngineError::Usage(spec.usage));
        }
        let target = target.unwrap_or_default();

        Ok(match spec.kind {
            CommandKind::Start => Self::Start,
            CommandKind::Join => Self::Join,
            CommandKind::End => Self::End,
            CommandKind::See => Self::See(target),
            CommandKind::Kill => Self::Kill(target),
            CommandKind::Lynch => Self::Lynch(target),
            CommandKind::Stats => Self::Stats,
            CommandKind::Votes => Self::Votes,
            CommandKind::Del => Self::Del(target),
            CommandKind::Help => Self::Help,
        })
    }
}
