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

//! One room's game: the roster, the phase, and the votes, driven one chat
//! event at a time.

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::{COMMANDS, Command};
use crate::config::GameRules;
use crate::error::EngineError;
use crate::event::{ChatEvent, Outbound};
use crate::narration::{self, join_names};
use crate::phase::{Phase, PhaseEngine};
use crate::roles::{Role, assign_roles};
use crate::roster::{PlayerId, Roster};
use crate::votes::{LynchVote, VoteTally, WolfVote, majority};
use crate::win::{self, Winner};

/// Read-only view of a session. Never includes roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub round: u32,
    pub starter: Option<String>,
    pub live: Vec<String>,
    pub dead: Vec<String>,
    pub lynch_tally: Vec<TallyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub target: String,
    pub votes: usize,
}

/// Where a reply to the current command goes.
struct Reply<'a> {
    to: &'a str,
    private: bool,
}

#[derive(Debug)]
pub struct Session {
    rules: GameRules,
    rng: StdRng,
    roster: Roster,
    phase: PhaseEngine,
    votes: VoteTally,
    outbox: Vec<Outbound>,
}

impl Session {
    pub fn new(rules: GameRules, seed: u64) -> Self {
        Self {
            rules,
            rng: StdRng::seed_from_u64(seed),
            roster: Roster::new(),
            phase: PhaseEngine::default(),
            votes: VoteTally::default(),
            outbox: Vec::new(),
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    pub fn round(&self) -> u32 {
        self.phase.round()
    }

    pub fn starter(&self) -> Option<PlayerId> {
        self.phase.starter()
    }

    pub fn votes(&self) -> &VoteTally {
        &self.votes
    }

    /// No game and nobody seated: nothing would be lost by dropping it.
    pub fn is_idle(&self) -> bool {
        self.phase.phase() == Phase::None && self.roster.live_count() == 0
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let lynch_tally = self
            .votes
            .tally(&self.roster)
            .into_iter()
            .map(|(target, votes)| TallyEntry {
                target: self.roster.name(target).to_string(),
                votes,
            })
            .collect();

        SessionSnapshot {
            phase: self.phase.phase(),
            round: self.phase.round(),
            starter: self
                .phase
                .starter()
                .map(|starter| self.roster.name(starter).to_string()),
            live: self.roster.names(self.roster.live()),
            dead: self.roster.names(self.roster.dead()),
            lynch_tally,
        }
    }

    /// Process one event to completion and return what should be said.
    pub fn handle(&mut self, event: &ChatEvent, at: DateTime<Utc>) -> Vec<Outbound> {
        match event {
            ChatEvent::Message {
                from,
                text,
                private,
                operator,
            } => {
                let reply = Reply {
                    to: from,
                    private: *private,
                };
                self.on_message(&reply, text, *operator, at);
            }
            ChatEvent::Joined { name } => self.on_enter(name),
            ChatEvent::Parted { name } | ChatEvent::Quit { name } | ChatEvent::Kicked { name } => {
                self.on_departure(name)
            }
            ChatEvent::NickChange { old, new } => self.on_rename(old, new),
        }
        std::mem::take(&mut self.outbox)
    }

    fn on_message(&mut self, reply: &Reply<'_>, text: &str, operator: bool, at: DateTime<Utc>) {
        let actor = self.roster.find(reply.to);
        let timeout = self.rules.starter_timeout_seconds();
        if let Some(lapsed) = self.phase.note_activity(actor, at, timeout) {
            let name = self.roster.name(lapsed).to_string();
            info!(player = %name, "game-starter authority lapsed");
            self.announce(narration::starter_lapsed(&name));
        }

        let command = match text.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                self.refuse(reply, error);
                return;
            }
        };
        debug!(player = %reply.to, command = ?command.kind(), phase = ?self.phase.phase(), "command");

        if self.phase.phase().is_running()
            && actor.is_some_and(|id| !self.roster.is_live(id))
            && !command.is_query()
        {
            self.refuse(reply, EngineError::DeadPlayer);
            return;
        }

        if let Err(error) = self.dispatch(command, actor, reply, operator, at) {
            self.refuse(reply, error);
        }
    }

    fn dispatch(
        &mut self,
        command: Command,
        actor: Option<PlayerId>,
        reply: &Reply<'_>,
        operator: bool,
        at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        match command {
            Command::Start => self.start(actor, reply.to, at),
            Command::Join => self.join(reply.to),
            Command::End => self.end(actor),
            Command::See(target) => self.see(actor, reply, &target),
            Command::Kill(target) => self.kill(actor, reply, &target),
            Command::Lynch(target) => self.lynch(actor, &target),
            Command::Stats => {
                for line in self.status_lines() {
                    self.respond(reply, line);
                }
                Ok(())
            }
            Command::Votes => {
                for line in self.vote_report()? {
                    self.respond(reply, line);
                }
                Ok(())
            }
            Command::Del(target) => self.delete(actor, operator, &target),
            Command::Help => {
                for spec in &COMMANDS {
                    self.respond(reply, format!("{}: {}", spec.usage, spec.summary));
                }
                Ok(())
            }
        }
    }

    fn start(
        &mut self,
        actor: Option<PlayerId>,
        from: &str,
        at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        match self.phase.phase() {
            Phase::None => {
                self.reset();
                let starter = self.roster.join(from)?;
                self.phase.open(starter, at)?;
                info!(player = %from, "game forming");
                self.announce(narration::game_opened(from, self.rules.min_players()));
                Ok(())
            }
            Phase::Starting => {
                self.require_control(actor)?;
                let assignment =
                    assign_roles(self.roster.live(), self.rules.min_players(), &mut self.rng)?;
                self.roster.assign(assignment);
                info!(players = self.roster.live_count(), "roles dealt");

                self.notify_roles();
                self.announce(narration::new_game_begun());
                self.announce(narration::NEW_GAME_TEXT);
                self.enter_night()
            }
            Phase::Night | Phase::Day | Phase::Ended => Err(EngineError::GameInProgress),
        }
    }

    fn join(&mut self, from: &str) -> Result<(), EngineError> {
        match self.phase.phase() {
            Phase::Starting => {
                self.roster.join(from)?;
                info!(player = %from, "player joined");
                self.announce(narration::joined(from, self.roster.live_count()));
                Ok(())
            }
            Phase::None => Err(EngineError::NotForming),
            Phase::Night | Phase::Day | Phase::Ended => Err(EngineError::GameInProgress),
        }
    }

    fn end(&mut self, actor: Option<PlayerId>) -> Result<(), EngineError> {
        if self.phase.phase() == Phase::None {
            return Err(EngineError::NoGame);
        }
        self.require_control(actor)?;
        self.close_game(None);
        Ok(())
    }

    fn see(
        &mut self,
        actor: Option<PlayerId>,
        reply: &Reply<'_>,
        token: &str,
    ) -> Result<(), EngineError> {
        if !reply.private {
            return Err(EngineError::MustBePrivate("see <name>"));
        }
        let seer = self.require_living(actor)?;
        let target = self.roster.lookup(token)?;
        let vision = self
            .votes
            .seer_see(&self.roster, self.phase.phase(), seer, target)?;

        let target_name = self.roster.name(vision.target).to_string();
        self.tell(seer, narration::vision(&target_name, vision.is_wolf));
        self.check_night()
    }

    fn kill(
        &mut self,
        actor: Option<PlayerId>,
        reply: &Reply<'_>,
        token: &str,
    ) -> Result<(), EngineError> {
        if !reply.private {
            return Err(EngineError::MustBePrivate("kill <name>"));
        }
        let wolf = self.require_living(actor)?;
        let target = self.roster.lookup(token)?;
        let vote = self
            .votes
            .wolf_kill(&self.roster, self.phase.phase(), wolf, target)?;

        match vote {
            WolfVote::Waiting { remaining } => self.tell(wolf, narration::wolf_waiting(remaining)),
            WolfVote::Disagreement => self.tell_wolves(narration::wolf_disagreement()),
            WolfVote::Agreed(victim) => {
                let victim = self.roster.name(victim).to_string();
                self.tell_wolves(narration::wolf_agreed(&victim));
            }
        }
        self.check_night()
    }

    fn lynch(&mut self, actor: Option<PlayerId>, token: &str) -> Result<(), EngineError> {
        self.require_game()?;
        let voter = self.require_living(actor)?;
        let target = self.roster.lookup(token)?;
        let vote = self
            .votes
            .lynch_vote(&self.roster, self.phase.phase(), voter, target)?;

        let voter_name = self.roster.name(voter).to_string();
        match vote {
            LynchVote::Pending {
                target,
                votes,
                needed,
            } => {
                let target = self.roster.name(target).to_string();
                self.announce(narration::lynch_vote(&voter_name, &target, votes, needed));
                Ok(())
            }
            LynchVote::Majority(victim) => {
                let needed = majority(self.roster.live_count());
                let target = self.roster.name(victim).to_string();
                self.announce(narration::lynch_vote(&voter_name, &target, needed, needed));
                self.resolve_lynch(victim)
            }
        }
    }

    fn delete(
        &mut self,
        actor: Option<PlayerId>,
        operator: bool,
        token: &str,
    ) -> Result<(), EngineError> {
        self.require_game()?;
        if !operator {
            self.require_control(actor)?;
        }
        let target = self
            .roster
            .find_live(token)
            .ok_or_else(|| EngineError::NotFound(token.to_string()))?;
        info!(player = %self.roster.name(target), "participant removed");
        self.remove_participant(target);
        Ok(())
    }

    fn on_enter(&mut self, name: &str) {
        if self.phase.phase() == Phase::Starting && self.roster.find_live(name).is_none() {
            self.outbox
                .push(Outbound::private(name, narration::forming_hint(name)));
        }
    }

    fn on_departure(&mut self, name: &str) {
        let Some(player) = self.roster.find(name) else {
            return;
        };
        if self.roster.is_live(player) {
            self.remove_participant(player);
        } else if self.phase.release_starter(player) {
            self.announce(narration::starter_left(name));
        }
    }

    fn on_rename(&mut self, old: &str, new: &str) {
        let Some(player) = self.roster.find(old) else {
            return;
        };
        match self.roster.rename(player, new) {
            Ok(()) => info!(old = %old, new = %new, "player renamed"),
            Err(error) => warn!(old = %old, new = %new, %error, "rename not applied"),
        }
    }

    /// Take a live participant out of the game, keeping every vote, target
    /// and the starter consistent, then re-check the current phase.
    fn remove_participant(&mut self, player: PlayerId) {
        let name = self.roster.name(player).to_string();
        if self.phase.release_starter(player) {
            self.announce(narration::starter_left(&name));
        }

        match self.phase.phase() {
            Phase::Starting => {
                self.roster.withdraw(player);
                info!(player = %name, "player withdrew");
                self.announce(narration::departed(&name));
                if self.roster.live_count() == 0 {
                    info!("forming game abandoned");
                    self.announce(narration::game_abandoned());
                    self.reset();
                }
            }
            Phase::Night | Phase::Day => {
                self.roster.depart(player);
                let released = self.votes.forget(player);
                info!(player = %name, phase = ?self.phase.phase(), "player departed");
                self.announce(narration::departed(&name));

                if released.seer_target
                    && let Some(seer) = self.roster.living_seer()
                {
                    self.tell(seer, narration::seer_released(&name));
                }
                if released.wolf_target {
                    self.tell_wolves(narration::wolves_released(&name));
                }

                if self.settle_winner() {
                    return;
                }
                if let Err(error) = self.advance_after_departure() {
                    warn!(%error, "phase did not advance after departure");
                }
            }
            Phase::None | Phase::Ended => {}
        }
    }

    fn advance_after_departure(&mut self) -> Result<(), EngineError> {
        match self.phase.phase() {
            Phase::Night => {
                let before = self.votes.wolf_target();
                if let WolfVote::Agreed(victim) = self.votes.settle_wolves(&self.roster)
                    && before != Some(victim)
                {
                    let victim = self.roster.name(victim).to_string();
                    self.tell_wolves(narration::wolf_agreed(&victim));
                }
                self.check_night()
            }
            Phase::Day => match self.votes.lynch_majority(&self.roster) {
                Some(victim) => self.resolve_lynch(victim),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    fn notify_roles(&mut self) {
        for player in self.roster.live().to_vec() {
            let Some(role) = self.roster.role_of(player) else {
                continue;
            };
            self.tell(player, narration::intro(role));
            if role == Role::Wolf {
                let partners: Vec<String> = self
                    .roster
                    .living_wolves()
                    .iter()
                    .filter(|wolf| **wolf != player)
                    .map(|wolf| self.roster.name(*wolf).to_string())
                    .collect();
                if !partners.is_empty() {
                    self.tell(player, narration::wolf_partner(&join_names(&partners)));
                }
            }
        }
    }

    fn enter_night(&mut self) -> Result<(), EngineError> {
        self.phase.begin_night()?;
        self.votes.clear();
        info!(
            round = self.phase.round(),
            living = self.roster.live_count(),
            "night falls"
        );
        self.announce(narration::night_falls(self.phase.round()));

        if let Some(seer) = self.roster.living_seer() {
            self.tell(seer, narration::seer_prompt());
        }
        self.tell_wolves(narration::wolf_prompt());
        Ok(())
    }

    /// End the night once the seer has looked (or is gone) and the pack agrees.
    fn check_night(&mut self) -> Result<(), EngineError> {
        let Some(victim) = self.votes.night_outcome(&self.roster) else {
            return Ok(());
        };

        let name = self.roster.name(victim).to_string();
        self.roster.kill(victim);
        info!(player = %name, round = self.phase.round(), "night kill");
        self.announce(narration::dawn(&name, self.roster.role_of(victim)));
        if self.settle_winner() {
            return Ok(());
        }
        self.release_dead_starter(victim);

        self.phase.begin_day()?;
        self.votes.clear();
        info!(round = self.phase.round(), "day breaks");
        self.announce(narration::day_begins(majority(self.roster.live_count())));
        Ok(())
    }

    fn resolve_lynch(&mut self, victim: PlayerId) -> Result<(), EngineError> {
        let name = self.roster.name(victim).to_string();
        self.roster.kill(victim);
        info!(player = %name, round = self.phase.round(), "lynched");
        self.announce(narration::lynched(&name, self.roster.role_of(victim)));
        if self.settle_winner() {
            return Ok(());
        }
        self.release_dead_starter(victim);
        self.enter_night()
    }

    /// Dead players can't use `end`, so a dead starter must not keep control.
    fn release_dead_starter(&mut self, victim: PlayerId) {
        if self.phase.release_starter(victim) {
            let name = self.roster.name(victim).to_string();
            info!(player = %name, "game-starter died; control is open");
            self.announce(narration::starter_died(&name));
        }
    }

    /// Close the game if someone has won. Returns whether it did.
    fn settle_winner(&mut self) -> bool {
        match win::evaluate(&self.roster) {
            Some(winner) => {
                self.close_game(Some(winner));
                true
            }
            None => false,
        }
    }

    fn close_game(&mut self, winner: Option<Winner>) {
        let was_running = self.phase.phase().is_running();
        self.phase.finish();
        match winner {
            Some(winner) => {
                info!(?winner, round = self.phase.round(), "game won");
                self.announce(narration::winners(winner));
            }
            None => info!(was_running, "game ended"),
        }
        self.announce(narration::game_ended());

        if was_running {
            let reveal = self.roster.assignment().map(|assignment| {
                narration::reveal(
                    &self.roster.names(assignment.wolves()),
                    self.roster.name(assignment.seer()),
                )
            });
            if let Some(reveal) = reveal {
                self.announce(reveal);
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.phase.reset();
        self.roster.clear();
        self.votes.clear();
    }

    fn status_lines(&self) -> Vec<String> {
        let snapshot = self.snapshot();
        let label = match snapshot.phase {
            Phase::None | Phase::Ended => return vec!["No game is in progress.".to_string()],
            Phase::Starting => "forming",
            Phase::Night => "night",
            Phase::Day => "day",
        };

        let mut lines = vec![format!("The game is {label}, round {}.", snapshot.round)];
        if let Some(starter) = &snapshot.starter {
            lines.push(format!("Started by {starter}."));
        }
        lines.push(format!("Living players: {}.", join_names(&snapshot.live)));
        if !snapshot.dead.is_empty() {
            lines.push(format!("Dead players: {}.", join_names(&snapshot.dead)));
        }
        if !snapshot.lynch_tally.is_empty() {
            let tally: Vec<String> = snapshot
                .lynch_tally
                .iter()
                .map(|entry| format!("{} ({})", entry.target, entry.votes))
                .collect();
            lines.push(format!(
                "Lynch votes: {}. {} needed.",
                tally.join(", "),
                majority(self.roster.live_count())
            ));
        }
        lines
    }

    fn vote_report(&self) -> Result<Vec<String>, EngineError> {
        match self.phase.phase() {
            Phase::Day => {}
            Phase::None => return Err(EngineError::NoGame),
            _ => return Err(EngineError::WrongPhase("day")),
        }

        let cast: Vec<String> = self
            .votes
            .lynch_votes()
            .filter(|(voter, target)| self.roster.is_live(*voter) && self.roster.is_live(*target))
            .map(|(voter, target)| {
                format!("{} for {}", self.roster.name(voter), self.roster.name(target))
            })
            .collect();
        let waiting: Vec<String> = self
            .roster
            .live()
            .iter()
            .filter(|player| !self.votes.has_lynch_vote(**player))
            .map(|player| self.roster.name(*player).to_string())
            .collect();

        Ok(vec![
            format!("Votes so far: {}.", join_names(&cast)),
            format!("Still to vote: {}.", join_names(&waiting)),
        ])
    }

    fn require_game(&self) -> Result<(), EngineError> {
        match self.phase.phase() {
            Phase::None => Err(EngineError::NoGame),
            _ => Ok(()),
        }
    }

    fn require_living(&self, actor: Option<PlayerId>) -> Result<PlayerId, EngineError> {
        self.require_game()?;
        actor
            .filter(|player| self.roster.is_live(*player))
            .ok_or(EngineError::NotPlaying)
    }

    fn require_control(&self, actor: Option<PlayerId>) -> Result<(), EngineError> {
        if self.phase.may_control(actor) {
            return Ok(());
        }
        let starter = self
            .phase
            .starter()
            .map_or("the game-starter", |starter| self.roster.name(starter));
        Err(EngineError::NotAuthorized(starter.to_string()))
    }

    fn announce(&mut self, text: impl Into<String>) {
        self.outbox.push(Outbound::public(text));
    }

    fn tell(&mut self, player: PlayerId, text: impl Into<String>) {
        let to = self.roster.name(player).to_string();
        self.outbox.push(Outbound::private(to, text));
    }

    fn tell_wolves(&mut self, text: impl Into<String>) {
        let text = text.into();
        for wolf in self.roster.living_wolves().to_vec() {
            self.tell(wolf, text.clone());
        }
    }

    fn respond(&mut self, reply: &Reply<'_>, text: impl Into<String>) {
        if reply.private {
            self.outbox.push(Outbound::private(reply.to, text));
        } else {
            self.announce(text);
        }
    }

    fn refuse(&mut self, reply: &Reply<'_>, error: EngineError) {
        debug!(player = %reply.to, %error, "command refused");
        let text = error.to_string();
        if error.is_public() {
            self.announce(text);
        } else if error.is_private_only() {
            self.outbox.push(Outbound::private(reply.to, text));
        } else {
            self.respond(reply, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const SIX: [&str; 6] = ["Ann", "Bob", "Cy", "Dee", "Eve", "Fay"];
    const SEVEN: [&str; 7] = ["Ann", "Bob", "Cy", "Dee", "Eve", "Fay", "Gus"];

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
    }

    fn say(session: &mut Session, from: &str, text: &str) -> Vec<Outbound> {
        session.handle(&ChatEvent::message(from, text), t0())
    }

    fn whisper(session: &mut Session, from: &str, text: &str) -> Vec<Outbound> {
        session.handle(&ChatEvent::private_message(from, text), t0())
    }

    fn forming(names: &[&str]) -> Session {
        let mut session = Session::new(GameRules::default(), 42);
        say(&mut session, names[0], "start");
        for name in &names[1..] {
            say(&mut session, name, "join");
        }
        session
    }

    fn started(names: &[&str]) -> Session {
        let mut session = forming(names);
        say(&mut session, names[0], "start");
        assert_eq!(session.phase(), Phase::Night);
        session
    }

    fn name_of(session: &Session, player: PlayerId) -> String {
        session.roster().name(player).to_string()
    }

    fn wolves(session: &Session) -> Vec<String> {
        session.roster().names(session.roster().living_wolves())
    }

    fn seer(session: &Session) -> String {
        name_of(session, session.roster().seer().unwrap())
    }

    fn living_villagers(session: &Session) -> Vec<String> {
        let roster = session.roster();
        roster
            .live()
            .iter()
            .filter(|player| roster.role_of(**player) == Some(Role::Villager))
            .map(|player| roster.name(*player).to_string())
            .collect()
    }

    fn public(out: &[Outbound]) -> Vec<&str> {
        out.iter()
            .filter_map(|message| match message {
                Outbound::Public { text } => Some(text.as_str()),
                Outbound::Private { .. } => None,
            })
            .collect()
    }

    fn private_to<'a>(out: &'a [Outbound], name: &str) -> Vec<&'a str> {
        out.iter()
            .filter_map(|message| match message {
                Outbound::Private { to, text } if to == name => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Seer looks at `victim` (if the seer still lives) and every living wolf
    /// votes to kill them.
    fn finish_night(session: &mut Session, victim: &str) -> Vec<Outbound> {
        let mut out = Vec::new();
        if session.roster().living_seer().is_some() {
            let seer = seer(session);
            out.extend(whisper(session, &seer, &format!("see {victim}")));
        }
        for wolf in wolves(session) {
            out.extend(whisper(session, &wolf, &format!("kill {victim}")));
        }
        out
    }

    /// Everyone else votes to lynch `target` until the day ends.
    fn lynch_out(session: &mut Session, target: &str) -> Vec<Outbound> {
        let voters: Vec<String> = session.snapshot().live;
        let mut out = Vec::new();
        for voter in voters.iter().filter(|voter| voter.as_str() != target) {
            out.extend(say(session, voter, &format!("lynch {target}")));
            if session.phase() != Phase::Day {
                break;
            }
        }
        out
    }

    #[test]
    fn dealing_partitions_every_joined_player() {
        let session = started(&SIX);
        let assignment = session.roster().assignment().unwrap();
        assert_eq!(assignment.wolves().len(), 2);
        assert_eq!(assignment.villagers().len(), 3);

        let mut everyone: Vec<PlayerId> = assignment.wolves().to_vec();
        everyone.push(assignment.seer());
        everyone.extend_from_slice(assignment.villagers());
        everyone.sort();
        everyone.dedup();
        assert_eq!(everyone.len(), 6);

        let mut names = session.roster().names(&everyone);
        names.sort();
        let mut joined: Vec<String> = SIX.iter().map(|name| name.to_string()).collect();
        joined.sort();
        assert_eq!(names, joined);
    }

    #[test]
    fn roles_and_partners_are_told_privately() {
        let mut session = forming(&SIX);
        let out = say(&mut session, "Ann", "start");

        let wolves = wolves(&session);
        let seer = seer(&session);
        assert!(private_to(&out, &seer).contains(&narration::SEER_INTRO));
        assert!(private_to(&out, &wolves[0]).contains(&narration::WOLF_INTRO));
        assert!(
            private_to(&out, &wolves[0])
                .iter()
                .any(|text| text.contains(wolves[1].as_str()))
        );
        for villager in living_villagers(&session) {
            assert!(private_to(&out, &villager).contains(&narration::VILLAGER_INTRO));
        }
        assert!(public(&out).contains(&narration::NEW_GAME_TEXT));
        assert!(public(&out).iter().all(|text| !text.contains("WEREWOLF")));
    }

    #[test]
    fn seer_sees_a_normal_villager() {
        let mut session = started(&SIX);
        let seer = seer(&session);
        let villager = living_villagers(&session)[0].clone();

        let out = whisper(&mut session, &seer, &format!("see {villager}"));
        let replies = private_to(&out, &seer);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("normal villager"));
        assert!(!replies[0].contains("WEREWOLF"));
        assert!(public(&out).is_empty());
    }

    #[test]
    fn too_few_players_is_announced_publicly() {
        let mut session = forming(&SIX[..4]);
        let out = whisper(&mut session, "Ann", "start");
        assert_eq!(
            public(&out),
            vec!["Sorry, at least 6 players are needed to start; only 4 have joined."]
        );
        assert_eq!(session.phase(), Phase::Starting);
    }

    #[test]
    fn only_the_starter_finalizes() {
        let mut session = forming(&SIX);
        let out = say(&mut session, "Bob", "start");
        assert_eq!(public(&out), vec!["Only Ann may do that right now."]);
        assert_eq!(session.phase(), Phase::Starting);
    }

    #[test]
    fn a_silent_starter_loses_control() {
        let mut session = Session::new(GameRules::default(), 3);
        session.handle(&ChatEvent::message("Ann", "start game"), t0());
        for (offset, name) in SIX[1..].iter().enumerate() {
            let at = t0() + Duration::seconds(10 * offset as i64);
            session.handle(&ChatEvent::message(name, "join"), at);
        }

        let early = t0() + Duration::seconds(100);
        session.handle(&ChatEvent::message("Bob", "start"), early);
        assert_eq!(session.phase(), Phase::Starting);

        let late = t0() + Duration::seconds(121);
        let out = session.handle(&ChatEvent::message("Bob", "start"), late);
        assert!(public(&out)[0].contains("Ann has gone quiet"));
        assert_eq!(session.phase(), Phase::Night);
        assert_eq!(session.starter(), None);
    }

    #[test]
    fn stats_never_changes_anything() {
        let mut session = started(&SEVEN);
        let victim = living_villagers(&session)[0].clone();
        finish_night(&mut session, &victim);
        assert_eq!(session.phase(), Phase::Day);
        let live = session.snapshot().live;
        say(&mut session, &live[0], &format!("lynch {}", live[1]));

        let before = session.snapshot();
        let votes_before: Vec<_> = session.votes().lynch_votes().collect();
        let first = say(&mut session, &live[2], "stats");
        let second = whisper(&mut session, &victim, "status");

        assert_eq!(session.snapshot(), before);
        assert_eq!(session.votes().lynch_votes().collect::<Vec<_>>(), votes_before);
        assert!(!first.is_empty());
        assert_eq!(second.len(), first.len());
        assert!(public(&first).iter().any(|line| line.contains("Lynch votes")));
    }

    #[test]
    fn night_resolves_only_when_the_pack_agrees() {
        let mut session = started(&SEVEN);
        let wolves = wolves(&session);
        let villagers = living_villagers(&session);
        let seer = seer(&session);
        whisper(&mut session, &seer, &format!("see {}", villagers[2]));

        whisper(&mut session, &wolves[0], &format!("kill {}", villagers[0]));
        let out = whisper(&mut session, &wolves[1], &format!("kill {}", villagers[1]));
        assert_eq!(session.phase(), Phase::Night);
        assert_eq!(
            private_to(&out, &wolves[0]),
            vec![narration::wolf_disagreement()]
        );

        let out = whisper(&mut session, &wolves[1], &format!("kill {}", villagers[0]));
        assert_eq!(session.phase(), Phase::Day);
        assert_eq!(session.round(), 1);
        assert!(
            public(&out)
                .iter()
                .any(|text| text.contains(&format!("remains of {}", villagers[0])))
        );
        assert_eq!(session.snapshot().dead, vec![villagers[0].clone()]);
    }

    #[test]
    fn public_night_actions_are_refused_privately() {
        let mut session = started(&SIX);
        let seer = seer(&session);
        let wolf = wolves(&session)[0].clone();
        let villager = living_villagers(&session)[0].clone();

        let out = say(&mut session, &seer, &format!("see {villager}"));
        assert_eq!(out, vec![Outbound::private(&seer, "Send 'see <name>' to me privately.")]);
        assert_eq!(session.votes().seer_target(), None);

        let out = say(&mut session, &wolf, &format!("kill {villager}"));
        assert!(public(&out).is_empty());
        assert_eq!(session.votes().wolf_votes().count(), 0);
    }

    #[test]
    fn lynch_needs_a_strict_majority_of_the_living() {
        let mut session = started(&SEVEN);
        let victim = living_villagers(&session)[0].clone();
        let out = finish_night(&mut session, &victim);
        assert!(public(&out).iter().any(|text| text.contains("4 votes are needed")));

        let target = living_villagers(&session)[0].clone();
        let voters: Vec<String> = session
            .snapshot()
            .live
            .into_iter()
            .filter(|name| *name != target)
            .collect();
        for voter in &voters[..3] {
            say(&mut session, voter, &format!("lynch {target}"));
        }
        assert_eq!(session.phase(), Phase::Day);

        // Changing a vote and changing it back never counts twice.
        let other = voters[4].clone();
        say(&mut session, &voters[0], &format!("lynch {other}"));
        say(&mut session, &voters[0], &format!("lynch {target}"));
        assert_eq!(
            session.snapshot().lynch_tally,
            vec![TallyEntry {
                target: target.clone(),
                votes: 3
            }]
        );

        let out = say(&mut session, &voters[3], &format!("lynch {target}"));
        assert!(public(&out).iter().any(|text| text.contains("lynched")));
        assert_eq!(session.phase(), Phase::Night);
        assert!(session.snapshot().dead.contains(&target));
    }

    #[test]
    fn lynching_both_wolves_wins_for_the_village() {
        let mut session = started(&SEVEN);
        let wolves = wolves(&session);
        let victim = living_villagers(&session)[0].clone();
        finish_night(&mut session, &victim);

        lynch_out(&mut session, &wolves[0]);
        assert_eq!(session.phase(), Phase::Night);

        let victim = living_villagers(&session)[0].clone();
        finish_night(&mut session, &victim);
        assert_eq!(session.phase(), Phase::Day);

        let out = lynch_out(&mut session, &wolves[1]);
        let said = public(&out);
        assert!(said.contains(&narration::winners(Winner::Villagers)));
        assert!(said.iter().any(|text| text.starts_with("The werewolves were")));
        assert_eq!(session.phase(), Phase::None);
        assert!(session.snapshot().live.is_empty());
    }

    #[test]
    fn wolves_win_once_they_match_the_rest() {
        let mut session = started(&SIX);
        let victim = living_villagers(&session)[0].clone();
        finish_night(&mut session, &victim);

        let target = living_villagers(&session)[0].clone();
        let out = lynch_out(&mut session, &target);
        assert!(public(&out).contains(&narration::winners(Winner::Wolves)));
        assert_eq!(session.phase(), Phase::None);
    }

    #[test]
    fn deleting_the_seers_target_lets_them_see_again() {
        let mut session = started(&SIX);
        let seer = seer(&session);
        let villager = living_villagers(&session)[0].clone();
        whisper(&mut session, &seer, &format!("see {villager}"));
        assert!(session.votes().seer_target().is_some());

        let del = ChatEvent::Message {
            from: "Op".to_string(),
            text: format!("del {villager}"),
            private: false,
            operator: true,
        };
        let out = session.handle(&del, t0());

        assert_eq!(session.votes().seer_target(), None);
        assert!(
            private_to(&out, &seer)
                .iter()
                .any(|text| text.contains("may see again"))
        );
        assert_eq!(session.phase(), Phase::Night);
        assert!(session.snapshot().dead.contains(&villager));
    }

    #[test]
    fn del_needs_privilege() {
        let mut session = started(&SIX);
        let out = say(&mut session, "Bob", "del Cy");
        assert_eq!(public(&out), vec!["Only Ann may do that right now."]);
        assert_eq!(session.roster().live_count(), 6);
    }

    #[test]
    fn renamed_player_keeps_votes_and_can_be_lynched() {
        let mut session = started(&SEVEN);
        let victim = living_villagers(&session)
            .into_iter()
            .find(|name| name != "Bob" && name != "Cy")
            .unwrap();
        finish_night(&mut session, &victim);
        assert_eq!(session.phase(), Phase::Day);

        say(&mut session, "Bob", "lynch Cy");
        let bob = session.roster().find("Bob").unwrap();
        let cy = session.roster().find("Cy").unwrap();

        let rename = ChatEvent::NickChange {
            old: "Bob".to_string(),
            new: "Bobby".to_string(),
        };
        session.handle(&rename, t0());

        assert_eq!(session.roster().name(bob), "Bobby");
        assert_eq!(session.votes().lynch_votes().collect::<Vec<_>>(), vec![(bob, cy)]);
        let out = say(&mut session, "Dee", "votes");
        assert!(public(&out)[0].contains("Bobby for Cy"));

        let out = say(&mut session, "Cy", "lynch Bobby");
        assert!(public(&out)[0].starts_with("Cy votes to lynch Bobby."));
        let out = say(&mut session, "Cy", "lynch bob");
        assert_eq!(public(&out), vec!["Nobody called 'bob' is in the game."]);
    }

    #[test]
    fn dead_players_may_only_ask() {
        let mut session = started(&SEVEN);
        let victim = living_villagers(&session)[0].clone();
        finish_night(&mut session, &victim);

        let target = session.snapshot().live[0].clone();
        let out = say(&mut session, &victim, &format!("lynch {target}"));
        assert_eq!(public(&out), vec![EngineError::DeadPlayer.to_string().as_str()]);
        assert!(session.votes().lynch_votes().next().is_none());

        let out = whisper(&mut session, &victim, "help");
        assert_eq!(private_to(&out, &victim).len(), COMMANDS.len());
    }

    #[test]
    fn a_wolf_leaving_can_finish_the_night() {
        let mut session = started(&SIX);
        let wolves = wolves(&session);
        let villager = living_villagers(&session)[0].clone();
        let seer = seer(&session);
        whisper(&mut session, &seer, &format!("see {villager}"));
        whisper(&mut session, &wolves[0], &format!("kill {villager}"));
        assert_eq!(session.phase(), Phase::Night);

        let out = session.handle(&ChatEvent::Quit { name: wolves[1].clone() }, t0());
        assert_eq!(
            private_to(&out, &wolves[0]),
            vec![narration::wolf_agreed(&villager).as_str()]
        );
        assert_eq!(session.phase(), Phase::Day);
        assert!(session.snapshot().dead.contains(&villager));
        assert!(public(&out).iter().any(|text| text.contains("has left the game")));
    }

    #[test]
    fn wolves_choose_again_when_their_victim_leaves() {
        let mut session = started(&SIX);
        let wolves = wolves(&session);
        let villager = living_villagers(&session)[0].clone();
        whisper(&mut session, &wolves[0], &format!("kill {villager}"));
        whisper(&mut session, &wolves[1], &format!("kill {villager}"));
        assert!(session.votes().wolf_target().is_some());

        let out = session.handle(&ChatEvent::Quit { name: villager.clone() }, t0());
        for wolf in &wolves {
            assert!(
                private_to(&out, wolf)
                    .iter()
                    .any(|text| text.contains("Choose another victim"))
            );
        }
        assert_eq!(session.votes().wolf_target(), None);
        assert_eq!(session.votes().wolf_votes().count(), 0);
        assert_eq!(session.phase(), Phase::Night);
    }

    #[test]
    fn a_dead_starter_does_not_lock_the_game() {
        let mut session = started(&SEVEN);
        let victim = living_villagers(&session)
            .into_iter()
            .find(|name| name != "Ann" && name != "Bob")
            .unwrap();
        finish_night(&mut session, &victim);
        assert_eq!(session.phase(), Phase::Day);

        let out = lynch_out(&mut session, "Ann");
        assert!(public(&out).contains(&narration::starter_died("Ann").as_str()));
        assert_eq!(session.phase(), Phase::Night);
        assert_eq!(session.starter(), None);

        let late = t0() + Duration::seconds(30);
        session.handle(&ChatEvent::message("Ann", "end"), late);
        assert_eq!(session.phase(), Phase::Night);
        let out = session.handle(&ChatEvent::message("Bob", "end"), late);
        assert!(public(&out).contains(&narration::game_ended()));
        assert_eq!(session.phase(), Phase::None);
        assert!(session.is_idle());
    }

    #[test]
    fn a_departure_can_complete_a_lynch() {
        let mut session = started(&SEVEN);
        let victim = living_villagers(&session)[0].clone();
        finish_night(&mut session, &victim);

        let target = living_villagers(&session)[0].clone();
        let mut voters: Vec<String> = session
            .snapshot()
            .live
            .into_iter()
            .filter(|name| *name != target)
            .collect();
        for voter in &voters[..3] {
            say(&mut session, voter, &format!("lynch {target}"));
        }
        assert_eq!(session.phase(), Phase::Day);

        // Six living need four; once a non-voter leaves, five need three.
        let leaver = voters.pop().unwrap();
        let out = session.handle(&ChatEvent::Parted { name: leaver }, t0());
        let lynched = format!("{target} is dragged away");
        assert!(public(&out).iter().any(|text| text.contains(&lynched)));
        assert_ne!(session.phase(), Phase::Day);
    }

    #[test]
    fn an_emptied_forming_game_is_abandoned() {
        let mut session = forming(&["Ann", "Bob"]);
        session.handle(&ChatEvent::Parted { name: "Ann".into() }, t0());
        assert_eq!(session.phase(), Phase::Starting);
        assert_eq!(session.starter(), None);

        let out = session.handle(&ChatEvent::Kicked { name: "Bob".into() }, t0());
        assert!(public(&out).contains(&narration::game_abandoned()));
        assert_eq!(session.phase(), Phase::None);
    }

    #[test]
    fn anyone_may_finalize_after_the_starter_leaves() {
        let mut session = forming(&SIX);
        session.handle(&ChatEvent::Quit { name: "Ann".into() }, t0());
        let out = say(&mut session, "Bob", "start");
        assert!(public(&out)[0].contains("only 5 have joined"));

        say(&mut session, "Gus", "join");
        say(&mut session, "Bob", "start");
        assert_eq!(session.phase(), Phase::Night);
    }

    #[test]
    fn ending_reveals_roles_only_once_running() {
        let mut session = forming(&SIX);
        let out = say(&mut session, "Ann", "end game");
        assert_eq!(public(&out), vec![narration::game_ended()]);
        assert_eq!(session.phase(), Phase::None);

        let mut session = started(&SIX);
        let wolves = wolves(&session);
        let out = say(&mut session, "Ann", "end");
        let said = public(&out);
        assert!(said.iter().any(|text| text.contains(&wolves[0]) && text.contains(&wolves[1])));
        assert_eq!(session.phase(), Phase::None);
    }

    #[test]
    fn replies_follow_the_arrival_channel() {
        let mut session = Session::new(GameRules::default(), 1);
        let out = whisper(&mut session, "Ann", "dance");
        assert_eq!(
            out,
            vec![Outbound::private(
                "Ann",
                "I don't understand 'dance'. Say 'help' for a list of commands."
            )]
        );
        let out = say(&mut session, "Ann", "join");
        assert_eq!(public(&out), vec![EngineError::NotForming.to_string().as_str()]);
    }

    #[test]
    fn newcomers_are_told_how_to_join() {
        let mut session = forming(&["Ann"]);
        let out = session.handle(&ChatEvent::Joined { name: "Zed".into() }, t0());
        assert_eq!(private_to(&out, "Zed").len(), 1);

        let out = session.handle(&ChatEvent::Joined { name: "Ann".into() }, t0());
        assert!(out.is_empty());
    }

    #[test]
    fn same_seed_deals_the_same_roles() {
        let first = started(&SEVEN);
        let second = started(&SEVEN);
        assert_eq!(wolves(&first), wolves(&second));
        assert_eq!(seer(&first), seer(&second));
    }
}
