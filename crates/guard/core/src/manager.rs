//! Attack scheduler and agent directory.
//!
//! The manager decides on a slow tick which agents may fire, meters grenade
//! use through a small cooldown queue, tracks the closest visible agent on a
//! short tick and summarizes the overall alert level.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;
use glam::Vec3;

use crate::agent::{Agent, AgentFlags};
use crate::common::{AgentId, Clock, Countdown};
use crate::config::ManagerConfig;
use crate::env::{RngOracle, SightOracle, compute_seed};
use crate::sensors::PlayerView;
use crate::zone::ZoneRegistry;

/// Overall alert severity, ordered from calm to hostile.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AlertLevel {
    #[default]
    Idle,
    Attention,
    Aggression,
}

/// Answer of [`Manager::ai_status`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AiStatus {
    pub level: AlertLevel,
    /// Highest remaining cooldown fraction among sources at `level`.
    pub cooldown: f32,
}

/// Runtime state of a [`Manager`], as carried by snapshots.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManagerRecord {
    /// Roster in its last sorted order, each with its fire permission.
    pub roster: Vec<(AgentId, bool)>,
    pub attack_order: Countdown,
    pub closest_check: Countdown,
    pub closest: Option<AgentId>,
    pub recomputations: u32,
    /// Grenade cooldowns still running.
    pub grenades: Vec<f32>,
}

#[derive(Clone, Debug)]
pub struct Manager {
    config: ManagerConfig,
    roster: Vec<AgentId>,
    /// Parallel to `roster`.
    may_fire: Vec<bool>,
    grenades: ArrayVec<f32, { ManagerConfig::MAX_GRENADE_SLOTS }>,
    attack_order: Countdown,
    closest_check: Countdown,
    closest: Option<AgentId>,
    recomputations: u32,
}

impl Manager {
    const ROLL_SUBJECT: u32 = u32::MAX;

    pub fn new(config: ManagerConfig) -> Self {
        Self {
            attack_order: Countdown::expired(config.attack_order_interval),
            closest_check: Countdown::expired(config.closest_check_interval),
            config,
            roster: Vec::new(),
            may_fire: Vec::new(),
            grenades: ArrayVec::new(),
            closest: None,
            recomputations: 0,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn roster(&self) -> &[AgentId] {
        &self.roster
    }

    pub fn register(&mut self, agent: AgentId) {
        if !self.roster.contains(&agent) {
            self.roster.push(agent);
            self.may_fire.push(false);
        }
    }

    pub fn unregister(&mut self, agent: AgentId) {
        if let Some(index) = self.roster.iter().position(|member| *member == agent) {
            self.roster.remove(index);
            self.may_fire.remove(index);
        }
        if self.closest == Some(agent) {
            self.closest = None;
        }
    }

    pub fn can_fire(&self, agent: AgentId) -> bool {
        self.roster
            .iter()
            .position(|member| *member == agent)
            .is_some_and(|index| self.may_fire[index])
    }

    /// Number of agents currently holding fire permission.
    pub fn permitted(&self) -> usize {
        self.may_fire.iter().filter(|granted| **granted).count()
    }

    pub fn closest(&self) -> Option<AgentId> {
        self.closest
    }

    /// Forces the next tick to recompute fire permission.
    pub fn request_attack_order(&mut self) {
        self.attack_order = Countdown::expired(self.config.attack_order_interval);
    }

    /// Advances the grenade queue and both periodic checks.
    pub fn tick(
        &mut self,
        clock: &Clock,
        agents: &BTreeMap<AgentId, Agent>,
        player: &PlayerView,
        sight: &dyn SightOracle,
        rng: &dyn RngOracle,
        sim_seed: u64,
    ) {
        let dt = clock.dt;
        self.tick_grenades(dt);

        if self.attack_order.tick(dt) {
            let seed = compute_seed(sim_seed, clock.frame, Self::ROLL_SUBJECT, self.recomputations);
            self.recompute_attack_order(agents, player.position, rng, seed);
            self.attack_order.reset();
        }

        if self.closest_check.tick(dt) {
            self.check_for_closest(agents, player, sight);
            self.closest_check.reset();
        }
    }

    fn sort_by_distance(&mut self, agents: &BTreeMap<AgentId, Agent>, target: Vec3) {
        let mut ranked: Vec<(f32, AgentId, bool)> = self
            .roster
            .iter()
            .zip(&self.may_fire)
            .map(|(id, granted)| {
                let distance = agents
                    .get(id)
                    .map_or(f32::INFINITY, |agent| agent.body.position.distance(target));
                (distance, *id, *granted)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        self.roster = ranked.iter().map(|(_, id, _)| *id).collect();
        self.may_fire = ranked.iter().map(|(_, _, granted)| *granted).collect();
    }

    /// Re-sorts by distance to `target` and regrants fire permission.
    ///
    /// The closest `closest_bot_attacking` eligible agents always fire; the
    /// following ones up to `max_bots_attacking` fire by chance; agents
    /// flagged to ignore the attack order always fire.
    pub fn recompute_attack_order(
        &mut self,
        agents: &BTreeMap<AgentId, Agent>,
        target: Vec3,
        rng: &dyn RngOracle,
        seed: u64,
    ) {
        self.sort_by_distance(agents, target);
        self.recomputations = self.recomputations.wrapping_add(1);

        let mut rank = 0usize;
        for (index, id) in self.roster.iter().enumerate() {
            let Some(agent) = agents.get(id).filter(|agent| agent.is_alive()) else {
                self.may_fire[index] = false;
                continue;
            };
            if agent.flags.contains(AgentFlags::IGNORE_ATTACK_ORDER) {
                self.may_fire[index] = true;
                continue;
            }
            if !agent.is_active() || !agent.flags.contains(AgentFlags::CAN_ATTACK) {
                self.may_fire[index] = false;
                continue;
            }

            let granted = if rank < self.config.closest_bot_attacking {
                true
            } else if rank < self.config.max_bots_attacking {
                rng.chance(seed ^ (index as u64 + 1), self.config.overflow_attack_chance)
            } else {
                false
            };
            self.may_fire[index] = granted;
            rank += 1;
        }

        tracing::debug!(
            permitted = self.permitted(),
            eligible = rank,
            "attack order recomputed"
        );
    }

    /// Finds the nearest agent with an unoccluded line from the player's head.
    pub fn check_for_closest(
        &mut self,
        agents: &BTreeMap<AgentId, Agent>,
        player: &PlayerView,
        sight: &dyn SightOracle,
    ) -> Option<AgentId> {
        self.sort_by_distance(agents, player.position);
        let head = player.head();
        self.closest = self.roster.iter().copied().find(|id| {
            agents
                .get(id)
                .is_some_and(|agent| agent.is_active() && sight.is_clear(head, agent.eye()))
        });
        self.closest
    }

    pub fn can_throw(&self) -> bool {
        self.grenades.len() < self.config.grenade_slots()
    }

    /// Occupies a grenade cooldown slot; returns false when none is free.
    pub fn throw(&mut self) -> bool {
        if !self.can_throw() {
            return false;
        }
        self.grenades.push(self.config.grenade_cooldown);
        true
    }

    pub fn tick_grenades(&mut self, dt: f32) {
        for remaining in self.grenades.iter_mut() {
            *remaining -= dt;
        }
        self.grenades.retain(|remaining| *remaining > Countdown::EPSILON);
    }

    pub fn grenade_cooldowns(&self) -> &[f32] {
        &self.grenades
    }

    pub fn record(&self) -> ManagerRecord {
        ManagerRecord {
            roster: self
                .roster
                .iter()
                .copied()
                .zip(self.may_fire.iter().copied())
                .collect(),
            attack_order: self.attack_order,
            closest_check: self.closest_check,
            closest: self.closest,
            recomputations: self.recomputations,
            grenades: self.grenades.to_vec(),
        }
    }

    /// Replaces all runtime state with `record`.
    ///
    /// Roster entries for agents missing from `agents` are dropped and agents
    /// the record does not list are appended without fire permission.
    pub(crate) fn restore_record(
        &mut self,
        record: ManagerRecord,
        agents: &BTreeMap<AgentId, Agent>,
    ) {
        self.roster.clear();
        self.may_fire.clear();
        for (id, granted) in record.roster {
            if agents.contains_key(&id) && !self.roster.contains(&id) {
                self.roster.push(id);
                self.may_fire.push(granted);
            }
        }
        for id in agents.keys() {
            self.register(*id);
        }

        self.attack_order = record.attack_order;
        self.closest_check = record.closest_check;
        self.closest = record.closest.filter(|id| agents.contains_key(id));
        self.recomputations = record.recomputations;
        self.grenades.clear();
        for cooldown in record.grenades.iter().take(self.config.grenade_slots()) {
            self.grenades.push(*cooldown);
        }
    }

    /// Maximum alert level across agents and zone alarms.
    ///
    /// Cover counts as Aggression. The cooldown is the largest remaining
    /// fraction reported by any source at the winning level.
    pub fn ai_status(&self, agents: &BTreeMap<AgentId, Agent>, zones: &ZoneRegistry) -> AiStatus {
        let mut status = AiStatus::default();
        let mut merge = |level: AlertLevel, cooldown: f32| {
            if level > status.level {
                status = AiStatus { level, cooldown };
            } else if level == status.level {
                status.cooldown = status.cooldown.max(cooldown);
            }
        };

        for agent in agents.values().filter(|agent| agent.is_active()) {
            merge(
                agent.state().alert_level(),
                agent.state().cooldown_ratio().unwrap_or(0.0),
            );
        }
        for zone in zones.iter().filter(|zone| zone.is_aggression()) {
            merge(AlertLevel::Aggression, zone.alarm());
        }
        status
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::agent::{AgentSpawn, AgentState, AttentionState, CoverState};
    use crate::common::CoverId;
    use crate::config::AiConfig;
    use crate::env::{OpenField, PcgRng};
    use crate::zone::ZoneBounds;

    fn roster(count: u32) -> (Manager, BTreeMap<AgentId, Agent>) {
        let mut manager = Manager::default();
        let mut agents = BTreeMap::new();
        for i in 0..count {
            let id = AgentId(i);
            let spawn = AgentSpawn::at(Vec3::new(0.0, 0.0, (count - i) as f32 * 3.0));
            agents.insert(id, Agent::new(id, &spawn, AiConfig::default()));
            manager.register(id);
        }
        (manager, agents)
    }

    #[test]
    fn closest_agents_always_fire() {
        let (mut manager, agents) = roster(8);
        for seed in 0..32 {
            manager.recompute_attack_order(&agents, Vec3::ZERO, &PcgRng, seed);
            let granted = manager.permitted();
            assert!(granted >= 2, "seed {seed}: only {granted} granted");
            assert!(granted <= 4, "seed {seed}: {granted} granted");
            // Highest ids spawned closest to the origin.
            assert!(manager.can_fire(AgentId(7)));
            assert!(manager.can_fire(AgentId(6)));
            assert!(!manager.can_fire(AgentId(0)));
        }
    }

    #[test]
    fn ineligible_agents_are_skipped_but_ignore_flag_wins() {
        let (mut manager, mut agents) = roster(4);
        agents.get_mut(&AgentId(3)).unwrap().flags.remove(AgentFlags::CAN_ATTACK);
        agents.get_mut(&AgentId(0)).unwrap().flags.insert(AgentFlags::IGNORE_ATTACK_ORDER);

        manager.recompute_attack_order(&agents, Vec3::ZERO, &PcgRng, 1);
        assert!(!manager.can_fire(AgentId(3)));
        assert!(manager.can_fire(AgentId(2)));
        assert!(manager.can_fire(AgentId(1)));
        assert!(manager.can_fire(AgentId(0)));
    }

    #[test]
    fn fewer_eligible_than_k_all_fire() {
        let (mut manager, agents) = roster(1);
        manager.recompute_attack_order(&agents, Vec3::ZERO, &PcgRng, 5);
        assert_eq!(manager.permitted(), 1);
    }

    #[test]
    fn grenade_slots_refill_after_cooldown() {
        let mut manager = Manager::default();
        assert!(manager.throw());
        assert!(manager.throw());
        assert!(!manager.can_throw());
        assert!(!manager.throw());

        manager.tick_grenades(9.0);
        assert!(!manager.can_throw());
        manager.tick_grenades(1.0);
        assert!(manager.can_throw());
        assert!(manager.grenade_cooldowns().is_empty());
    }

    #[test]
    fn record_restores_order_permissions_and_timers() {
        let (mut manager, agents) = roster(5);
        let player = PlayerView::standing(Vec3::ZERO);
        let mut clock = Clock::default();
        clock.advance(0.1);
        manager.tick(&clock, &agents, &player, &OpenField, &PcgRng, 3);
        manager.throw();
        let record = manager.record();

        let mut fresh = Manager::default();
        fresh.restore_record(record.clone(), &agents);
        assert_eq!(fresh.record(), record);
        for id in agents.keys() {
            assert_eq!(fresh.can_fire(*id), manager.can_fire(*id));
        }
        assert_eq!(fresh.closest(), manager.closest());
        assert!(!fresh.grenade_cooldowns().is_empty());
    }

    #[test]
    fn record_drops_unknown_roster_entries() {
        let (mut manager, agents) = roster(2);
        manager.recompute_attack_order(&agents, Vec3::ZERO, &PcgRng, 0);
        let mut record = manager.record();
        record.roster.push((AgentId(40), true));
        record.roster.retain(|(id, _)| *id != AgentId(0));

        let mut fresh = Manager::default();
        fresh.restore_record(record, &agents);
        assert_eq!(fresh.roster(), &[AgentId(1), AgentId(0)]);
        assert!(fresh.can_fire(AgentId(1)));
        assert!(!fresh.can_fire(AgentId(0)));
    }

    #[test]
    fn closest_visible_agent() {
        let (mut manager, agents) = roster(3);
        let player = PlayerView::standing(Vec3::ZERO);
        assert_eq!(manager.check_for_closest(&agents, &player, &OpenField), Some(AgentId(2)));
    }

    #[test]
    fn first_tick_recomputes_immediately() {
        let (mut manager, agents) = roster(3);
        let player = PlayerView::standing(Vec3::ZERO);
        let mut clock = Clock::default();
        clock.advance(0.1);
        manager.tick(&clock, &agents, &player, &OpenField, &PcgRng, 0);
        assert!(manager.permitted() >= 2);
        assert_eq!(manager.closest(), Some(AgentId(2)));
    }

    #[test]
    fn cover_counts_as_aggression() {
        let (manager, mut agents) = roster(2);
        if let Some(agent) = agents.get_mut(&AgentId(1)) {
            agent.state = AgentState::Cover(CoverState::new(CoverId(0)));
        }
        let status = manager.ai_status(&agents, &ZoneRegistry::new());
        assert_eq!(status.level, AlertLevel::Aggression);
        // Still running to the slot: the full stay is ahead.
        assert_eq!(status.cooldown, 1.0);
    }

    #[test]
    fn zone_alarm_raises_status_with_its_cooldown() {
        let (manager, mut agents) = roster(2);
        if let Some(agent) = agents.get_mut(&AgentId(0)) {
            agent.state = AgentState::Attention(AttentionState::new());
        }
        let mut zones = ZoneRegistry::new();
        let calm = zones.add("calm", ZoneBounds::rect(Vec2::ZERO, Vec2::ONE, 0.0, 1.0));
        let alarmed = zones.add("alarmed", ZoneBounds::rect(Vec2::ZERO, Vec2::ONE, 0.0, 1.0));

        let status = manager.ai_status(&agents, &zones);
        assert_eq!(status.level, AlertLevel::Attention);

        zones.get_mut(alarmed).unwrap().set_alarm(0.4);
        let status = manager.ai_status(&agents, &zones);
        assert_eq!(status.level, AlertLevel::Aggression);
        assert_eq!(status.cooldown, 0.4);

        zones.get_mut(calm).unwrap().set_alarm(0.7);
        assert_eq!(manager.ai_status(&agents, &zones).cooldown, 0.7);
    }
}
