use glam::{Vec2, Vec3};
use guard_core::{
    AgentCommand, AgentId, AgentSpawn, AgentState, AiConfig, AlertLevel, Damage, Env,
    LinkTraversal, MarkerKind, OpenField, PathNode, PcgRng, PlayerView, SimConfig, SimEvent,
    Simulation, SoundStimulus, StateKind, WrapMode, ZoneBounds, ZoneId,
};

const DT: f32 = 0.25;

/// A player standing far behind every agent spawned facing +Z.
fn out_of_sight() -> PlayerView {
    PlayerView::standing(Vec3::new(0.0, 0.0, -40.0))
}

fn yard(sim: &mut Simulation) -> ZoneId {
    sim.add_zone(
        "yard",
        ZoneBounds::rect(Vec2::splat(-30.0), Vec2::splat(30.0), -1.0, 5.0),
    )
}

/// Teleports agents onto their movement targets, like an instant host.
fn apply_moves(sim: &mut Simulation) -> Vec<AgentCommand> {
    let commands = sim.drain_commands();
    for command in &commands {
        if let AgentCommand::MoveTo { agent, point, .. }
        | AgentCommand::ForceMoveTo { agent, point, .. }
        | AgentCommand::Warp { agent, point } = *command
        {
            if let Some(agent) = sim.agent_mut(agent) {
                agent.body.position = point;
            }
        }
    }
    commands
}

#[test]
fn idle_agent_spots_visible_player_after_one_second() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.set_player(PlayerView::standing(Vec3::new(0.0, 0.0, 5.0)));

    for _ in 0..3 {
        sim.tick(&env, DT).unwrap();
        assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Idle);
    }
    sim.tick(&env, DT).unwrap();
    let agent = sim.agent(id).unwrap();
    assert_eq!(agent.state_kind(), StateKind::Attention);
    assert_eq!(agent.last_seen_player, Some(Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn attention_relaxes_after_wait_time_without_stimuli() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.set_player(out_of_sight());

    sim.emit_sound(&env, SoundStimulus::loud(Vec3::new(4.0, 0.0, 0.0)))
        .unwrap();
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Attention);

    let wait = sim.config().agent.attention_wait_time;
    let ticks = (wait / DT) as usize;
    for _ in 0..ticks - 1 {
        sim.tick(&env, DT).unwrap();
    }
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Attention);
    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Idle);
}

#[test]
fn sleeper_wakes_when_another_agent_is_close() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    yard(&mut sim);
    sim.set_player(out_of_sight());
    let sleeper = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.spawn_agent(AgentSpawn::at(Vec3::new(0.8, 0.0, 0.0)))
        .unwrap();

    sim.apply_damage(&env, sleeper, Damage::tranquilizer(Vec3::ZERO))
        .unwrap();
    assert_eq!(sim.agent(sleeper).unwrap().state_kind(), StateKind::Sleep);

    // The near check runs every half second.
    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(sleeper).unwrap().state_kind(), StateKind::Sleep);
    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(sleeper).unwrap().state_kind(), StateKind::Idle);
    assert!(
        sim.drain_events()
            .contains(&SimEvent::WokeUp { agent: sleeper })
    );
}

#[test]
fn sleeper_ignores_sounds() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    let sleeper = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.apply_damage(&env, sleeper, Damage::tranquilizer(Vec3::ZERO))
        .unwrap();

    sim.emit_sound(&env, SoundStimulus::loud(Vec3::new(1.0, 0.0, 0.0)))
        .unwrap();
    assert_eq!(sim.agent(sleeper).unwrap().state_kind(), StateKind::Sleep);
}

#[test]
fn cover_slot_is_never_shared() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.cover_chance = 100;
    let mut sim = Simulation::new(config);
    sim.set_player(out_of_sight());
    let slot = sim.add_cover(Vec3::new(0.0, 0.0, -5.0), 0, (2.0, 4.0));
    let a = sim.spawn_agent(AgentSpawn::at(Vec3::new(0.0, 0.0, 5.0))).unwrap();
    let b = sim.spawn_agent(AgentSpawn::at(Vec3::new(3.0, 0.0, 5.0))).unwrap();

    // Wounds make both agents fight toward the shooter at the origin.
    for id in [a, b] {
        sim.apply_damage(&env, id, Damage::bullet(0.1, Vec3::ZERO))
            .unwrap();
    }
    for _ in 0..4 {
        sim.tick(&env, DT).unwrap();
    }

    let in_cover: Vec<AgentId> = sim
        .agents()
        .filter(|agent| agent.state_kind() == StateKind::Cover)
        .map(|agent| agent.id)
        .collect();
    assert_eq!(in_cover, vec![a]);
    assert!(sim.world().covers.get(slot).unwrap().is_taken());
    assert_eq!(sim.agent(b).unwrap().state_kind(), StateKind::Aggression);
}

#[test]
fn delayed_melee_lands_when_player_stays_in_reach() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.cover_chance = 0;
    let mut sim = Simulation::new(config);
    let player = Vec3::new(0.0, 0.0, 1.0);
    sim.set_player(PlayerView::standing(player));
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.apply_damage(&env, id, Damage::bullet(0.1, player)).unwrap();
    sim.drain_events();

    // Swing scheduled on the first tick, due after the wind-up.
    sim.tick(&env, DT).unwrap();
    sim.tick(&env, DT).unwrap();
    assert!(sim.drain_events().iter().all(|event| !matches!(event, SimEvent::PlayerStruck { .. })));
    sim.tick(&env, DT).unwrap();

    let damage = sim.config().agent.melee_damage;
    assert!(
        sim.drain_events()
            .contains(&SimEvent::PlayerStruck { agent: id, damage })
    );
    assert!(
        sim.drain_commands()
            .iter()
            .any(|command| matches!(command, AgentCommand::Melee { agent, .. } if *agent == id))
    );
}

#[test]
fn patrol_visits_nodes_in_order() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    sim.set_player(out_of_sight());
    let first = Vec3::new(4.0, 0.0, 0.0);
    let second = Vec3::new(4.0, 0.0, 6.0);
    let path = sim.add_path(
        "rounds",
        vec![
            PathNode::new(first, Vec3::X, 0.5),
            PathNode::new(second, Vec3::Z, 0.5),
        ],
        WrapMode::Loop,
    );
    let id = sim
        .spawn_agent(AgentSpawn::at(Vec3::ZERO).patrolling(path))
        .unwrap();

    let mut targets = Vec::new();
    for _ in 0..10 {
        sim.tick(&env, DT).unwrap();
        for command in apply_moves(&mut sim) {
            if let AgentCommand::MoveTo { agent, point, .. } = command {
                if agent == id {
                    targets.push(point);
                }
            }
        }
    }
    assert!(targets.len() >= 3);
    assert_eq!(&targets[..3], &[first, second, first]);
}

#[test]
fn restored_snapshot_continues_like_the_original() {
    fn level() -> Simulation {
        let mut sim = Simulation::new(SimConfig::with_seed(99));
        yard(&mut sim);
        sim.add_cover(Vec3::new(-4.0, 0.0, 12.0), 0, (1.0, 3.0));
        sim
    }

    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut original = level();
    original.set_player(PlayerView::standing(Vec3::new(0.0, 0.0, 6.0)));
    let fighter = original.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    original
        .spawn_agent(AgentSpawn::at(Vec3::new(10.0, 0.0, 0.0)).with_config(AiConfig::default()))
        .unwrap();
    original
        .apply_damage(&env, fighter, Damage::bullet(0.3, Vec3::new(0.0, 0.0, 6.0)))
        .unwrap();
    for _ in 0..3 {
        original.tick(&env, DT).unwrap();
    }

    let snapshot = original.snapshot();
    let mut restored = level();
    restored.restore(snapshot.clone()).unwrap();
    assert_eq!(restored.snapshot(), snapshot);

    for _ in 0..6 {
        original.tick(&env, DT).unwrap();
        restored.tick(&env, DT).unwrap();
    }
    for agent in original.agents() {
        let twin = restored.agent(agent.id).unwrap();
        assert_eq!(twin.state(), agent.state());
        assert_eq!(twin.destination(), agent.destination());
        assert_eq!(twin.last_seen_player, agent.last_seen_player);
        assert_eq!(restored.can_fire(agent.id), original.can_fire(agent.id));
    }
    assert!(matches!(
        restored.agent(fighter).unwrap().state(),
        AgentState::Aggression(_) | AgentState::Cover(_)
    ));
}

#[test]
fn restored_snapshot_keeps_fire_permissions_in_step() {
    fn level() -> Simulation {
        let mut config = SimConfig::with_seed(5);
        config.manager.closest_bot_attacking = 1;
        config.manager.max_bots_attacking = 5;
        config.manager.overflow_attack_chance = 50;
        config.manager.attack_order_interval = 1.0;
        Simulation::new(config)
    }

    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut original = level();
    original.set_player(out_of_sight());
    let ids: Vec<AgentId> = (0..6)
        .map(|i| {
            original
                .spawn_agent(AgentSpawn::at(Vec3::new(i as f32 * 2.0, 0.0, 0.0)))
                .unwrap()
        })
        .collect();
    for _ in 0..7 {
        original.tick(&env, DT).unwrap();
    }

    let mut restored = level();
    restored.restore(original.snapshot()).unwrap();
    for frame in 0..40 {
        for id in &ids {
            assert_eq!(
                restored.can_fire(*id),
                original.can_fire(*id),
                "agent {id} diverged after {frame} ticks"
            );
        }
        original.tick(&env, DT).unwrap();
        restored.tick(&env, DT).unwrap();
    }
}

fn throws(commands: &[AgentCommand]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, AgentCommand::ThrowGrenade { .. }))
        .count()
}

#[test]
fn rope_climb_resumes_interrupted_state_and_walks_to_exit() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    sim.set_player(out_of_sight());
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.emit_sound(&env, SoundStimulus::loud(Vec3::new(4.0, 0.0, 0.0)))
        .unwrap();
    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Attention);
    sim.drain_events();
    sim.drain_commands();

    let exit = Vec3::new(0.0, 3.0, 2.0);
    let rope = LinkTraversal::rope(0.8, Some(exit));
    sim.agent_mut(id).unwrap().body.link = Some(rope);
    sim.tick(&env, DT).unwrap();

    match sim.agent(id).unwrap().state() {
        AgentState::Climb(climb) => assert_eq!(climb.resume_kind(), StateKind::Attention),
        other => panic!("expected a climb, got {other:?}"),
    }
    assert!(sim.drain_events().contains(&SimEvent::RopeStarted { agent: id }));
    assert!(
        sim.drain_commands()
            .contains(&AgentCommand::SetSpeed { agent: id, speed: 0.8 })
    );
    // A climbing agent reports the severity it was at before the rope.
    assert_eq!(sim.ai_status().level, AlertLevel::Attention);

    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Climb);

    sim.agent_mut(id).unwrap().body.link = Some(LinkTraversal {
        finished: true,
        ..rope
    });
    sim.tick(&env, DT).unwrap();
    let agent = sim.agent(id).unwrap();
    assert_eq!(agent.state_kind(), StateKind::Attention);
    assert_eq!(agent.destination(), Some(exit));
    assert!(sim.drain_commands().contains(&AgentCommand::ForceMoveTo {
        agent: id,
        point: exit,
        face: None,
    }));
}

#[test]
fn fear_marker_holds_patrol_until_fear_expires() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.fear_time = 2.0;
    let mut sim = Simulation::new(config);
    sim.set_player(out_of_sight());
    let node = Vec3::new(4.0, 0.0, 0.0);
    let path = sim.add_path(
        "rounds",
        vec![PathNode::new(node, Vec3::Z, 1.0)],
        WrapMode::Loop,
    );
    sim.add_marker(MarkerKind::Fear, Vec3::new(0.0, 0.5, 5.0), None);
    let id = sim
        .spawn_agent(AgentSpawn::at(Vec3::ZERO).patrolling(path))
        .unwrap();

    let walks_to_node = |commands: &[AgentCommand]| {
        commands.iter().any(
            |command| matches!(command, AgentCommand::MoveTo { point, .. } if *point == node),
        )
    };

    for _ in 0..7 {
        sim.tick(&env, DT).unwrap();
        assert!(sim.agent(id).unwrap().in_fear());
        assert!(!walks_to_node(&apply_moves(&mut sim)));
    }
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Idle);

    // Fear runs out on the ninth tick and patrol picks up in the same update.
    sim.tick(&env, DT).unwrap();
    assert!(!walks_to_node(&apply_moves(&mut sim)));
    sim.tick(&env, DT).unwrap();
    assert!(!sim.agent(id).unwrap().in_fear());
    assert!(walks_to_node(&apply_moves(&mut sim)));
}

#[test]
fn fear_marker_in_view_scares_only_once() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.fear_time = 1.0;
    let mut sim = Simulation::new(config);
    sim.set_player(out_of_sight());
    let marker = sim.add_marker(MarkerKind::Fear, Vec3::new(0.0, 0.5, 5.0), None);
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();

    sim.tick(&env, DT).unwrap();
    assert!(sim.agent(id).unwrap().in_fear());
    assert_eq!(sim.agent(id).unwrap().fear_source, Some(marker));

    for _ in 0..4 {
        sim.tick(&env, DT).unwrap();
    }
    for _ in 0..20 {
        assert!(!sim.agent(id).unwrap().in_fear());
        sim.tick(&env, DT).unwrap();
    }

    // Out of view once, the same marker can scare again.
    sim.set_marker_active(marker, false).unwrap();
    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(id).unwrap().fear_source, None);
    sim.set_marker_active(marker, true).unwrap();
    sim.tick(&env, DT).unwrap();
    assert!(sim.agent(id).unwrap().in_fear());
}

#[test]
fn attention_marker_is_consumed_and_alerts_neighbours() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    yard(&mut sim);
    sim.set_player(out_of_sight());
    let spot = Vec3::new(0.0, 0.5, 6.0);
    let marker = sim.add_marker(MarkerKind::Attention, spot, None);
    let finder = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    // Facing away from the marker, close enough to be alerted.
    let neighbour = sim
        .spawn_agent(AgentSpawn::at(Vec3::new(3.0, 0.0, 0.0)).facing(-Vec3::Z))
        .unwrap();

    sim.tick(&env, DT).unwrap();

    assert!(!sim.world().markers.get(marker).unwrap().active);
    assert!(
        sim.drain_events()
            .contains(&SimEvent::MarkerConsumed { agent: finder, marker })
    );
    let finder = sim.agent(finder).unwrap();
    assert_eq!(finder.state_kind(), StateKind::Attention);
    assert_eq!(finder.last_seen_player, Some(spot));
    let neighbour = sim.agent(neighbour).unwrap();
    assert_eq!(neighbour.state_kind(), StateKind::Attention);
    assert_eq!(neighbour.last_seen_player, Some(spot));
}

#[test]
fn inner_band_dwell_escalates_the_whole_zone() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.cover_chance = 0;
    let mut sim = Simulation::new(config);
    let zone = yard(&mut sim);
    sim.set_player(PlayerView::standing(Vec3::new(0.0, 0.0, 8.0)));
    let watcher = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    // Too far for radius propagation and facing away from the player.
    let distant = sim
        .spawn_agent(AgentSpawn::at(Vec3::new(20.0, 0.0, -20.0)).facing(-Vec3::Z))
        .unwrap();

    for _ in 0..4 {
        sim.tick(&env, DT).unwrap();
    }
    assert_eq!(sim.agent(watcher).unwrap().state_kind(), StateKind::Attention);
    assert_eq!(sim.agent(distant).unwrap().state_kind(), StateKind::Idle);

    // Escalation needs 1.5 s of continuous Inner-band sighting.
    for _ in 0..5 {
        sim.tick(&env, DT).unwrap();
    }
    assert_eq!(sim.agent(watcher).unwrap().state_kind(), StateKind::Attention);
    assert_eq!(sim.agent(distant).unwrap().state_kind(), StateKind::Idle);

    sim.tick(&env, DT).unwrap();
    assert_eq!(sim.agent(watcher).unwrap().state_kind(), StateKind::Aggression);
    assert_eq!(sim.agent(distant).unwrap().state_kind(), StateKind::Aggression);
    assert!(sim.zone(zone).unwrap().is_aggression());
    assert_eq!(sim.ai_status().level, AlertLevel::Aggression);
}

#[test]
fn grenades_wait_for_a_free_cooldown_slot() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.cover_chance = 0;
    config.agent.grenade_chance = 100;
    let capacity = config.manager.grenade_slots();
    let cooldown = config.manager.grenade_cooldown;
    let mut sim = Simulation::new(config);
    let player = Vec3::new(0.0, 0.0, 10.0);
    sim.set_player(PlayerView::standing(player));
    let id = sim
        .spawn_agent(AgentSpawn {
            throws_grenades: true,
            ..AgentSpawn::at(Vec3::ZERO)
        })
        .unwrap();
    sim.apply_damage(&env, id, Damage::bullet(0.1, player)).unwrap();
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Aggression);
    sim.drain_commands();

    let mut thrown = 0;
    for _ in 0..capacity + 1 {
        sim.tick(&env, DT).unwrap();
        thrown += throws(&sim.drain_commands());
    }
    assert_eq!(thrown, capacity);
    assert!(!sim.can_throw());

    // The first slot frees once its cooldown has fully elapsed.
    let wait = (cooldown / DT) as usize;
    let mut frames = 0;
    while throws(&sim.drain_commands()) == 0 {
        sim.tick(&env, DT).unwrap();
        frames += 1;
        assert!(frames <= wait, "no grenade after the cooldown");
    }
    assert!(frames >= wait - capacity);
}

#[test]
fn sound_in_attention_refreshes_focus_and_timeout() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    sim.set_player(out_of_sight());
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.emit_sound(&env, SoundStimulus::loud(Vec3::new(4.0, 0.0, 0.0)))
        .unwrap();

    for _ in 0..8 {
        sim.tick(&env, DT).unwrap();
    }
    let agent = sim.agent(id).unwrap();
    assert_eq!(agent.state_kind(), StateKind::Attention);
    assert_eq!(agent.state().cooldown_ratio(), Some(0.6));

    let heard = Vec3::new(-3.0, 0.0, 2.0);
    sim.emit_sound(&env, SoundStimulus::loud(heard)).unwrap();
    let agent = sim.agent(id).unwrap();
    assert_eq!(agent.state_kind(), StateKind::Attention);
    assert_eq!(agent.last_seen_player, Some(heard));
    assert_eq!(agent.state().cooldown_ratio(), Some(1.0));
}

#[test]
fn cover_stay_expiry_frees_slot_and_resumes_fighting() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut config = SimConfig::default();
    config.agent.cover_chance = 100;
    let mut sim = Simulation::new(config);
    let player = Vec3::new(0.0, 0.0, 10.0);
    sim.set_player(PlayerView::standing(player));
    let post = Vec3::new(0.0, 0.0, 13.0);
    let slot = sim.add_cover(post, 0, (1.0, 1.0));
    let id = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    sim.apply_damage(&env, id, Damage::bullet(0.1, player)).unwrap();

    sim.tick(&env, DT).unwrap();
    apply_moves(&mut sim);
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Cover);
    assert!(sim.world().covers.get(slot).unwrap().is_taken());
    // The host turns the agent toward the player once at the slot.
    if let Some(agent) = sim.agent_mut(id) {
        agent.body.forward = -Vec3::Z;
    }

    let mut frames = 0;
    while sim.agent(id).unwrap().state_kind() == StateKind::Cover {
        sim.tick(&env, DT).unwrap();
        frames += 1;
        assert!(frames <= 6, "agent never left cover");
    }
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Aggression);
    assert!(!sim.world().covers.get(slot).unwrap().is_taken());
}

#[test]
fn forced_aggression_leaves_sleepers_asleep() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    let zone = yard(&mut sim);
    sim.set_player(out_of_sight());
    let sleeper = sim.spawn_agent(AgentSpawn::at(Vec3::ZERO)).unwrap();
    let guard = sim
        .spawn_agent(AgentSpawn::at(Vec3::new(6.0, 0.0, 0.0)))
        .unwrap();
    sim.apply_damage(&env, sleeper, Damage::tranquilizer(Vec3::ZERO))
        .unwrap();

    sim.force_zone_aggression(&env, zone).unwrap();
    assert_eq!(sim.agent(sleeper).unwrap().state_kind(), StateKind::Sleep);
    assert_eq!(sim.agent(guard).unwrap().state_kind(), StateKind::Aggression);
}

#[test]
fn exhausted_stop_path_keeps_agent_on_last_node() {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();
    let mut sim = Simulation::new(SimConfig::default());
    sim.set_player(out_of_sight());
    let first = Vec3::new(4.0, 0.0, 0.0);
    let last = Vec3::new(4.0, 0.0, 6.0);
    let path = sim.add_path(
        "one way",
        vec![
            PathNode::new(first, Vec3::X, 0.25),
            PathNode::new(last, Vec3::Z, 0.25),
        ],
        WrapMode::Stop,
    );
    let id = sim
        .spawn_agent(AgentSpawn::at(Vec3::ZERO).patrolling(path))
        .unwrap();

    let mut targets = Vec::new();
    for _ in 0..20 {
        sim.tick(&env, DT).unwrap();
        for command in apply_moves(&mut sim) {
            match command {
                AgentCommand::MoveTo { point, .. } | AgentCommand::ForceMoveTo { point, .. } => {
                    targets.push(point)
                }
                _ => {}
            }
        }
    }
    assert_eq!(targets, vec![first, last]);
    assert_eq!(sim.agent(id).unwrap().position(), last);
    assert_eq!(sim.agent(id).unwrap().state_kind(), StateKind::Idle);
}
