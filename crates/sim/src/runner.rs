//! Encounter setup and the turn loop.
//!
//! A [`Session`] owns the loaded content, tunables, and scenario; it hands
//! out [`EncounterRunner`]s that borrow from it and play the encounter to its
//! end, one planned turn at a time.

use combat_content::{ContentFactory, Scenario, ScenarioError, ScenarioGenerator};
use combat_core::{
    CombatConfig, CombatEngine, CombatEnv, CombatError, CombatEvent, CombatantId,
    CombatantSnapshot, ContentRegistry, DecisionSource, EncounterPhase, EngineError,
    ErrorSeverity, InitiativeOrder, OpenGround, PcgRng, Topic,
};

use crate::autopilot::Autopilot;
use crate::config::SimConfig;
use crate::planner::{TurnCommand, TurnPlanner};

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// The turn loop ran past every turn the round limit allows.
    #[error("encounter made no progress after {turns} turns")]
    Stalled { turns: u32 },
}

impl CombatError for SimError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            SimError::Engine(err) => err.severity(),
            SimError::Scenario(err) => err.severity(),
            SimError::Stalled { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SimError::Engine(err) => err.error_code(),
            SimError::Scenario(err) => err.error_code(),
            SimError::Stalled { .. } => "SIM_STALLED",
        }
    }
}

/// Loaded content plus the scenario and seed for one encounter.
pub struct Session {
    registry: ContentRegistry,
    config: CombatConfig,
    scenario: Scenario,
    seed: u64,
    ground: OpenGround,
}

impl Session {
    pub fn new(registry: ContentRegistry, config: CombatConfig, scenario: Scenario, seed: u64) -> Self {
        Self {
            registry,
            config,
            scenario,
            seed,
            ground: OpenGround::new(),
        }
    }

    /// Loads content and picks the scenario described by `options`.
    ///
    /// A named scenario is read from the data directory; otherwise a random
    /// 2v2 is generated from the seed. The explicit seed wins over the
    /// scenario's own.
    pub fn load(options: &SimConfig) -> anyhow::Result<Self> {
        let factory = match &options.data_dir {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::bundled(),
        };
        let registry = factory.load_registry()?;
        let mut config = factory.load_config()?;
        if let Some(max_rounds) = options.max_rounds {
            config = config.with_max_rounds(max_rounds);
        }

        let scenario = match &options.scenario {
            Some(name) => factory.load_scenario(name)?,
            None => ScenarioGenerator::new(options.seed.unwrap_or(0)).generate(),
        };
        let seed = options.seed.or(scenario.seed).unwrap_or(0);

        tracing::info!(
            data_dir = %factory.data_dir().display(),
            scenario = %scenario.id,
            seed,
            "session ready"
        );
        Ok(Self::new(registry, config, scenario, seed))
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn combat_config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// Starts the encounter with the autopilot planning turns and answering reactions.
    pub fn start(&self) -> SimResult<EncounterRunner<'_, Autopilot<'_>>> {
        let autopilot = Autopilot::new(&self.registry, self.config.tile_size);
        self.start_with(autopilot, autopilot)
    }

    pub fn start_with<'s, P: TurnPlanner>(
        &'s self,
        planner: P,
        decisions: impl DecisionSource + 's,
    ) -> SimResult<EncounterRunner<'s, P>> {
        let env = CombatEnv::with_all(&self.registry, &self.ground, &PcgRng, &self.config);
        let mut engine = CombatEngine::new(env, self.seed, decisions);
        engine.subscribe_all(log_event);

        let combatants = self.scenario.build(&self.registry)?;
        // Preset scores are kept as-is; only units without one roll.
        engine.begin_encounter(combatants, InitiativeOrder::Rolled)?;
        Ok(EncounterRunner::new(engine, planner))
    }
}

fn log_event(event: &CombatEvent) {
    match event.topic() {
        Topic::Diagnostics => {
            tracing::warn!(seq = event.seq, round = event.round, "{:?}", event.kind)
        }
        Topic::Turn => tracing::info!(seq = event.seq, round = event.round, "{:?}", event.kind),
        _ => tracing::debug!(seq = event.seq, round = event.round, "{:?}", event.kind),
    }
}

/// What happened during one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub actor: CombatantId,
    pub executed: usize,
    pub rejected: usize,
}

/// Final state of a finished encounter.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub phase: EncounterPhase,
    pub rounds: u32,
    pub turns: u32,
    /// Events published, including ones trimmed from the replay log.
    pub events: u64,
    /// Hex SHA-256 of the final snapshot.
    pub state_hash: String,
    pub roster: Vec<CombatantSnapshot>,
}

/// Drives an engine with a turn planner until the encounter ends.
pub struct EncounterRunner<'a, P> {
    engine: CombatEngine<'a>,
    planner: P,
    turns: u32,
}

impl<'a, P: TurnPlanner> EncounterRunner<'a, P> {
    pub fn new(engine: CombatEngine<'a>, planner: P) -> Self {
        Self {
            engine,
            planner,
            turns: 0,
        }
    }

    pub fn engine(&self) -> &CombatEngine<'a> {
        &self.engine
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Plays the current actor's turn, or returns `None` once the encounter is over.
    ///
    /// Commands the engine rejects as invalid are logged and skipped; anything
    /// worse aborts the run.
    pub fn play_turn(&mut self) -> SimResult<Option<TurnReport>> {
        if !self.engine.state().is_active() {
            return Ok(None);
        }
        let Some(actor) = self.engine.current_actor() else {
            return Ok(None);
        };

        let plan = self.planner.plan_turn(actor, self.engine.state());
        let mut report = TurnReport {
            actor,
            executed: 0,
            rejected: 0,
        };

        for command in plan {
            if !self.still_acting(actor) {
                break;
            }
            let result = match &command {
                TurnCommand::UseAbility { ability, targets } => self
                    .engine
                    .execute_ability(actor, ability, targets.clone())
                    .map(|_| ()),
                TurnCommand::Move { path } => {
                    self.engine.execute_movement(actor, path).map(|_| ())
                }
            };
            match result {
                Ok(()) => report.executed += 1,
                Err(err) if is_rejection(&err) => {
                    tracing::debug!(
                        %actor,
                        code = err.error_code(),
                        error = %err,
                        ?command,
                        "command rejected"
                    );
                    report.rejected += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        if self.still_acting(actor) {
            self.engine.end_turn(actor)?;
        }
        self.turns += 1;
        Ok(Some(report))
    }

    /// Plays turns until the encounter ends, then summarises it.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        let roster_size = self.engine.state().combatants.len() as u32;
        let max_rounds = self.engine.env().config().max_rounds;
        let limit = max_rounds
            .saturating_add(1)
            .saturating_mul(roster_size.max(1))
            .saturating_add(1);

        while self.play_turn()?.is_some() {
            if self.turns > limit {
                return Err(SimError::Stalled { turns: self.turns });
            }
        }
        self.summary()
    }

    pub fn summary(&self) -> SimResult<RunSummary> {
        let state = self.engine.state();
        let hash = self
            .engine
            .save()
            .state_hash()
            .map_err(EngineError::from)?;
        let roster = state
            .combatants
            .keys()
            .filter_map(|id| self.engine.snapshot(*id))
            .collect();

        Ok(RunSummary {
            phase: state.phase,
            rounds: state.round(),
            turns: self.turns,
            events: state.event_seq,
            state_hash: hex::encode(hash),
            roster,
        })
    }

    fn still_acting(&self, actor: CombatantId) -> bool {
        self.engine.state().is_active() && self.engine.current_actor() == Some(actor)
    }
}

fn is_rejection(err: &EngineError) -> bool {
    matches!(
        err.severity(),
        ErrorSeverity::Recoverable | ErrorSeverity::Validation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PassPlanner;
    use combat_core::{EndReason, NeverReact};

    fn options(scenario: Option<&str>, seed: Option<u64>) -> SimConfig {
        SimConfig {
            scenario: scenario.map(str::to_owned),
            seed,
            ..SimConfig::default()
        }
    }

    #[test]
    fn generated_session_uses_the_seed() {
        let session = Session::load(&options(None, Some(5))).unwrap();
        assert_eq!(session.scenario().id, "random_2v2_seed_5");
        assert_eq!(session.seed(), 5);
        assert_eq!(session.scenario().units.len(), 4);
    }

    #[test]
    fn named_session_falls_back_to_the_scenario_seed() {
        let session = Session::load(&options(Some("skirmish"), None)).unwrap();
        assert_eq!(session.seed(), 1337);

        let session = Session::load(&options(Some("skirmish"), Some(9))).unwrap();
        assert_eq!(session.seed(), 9);
    }

    #[test]
    fn max_rounds_override_reaches_the_engine() {
        let mut options = options(Some("duel"), None);
        options.max_rounds = Some(7);
        let session = Session::load(&options).unwrap();
        assert_eq!(session.combat_config().max_rounds, 7);
        assert_eq!(session.combat_config().tile_size, 5);
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        assert!(Session::load(&options(Some("no_such_scenario"), None)).is_err());
    }

    #[test]
    fn duel_plays_to_a_finish() {
        let session = Session::load(&options(Some("duel"), None)).unwrap();
        let mut runner = session.start().unwrap();
        let summary = runner.run().unwrap();

        assert!(matches!(summary.phase, EncounterPhase::Ended { .. }));
        assert!(!runner.engine().state().is_active());
        assert!(summary.rounds <= session.combat_config().max_rounds);
        assert_eq!(summary.roster.len(), 2);
        assert_eq!(summary.state_hash.len(), 64);
        assert!(runner.play_turn().unwrap().is_none());
    }

    #[test]
    fn skirmish_plays_to_a_finish() {
        let session = Session::load(&options(Some("skirmish"), None)).unwrap();
        let summary = session.start().unwrap().run().unwrap();

        assert!(matches!(summary.phase, EncounterPhase::Ended { .. }));
        assert_eq!(summary.roster.len(), 6);
        assert!(summary.turns > 0);
    }

    #[test]
    fn same_seed_same_encounter() {
        let session = Session::load(&options(None, Some(3))).unwrap();
        let first = session.start().unwrap().run().unwrap();
        let second = session.start().unwrap().run().unwrap();

        assert_eq!(first.state_hash, second.state_hash);
        assert_eq!(first.events, second.events);
        assert_eq!(first.turns, second.turns);
    }

    #[test]
    fn passive_sides_draw_at_the_round_limit() {
        let mut options = options(Some("duel"), None);
        options.max_rounds = Some(3);
        let session = Session::load(&options).unwrap();
        let mut runner = session.start_with(PassPlanner, NeverReact).unwrap();

        let first = runner.play_turn().unwrap().unwrap();
        assert_eq!((first.executed, first.rejected), (0, 0));

        let summary = runner.run().unwrap();
        assert_eq!(
            summary.phase,
            EncounterPhase::Ended {
                winner: None,
                reason: EndReason::RoundLimit,
            }
        );
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.turns, 6);
        assert!(summary.roster.iter().all(|c| c.hp.current == c.hp.max));
    }
}
