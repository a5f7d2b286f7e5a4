//! Match state and the tick loop.

use crate::actions::apply_action_to_bot;
use crate::generation::{player_seeds, WorldGenerator};
use crate::{tick, Config, EngineError, World};
use bytes::Bytes;
use protocol::packets::{build_game_complete, build_game_state, build_player_consumed};
use protocol::{GameCompletePayload, GameStateDto, ObjectId, PlayerAction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// What a single tick produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Bots dropped from the roster during the tick.
    pub consumed: Vec<ObjectId>,
    /// The match has a result.
    pub complete: bool,
}

/// One match: the world plus the bookkeeping around ticking it.
pub struct Engine {
    world: World,
    config: Arc<Config>,
}

impl Engine {
    /// Validate `config` and set up an empty arena. Player seeds are drawn
    /// up front so bots registered before generation already carry one.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        let config = Arc::new(config);
        let mut world = World::new(config.clone());
        world.player_seeds = player_seeds(&config);
        Ok(Self { world, config })
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn register_bot(&mut self, nickname: impl Into<String>) -> ObjectId {
        self.world.create_bot(nickname)
    }

    pub fn generate_world(&mut self, generator: &impl WorldGenerator) {
        self.world.generate_starting_world(generator);
    }

    /// Queue an action for its bot. Unknown and dead bots are ignored.
    pub fn submit_action(&mut self, action: PlayerAction) -> bool {
        match self.world.bot_mut(action.player_id) {
            Some(bot) => {
                bot.pending_actions.push_back(action);
                true
            }
            None => {
                debug!("Dropping {:?} for unknown bot {}", action.action, action.player_id);
                false
            }
        }
    }

    /// One bot left, or out of rounds.
    pub fn is_complete(&self) -> bool {
        self.world.player_count() <= 1 || self.world.current_tick() >= self.config.game.max_rounds
    }

    /// Run one tick: actions, simulation, evolution, win check.
    pub fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        let tick_start = std::time::Instant::now();

        let actions_start = std::time::Instant::now();
        let mut applied = 0usize;
        for bot_id in self.world.live_bot_ids() {
            if apply_action_to_bot(&mut self.world, bot_id).is_some() {
                applied += 1;
            }
        }
        let actions_time = actions_start.elapsed();

        let simulation_start = std::time::Instant::now();
        tick::simulate(&mut self.world)?;
        let simulation_time = simulation_start.elapsed();

        let evolution_start = std::time::Instant::now();
        let consumed = self.world.apply_after_tick_state_changes();
        let evolution_time = evolution_start.elapsed();

        let complete = self.is_complete();
        let total_time = tick_start.elapsed();

        debug!(
            "Tick #{}: {:.2}ms total | actions={:.2}ms simulate={:.2}ms evolve={:.2}ms | {} actions, {} bots, {} objects, radius {}",
            self.world.current_tick(),
            total_time.as_secs_f64() * 1000.0,
            actions_time.as_secs_f64() * 1000.0,
            simulation_time.as_secs_f64() * 1000.0,
            evolution_time.as_secs_f64() * 1000.0,
            applied,
            self.world.player_count(),
            self.world.object_ids().len(),
            self.world.radius()
        );

        let budget = Duration::from_millis(self.config.game.tick_rate_ms);
        if total_time > budget {
            warn!(
                "Slow tick #{}: {:.3}ms (budget: {}ms)",
                self.world.current_tick(),
                total_time.as_secs_f64() * 1000.0,
                self.config.game.tick_rate_ms
            );
        }

        Ok(TickOutcome { consumed, complete })
    }

    pub fn snapshot(&mut self) -> &GameStateDto {
        self.world.snapshot()
    }

    /// Settle placements and build the final standings.
    pub fn game_complete_payload(&mut self) -> Result<GameCompletePayload, EngineError> {
        self.world.finalise_placements();
        self.world.game_complete_payload()
    }
}

/// Channels tying a running match to its runner.
pub struct MatchChannels {
    /// Actions submitted by any task.
    pub actions: mpsc::UnboundedReceiver<PlayerAction>,
    /// Encoded frames going out: snapshots, consumed notices, the result.
    pub frames: mpsc::Sender<Bytes>,
    /// Last tick the runner has acknowledged.
    pub acks: watch::Receiver<u32>,
}

/// Drive `engine` until it has a winner.
///
/// Each tick is published and must be acknowledged before the next one
/// starts. Losing either channel before the end aborts the match.
pub async fn run_match(mut engine: Engine, channels: MatchChannels) -> Result<GameCompletePayload, EngineError> {
    let MatchChannels {
        mut actions,
        frames,
        mut acks,
    } = channels;
    let tick_rate = Duration::from_millis(engine.config().game.tick_rate_ms);

    info!(
        "Match started: {} bots, radius {}, {} rounds max",
        engine.world().player_count(),
        engine.world().radius(),
        engine.config().game.max_rounds
    );

    loop {
        let started = Instant::now();

        while let Ok(action) = actions.try_recv() {
            engine.submit_action(action);
        }

        let outcome = engine.tick()?;
        let tick = engine.world().current_tick();

        let state = build_game_state(engine.snapshot()).finish();
        publish(&frames, state).await?;
        for id in &outcome.consumed {
            publish(&frames, build_player_consumed(*id).finish()).await?;
        }

        if outcome.complete {
            let payload = engine.game_complete_payload()?;
            info!(
                "Match complete after {} ticks, winner {:?}",
                payload.total_ticks,
                payload.players.first().map(|p| p.nickname.as_str())
            );
            if frames.send(build_game_complete(&payload).finish()).await.is_err() {
                warn!("Runner left before the result was delivered");
            }
            return Ok(payload);
        }

        if acks.wait_for(|acked| *acked >= tick).await.is_err() {
            error!("Acknowledgement channel closed at tick {}", tick);
            return Err(EngineError::MatchAborted(format!("runner stopped acknowledging at tick {tick}")));
        }

        let elapsed = started.elapsed();
        if elapsed < tick_rate {
            sleep(tick_rate - elapsed).await;
        }
    }
}

async fn publish(frames: &mpsc::Sender<Bytes>, frame: Bytes) -> Result<(), EngineError> {
    frames.send(frame).await.map_err(|_| {
        error!("Frame channel closed mid-match");
        EngineError::MatchAborted("frame channel closed".into())
    })
}
