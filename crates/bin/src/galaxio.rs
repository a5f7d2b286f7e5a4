//! Galaxio - headless match runner.
//!
//! Plays one match between wandering bots and prints the final standings.
//! Frames and actions go through the wire codec exactly as they would over
//! a real transport.

use engine::{run_match, Config, Engine, MatchChannels, SeededGenerator};
use protocol::packets::{build_submit_action, build_tick_ack, ClientPacket, ServerPacket};
use protocol::{ActionKind, GameStateDto, ObjectId, PlayerAction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "galaxio.toml";

/// Picks a new action for a bot now and then, otherwise lets it coast.
struct WanderDriver {
    rng: StdRng,
}

impl WanderDriver {
    fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    fn decide(&mut self, bot_id: ObjectId, state: &[i32; 11]) -> Option<PlayerAction> {
        let roll = self.rng.random_range(0..100);
        let heading = self.rng.random_range(0..360);
        let torpedoes = state[7];
        let shields = state[10];

        let action = match roll {
            0..10 => ActionKind::Forward,
            10..12 if torpedoes > 0 => ActionKind::FireTorpedoes,
            12..13 if shields > 0 => ActionKind::ActivateShield,
            13..14 => ActionKind::StartAfterburner,
            14..16 => ActionKind::StopAfterburner,
            _ => return None,
        };
        Some(PlayerAction::new(bot_id, action, heading))
    }
}

/// Encode and decode an action the way the transport would.
fn over_the_wire(action: &PlayerAction) -> anyhow::Result<PlayerAction> {
    match ClientPacket::parse(&build_submit_action(action).finish())? {
        ClientPacket::SubmitAction(action) => Ok(action),
        other => anyhow::bail!("expected an action, decoded {:?}", other),
    }
}

fn acked_tick(tick: u32) -> anyhow::Result<u32> {
    match ClientPacket::parse(&build_tick_ack(tick).finish())? {
        ClientPacket::TickAck(tick) => Ok(tick),
        other => anyhow::bail!("expected a tick ack, decoded {:?}", other),
    }
}

fn drive(
    driver: &mut WanderDriver,
    state: &GameStateDto,
    actions: &mpsc::UnboundedSender<PlayerAction>,
) -> anyhow::Result<()> {
    for (id, player) in &state.player_objects {
        if let Some(action) = driver.decide(*id, player) {
            if actions.send(over_the_wire(&action)?).is_err() {
                warn!("Match no longer accepts actions");
                break;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,engine=debug")),
        )
        .init();

    info!("Galaxio runner v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(CONFIG_PATH)?;
    if let Ok(value) = std::env::var("BOT_COUNT") {
        let bot_count: u32 = value.parse()?;
        info!("BOT_COUNT override: {} bots", bot_count);
        config = config.with_bot_count(bot_count);
    }

    let mut engine = Engine::new(config)?;
    for n in 0..engine.config().game.bot_count {
        engine.register_bot(format!("wanderer-{}", n + 1));
    }
    engine.generate_world(&SeededGenerator);

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (frame_tx, mut frame_rx) = mpsc::channel(64);
    let (ack_tx, ack_rx) = watch::channel(0u32);
    let game = tokio::spawn(run_match(
        engine,
        MatchChannels {
            actions: action_rx,
            frames: frame_tx,
            acks: ack_rx,
        },
    ));

    let mut driver = WanderDriver::new();
    let mut result = None;
    while let Some(frame) = frame_rx.recv().await {
        match ServerPacket::parse(&frame)? {
            ServerPacket::GameState(state) => {
                let tick = state.world.current_tick;
                debug!(
                    "Tick {}: radius {}, {} bots, {} objects",
                    tick,
                    state.world.radius,
                    state.player_objects.len(),
                    state.game_objects.len()
                );
                drive(&mut driver, &state, &action_tx)?;
                ack_tx.send_replace(acked_tick(tick)?);
            }
            ServerPacket::PlayerConsumed(id) => info!("Bot {} is out", id),
            ServerPacket::GameComplete(payload) => result = Some(payload),
        }
    }

    let payload = game.await??;
    if result.as_ref() != Some(&payload) {
        warn!("Published result differs from the returned one");
    }
    println!("{}", toml::to_string_pretty(&payload)?);
    Ok(())
}
