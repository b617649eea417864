use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use duelsweeper_core::{Difficulty, RandomMineGenerator};
use duelsweeper_protocol::{CreateMatchRequest, JoinMatchRequest, MatchSnapshot, topic_for};
use duelsweeper_session::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use bot::{Action, Bot};

mod bot;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl From<Preset> for Difficulty {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => Difficulty::Beginner,
            Preset::Intermediate => Difficulty::Intermediate,
            Preset::Advanced => Difficulty::Advanced,
            Preset::Expert => Difficulty::Expert,
        }
    }
}

/// Plays a two-bot match through the match service and prints every
/// snapshot it broadcasts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Service configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board preset, overridden field by field by --rows, --columns and --mines
    #[arg(short, long, value_enum, default_value_t = Preset::Beginner)]
    preset: Preset,

    #[arg(long)]
    rows: Option<i32>,

    #[arg(long)]
    columns: Option<i32>,

    #[arg(long)]
    mines: Option<i32>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// How long each bot thinks before acting, in milliseconds
    #[arg(long, default_value_t = 250)]
    think_ms: u64,

    /// The second bot stops moving after this many of its own moves, so its clock runs out
    #[arg(long)]
    stall_after: Option<u32>,

    /// The first bot drops its connection after this many of its own moves
    #[arg(long)]
    quit_after: Option<u32>,

    /// Pretty-print snapshots
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn create_request(&self) -> CreateMatchRequest {
        let preset = CreateMatchRequest::from(Difficulty::from(self.preset));
        CreateMatchRequest {
            rows: self.rows.unwrap_or(preset.rows),
            columns: self.columns.unwrap_or(preset.columns),
            mine_count: self.mines.unwrap_or(preset.mine_count),
        }
    }
}

/// When a bot stops playing.
#[derive(Copy, Clone, Debug)]
enum Dropout {
    /// Disconnects, forfeiting the match.
    Quit(u32),
    /// Stays connected but never moves again.
    Stall(u32),
}

struct BotSeat {
    bot: Bot,
    session_id: String,
    moves: u32,
    dropout: Option<Dropout>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match &args.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("Could not load {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    let board = args.create_request().board_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);

    let sink = ChannelSink::new(config.broadcast_capacity);
    let updates = sink.subscribe();
    let service = Arc::new(MatchService::in_memory(
        Arc::new(sink),
        Arc::new(SystemClock),
        config,
    ));
    let sweeper = spawn_sweeper(Arc::clone(&service));
    let printer = tokio::spawn(print_updates(updates, args.pretty));

    let match_id = service
        .create_match_with(board, RandomMineGenerator::new(seed))?
        .id;
    let mut seats = Vec::new();
    let dropouts = [args.quit_after.map(Dropout::Quit), args.stall_after.map(Dropout::Stall)];
    for (index, (name, dropout)) in ["Alice", "Bob"].into_iter().zip(dropouts).enumerate() {
        let request = JoinMatchRequest {
            username: name.to_owned(),
        };
        let joined = service.join_match(&match_id, request.username()?)?;
        let session_id = format!("session-{}", index);
        let headers = SubscribeHeaders::new(joined.player_id.as_str(), match_id.as_str());
        if !service.on_subscribe(&session_id, &topic_for(&match_id), &headers) {
            bail!("Could not register {} for match {}", name, match_id);
        }
        seats.push(BotSeat {
            bot: Bot::new(name, joined.player_id, seed.wrapping_add(index as u64 + 1)),
            session_id,
            moves: 0,
            dropout,
        });
    }
    for seat in &seats {
        service.mark_ready(&match_id, &seat.bot.player_id)?;
    }

    play(&service, &match_id, &mut seats, Duration::from_millis(args.think_ms)).await?;

    if tokio::time::timeout(Duration::from_secs(5), printer).await.is_err() {
        log::warn!("Snapshot printer did not finish");
    }
    sweeper.shutdown().await;

    let result = service.get_match(&match_id)?;
    log::info!("{}", result.last_event_message);
    for player in &result.players {
        log::info!("{}: {} points", player.username, player.score);
    }
    Ok(())
}

async fn play(
    service: &MatchService,
    match_id: &str,
    seats: &mut [BotSeat],
    think: Duration,
) -> anyhow::Result<()> {
    loop {
        tokio::time::sleep(think).await;
        let snapshot = service.get_match(match_id)?;
        if snapshot.game_over {
            return Ok(());
        }
        let Some(seat) = seats
            .iter_mut()
            .find(|seat| snapshot.current_turn.as_deref() == Some(seat.bot.player_id.as_str()))
        else {
            bail!("Match {} is running without a current turn", match_id);
        };

        match seat.dropout {
            Some(Dropout::Quit(after)) if seat.moves >= after => {
                log::info!("{} leaves the match", seat.bot.name);
                service.on_session_disconnect(&seat.session_id)?;
                continue;
            }
            Some(Dropout::Stall(after)) if seat.moves >= after => {
                log::debug!("{} is stalling", seat.bot.name);
                continue;
            }
            _ => {}
        }

        let Some(action) = seat.bot.choose(&snapshot) else {
            bail!("{} has nothing left to open", seat.bot.name);
        };
        // a rejection here is a lost race with the sweeper, the next loop sees it
        let result = match action {
            Action::Reveal(request) => {
                seat.moves += 1;
                service.make_move(match_id, request.player_id()?, request.coords()?)
            }
            Action::Flag(request) => {
                service.toggle_flag(match_id, request.player_id()?, request.coords()?)
            }
        };
        if let Err(err) = result {
            log::warn!("{} was rejected: {}", seat.bot.name, err);
        }
    }
}

async fn print_updates(mut updates: broadcast::Receiver<MatchUpdate>, pretty: bool) {
    loop {
        match updates.recv().await {
            Ok(update) => {
                print_snapshot(&update.snapshot, pretty);
                if update.snapshot.game_over {
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("Printer lagged, skipped {} snapshots", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

fn print_snapshot(snapshot: &MatchSnapshot, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(snapshot)
    } else {
        snapshot.to_json()
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(err) => log::error!("Could not serialize snapshot: {}", err),
    }
}
