// Draft simulator entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout belongs to the front end)
// 2. Load config
// 3. Open database, load roster catalog, saved tier list and custom names
// 4. Create channels, spawn the app loop
// 5. Read commands from stdin on a plain thread
// 6. Print updates until the app loop exits

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use tierdraft_app::app::{self, AppState};
use tierdraft_app::config;
use tierdraft_app::db::Database;
use tierdraft_app::protocol::{parse_command, DraftSnapshot, ParseCommandError, UiUpdate, UserCommand};
use tierdraft_core::store::{load_name_overrides, load_tier_list};
use tierdraft_core::{Catalog, DraftPhase, TierList};

const HELP: &str = "\
setup:   up <#> | down <#> | move <from #> <to #> | captain <id>|none
         pattern snake|linear | mode mock|simulation | start
draft:   pick <player id> | reset | status
tiers:   tiers | tiers reset | tier add | tier remove <id>
         tier rename <id> <name> | tier color <id> <#rrggbb>
         rank <player id> <tier id> | unrank <player id>
players: players [position|all] [search] | name <player id> <name> | unname <player id>
         quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("tierdraft starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: mode={}, pattern={}, AI delay {}ms",
        config.draft.mode, config.draft.pattern, config.draft.ai_pick_delay_ms
    );

    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    let catalog = Catalog::load(&config.catalog_path).with_context(|| {
        format!("failed to load roster catalog {}", config.catalog_path.display())
    })?;
    info!(
        "Catalog loaded: {} players, {} positions, {} captains",
        catalog.players().len(),
        catalog.positions().len(),
        catalog.captains().len()
    );

    let tier_list = match load_tier_list(&db, &catalog)? {
        Some(list) => list,
        None => {
            info!("No saved tier list, starting from default tiers");
            TierList::with_default_tiers(&catalog)
        }
    };
    let names = load_name_overrides(&db)?;

    let (ai_tx, ai_rx) = mpsc::channel(16);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel(256);

    let app_state = AppState::new(config, catalog, tier_list, names, Arc::new(db), ai_tx);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ai_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // A blocking stdin read would hold up runtime shutdown, so read on a
    // detached thread.
    std::thread::spawn(move || read_commands(cmd_tx));

    println!("{HELP}");
    while let Some(update) = ui_rx.recv().await {
        println!("{}", render_update(&update));
    }

    let _ = app_handle.await;
    info!("tierdraft shut down cleanly");
    Ok(())
}

fn read_commands(cmd_tx: mpsc::Sender<UserCommand>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("help") {
            println!("{HELP}");
            continue;
        }
        match parse_command(&line) {
            Ok(cmd) => {
                let quit = cmd == UserCommand::Quit;
                if cmd_tx.blocking_send(cmd).is_err() || quit {
                    return;
                }
            }
            Err(ParseCommandError::Empty) => {}
            Err(e) => println!("! {e}"),
        }
    }
    let _ = cmd_tx.blocking_send(UserCommand::Quit);
}

fn render_update(update: &UiUpdate) -> String {
    match update {
        UiUpdate::Snapshot(snapshot) => render_snapshot(snapshot),
        UiUpdate::PickMade(info) => format!(
            "#{} (round {}) {} takes {} [{}]",
            info.pick.pick_number,
            info.pick.round + 1,
            info.captain_name,
            info.player_name,
            info.pick.position
        ),
        UiUpdate::DraftComplete => "Draft complete.".to_string(),
        UiUpdate::Rejected(message) => format!("! {message}"),
        UiUpdate::Warning(message) => format!("warning: {message}"),
        UiUpdate::Fatal(message) => format!("FATAL: {message}"),
        UiUpdate::PlayerList(rows) => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&format!(
                    "{:<8} {:<16} {:<12} {:<4} {:<8}{}\n",
                    row.id,
                    row.name,
                    row.team,
                    row.position,
                    row.tier.as_deref().unwrap_or("-"),
                    if row.drafted { " (drafted)" } else { "" }
                ));
            }
            out.push_str(&format!("{} players", rows.len()));
            out
        }
        UiUpdate::Tiers(list) => {
            let mut out = String::new();
            for (tier, members) in list.ranked_groups() {
                out.push_str(&format!(
                    "{} [{}] {}: {}\n",
                    tier.name,
                    tier.id,
                    tier.color,
                    members.join(", ")
                ));
            }
            out.push_str(&format!("unranked: {}", list.unranked.len()));
            out
        }
    }
}

fn render_snapshot(snapshot: &DraftSnapshot) -> String {
    let mut out = format!(
        "== {} | {} draft | {} ==\n",
        snapshot.phase, snapshot.mode, snapshot.pattern
    );

    if snapshot.phase == DraftPhase::Setup {
        for (idx, captain) in snapshot.captains.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} ({}){}\n",
                idx + 1,
                captain.name,
                captain.id,
                if captain.human { " <- you" } else { "" }
            ));
        }
        return out.trim_end().to_string();
    }

    for (idx, team) in snapshot.teams.iter().enumerate() {
        let marker = if snapshot.on_the_clock == Some(idx) { ">" } else { " " };
        let slots: Vec<String> = team
            .slots
            .iter()
            .map(|s| format!("{}: {}", s.position, s.player_name.as_deref().unwrap_or("-")))
            .collect();
        out.push_str(&format!("{marker} {:<12} {}\n", team.captain_name, slots.join(" | ")));
    }

    if let (Some(pick), Some(round)) = (snapshot.pick_number, snapshot.round) {
        out.push_str(&format!(
            "pick {}/{}, round {}{}",
            pick,
            snapshot.total_picks,
            round + 1,
            if snapshot.human_turn {
                format!(", your pick (open: {})", snapshot.available_positions.join(", "))
            } else {
                ", AI picking...".to_string()
            }
        ));
    }
    if snapshot.halted {
        out.push_str("\ndraft halted; `reset` to start over");
    }
    out.trim_end().to_string()
}

/// Initialize tracing to log to a file (stdout is used by the front end).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("tierdraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tierdraft=info,tierdraft_app=info,tierdraft_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
