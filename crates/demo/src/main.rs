//! Demo host for the save system.
//!
//! Plays two short sessions against the configured data directory:
//! 1. Asylum: a refused save during the intro, a checkpoint, then a level
//!    transition into the Tunnel and a checkpoint there
//! 2. Restart: "continue" boots into the saved level and restores it once
//!    the intro finishes
mod capabilities;
mod scene;

use std::time::Duration;

use anyhow::Result;
use save_runtime::{
    ContinueOutcome, LoadOutcome, ReadyFlag, SaveConfig, SaveEvent, SaveOutcome, SaveRequest,
    SaveSystem,
};
use tokio::sync::broadcast;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use capabilities::AmmoType;
use scene::{ASYLUM, Cutscene, Scene, TUNNEL};

const INTRO_FRAMES: u32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SaveConfig::from_env();
    setup_logging(&config)?;

    first_session(&config).await?;
    second_session(&config).await?;

    Ok(())
}

fn build_system(config: &SaveConfig, gate: &ReadyFlag) -> Result<SaveSystem> {
    let system = SaveSystem::builder()
        .config(config.clone())
        .gate(gate.clone())
        .build()?;
    tokio::spawn(show_notices(system.subscribe()));
    Ok(system)
}

/// Stand-in for the HUD: renders save notices.
async fn show_notices(mut events: broadcast::Receiver<SaveEvent>) {
    loop {
        match events.recv().await {
            Ok(SaveEvent::SaveCompleted {
                level, notice_for, ..
            }) => {
                println!("  [hud] Game saved ({level}), shown for {notice_for:?}");
            }
            Ok(SaveEvent::NoSavedGame) => println!("  [hud] No saved game"),
            Ok(SaveEvent::LoadCompleted { restored }) => {
                tracing::debug!(restored, "hud saw load");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "hud missed notices");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Runs frames until the intro is over, driving any pending load.
fn play_intro(system: &mut SaveSystem, cutscene: &mut Cutscene) -> Result<Option<LoadOutcome>> {
    loop {
        let finished = cutscene.advance();
        if let Some(outcome) = system.tick()? {
            return Ok(Some(outcome));
        }
        if finished {
            return Ok(None);
        }
    }
}

async fn first_session(config: &SaveConfig) -> Result<()> {
    println!("== Session 1");
    let gate = ReadyFlag::new();
    let mut system = build_system(config, &gate)?;

    if let ContinueOutcome::Resume { level } = system.continue_game() {
        println!("  Found a save in {level}; starting over");
    }
    system.new_game()?;

    // ================================================================
    // Asylum
    // ================================================================
    let scene = scene::spawn(&mut system, ASYLUM)?;
    let mut cutscene = Cutscene::start(INTRO_FRAMES, gate.clone());

    if system.save(ASYLUM)? == SaveOutcome::NotReady {
        println!("  Save refused while the intro is playing");
    }
    play_intro(&mut system, &mut cutscene)?;

    {
        let player = &scene.player;
        player.health.write().map_err(poisoned)?.take_damage(35.0);
        player.body.write().map_err(poisoned)?.position = [4.0, 0.0, 6.5];
        player.flashlight.write().map_err(poisoned)?.drain(1.2, 20.0);
        player.pistol.write().map_err(poisoned)?.rounds = 3;
    }
    collect(&scene, "asylum-battery")?;
    scene.player.flashlight.write().map_err(poisoned)?.recharge();
    provoke(&scene, "asylum-zombie")?;

    system.save(ASYLUM)?;

    collect(&scene, "asylum-shotgun")?;
    scene.player.weapons.write().map_err(poisoned)?.obtain(1);
    scene
        .player
        .ammo
        .write()
        .map_err(poisoned)?
        .add(AmmoType::Shells, 6);

    system.save_with(SaveRequest::transition(TUNNEL))?;
    describe(&scene)?;

    // ================================================================
    // Tunnel: entities spawn fresh, the player is carried over
    // ================================================================
    let scene = scene::spawn(&mut system, TUNNEL)?;
    let mut cutscene = Cutscene::start(INTRO_FRAMES, gate.clone());
    system.startup();
    if let Some(LoadOutcome::Restored(report)) = play_intro(&mut system, &mut cutscene)? {
        println!(
            "  Entered {TUNNEL}: restored {}, fresh {}",
            report.restored.len(),
            report.defaulted.len()
        );
    }

    if let Some((health, alert)) = scene.enemies.get("tunnel-zombie-1") {
        health.write().map_err(poisoned)?.dead = true;
        alert.write().map_err(poisoned)?.provoked = true;
    }
    scene.player.health.write().map_err(poisoned)?.take_damage(10.0);
    system.save(TUNNEL)?;
    describe(&scene)?;

    // Let the HUD task drain its queue.
    tokio::task::yield_now().await;
    Ok(())
}

async fn second_session(config: &SaveConfig) -> Result<()> {
    println!("== Session 2 (restart)");
    let gate = ReadyFlag::new();
    let mut system = build_system(config, &gate)?;

    let level = match system.continue_game() {
        ContinueOutcome::Resume { level } => level,
        ContinueOutcome::NoSavedGame => return Ok(()),
    };
    let level = if level == TUNNEL { TUNNEL } else { ASYLUM };
    let scene = scene::spawn(&mut system, level)?;

    // The intro plays out on its own timeline.
    let intro = gate.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        intro.open();
    });

    match system.load_when_ready().await? {
        LoadOutcome::Restored(report) => println!(
            "  Continued in {level}: restored {}, ignored {} from other levels",
            report.restored.len(),
            report.ignored.len()
        ),
        other => println!("  Nothing restored: {other:?}"),
    }
    describe(&scene)?;

    tokio::task::yield_now().await;
    Ok(())
}

fn collect(scene: &Scene, token: &str) -> Result<()> {
    if let Some(pickup) = scene.pickups.get(token) {
        pickup.write().map_err(poisoned)?.collect();
    }
    Ok(())
}

fn provoke(scene: &Scene, token: &str) -> Result<()> {
    if let Some((_, alert)) = scene.enemies.get(token) {
        alert.write().map_err(poisoned)?.provoked = true;
    }
    Ok(())
}

fn describe(scene: &Scene) -> Result<()> {
    let player = &scene.player;
    let health = player.health.read().map_err(poisoned)?;
    let body = player.body.read().map_err(poisoned)?;
    let light = player.flashlight.read().map_err(poisoned)?;
    let ammo = player.ammo.read().map_err(poisoned)?;
    let weapons = player.weapons.read().map_err(poisoned)?;

    println!("  [{}]", scene.level);
    println!(
        "    player: hp {:.0}, at {:?}, light {:.1}/{:.0}, weapon {}, bullets {}, shells {}",
        health.hp,
        body.position,
        light.intensity,
        light.spot_angle,
        weapons.current_weapon,
        ammo.amount(AmmoType::Bullets),
        ammo.amount(AmmoType::Shells),
    );
    for (token, pickup) in &scene.pickups {
        let pickup = pickup.read().map_err(poisoned)?;
        println!("    {token}: {}", if pickup.visible { "in world" } else { "taken" });
    }
    for (token, (health, alert)) in &scene.enemies {
        let health = health.read().map_err(poisoned)?;
        let alert = alert.read().map_err(poisoned)?;
        println!(
            "    {token}: {}, provoked {}",
            if health.dead { "dead" } else { "alive" },
            alert.provoked
        );
    }
    Ok(())
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> anyhow::Error {
    anyhow::anyhow!("component lock poisoned")
}

/// Setup logging to a per-run file under the data directory
fn setup_logging(config: &SaveConfig) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let session_id = format!("session_{timestamp}");

    let log_dir = config.data_dir.join("logs").join(&session_id);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "demo.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // Leak the guard to keep file writer alive
    std::mem::forget(guard);

    tracing::info!("Logging initialized: session={}", session_id);
    println!("Log file: {}", log_dir.join("demo.log").display());

    Ok(())
}
