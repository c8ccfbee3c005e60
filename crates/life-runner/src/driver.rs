//! Drives a session and renders each published generation as text.

use anyhow::{Context, Result};
use life_core::RunnerConfig;
use life_world::{Session, Snapshot};
use std::future::Future;
use std::io::Write;
use tracing::{info, instrument};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub generations: u64,
    pub population: usize,
    pub extinct: bool,
}

/// Build a session from the runner configuration, seeded with the configured
/// pattern or fill.
pub fn build_session(config: &RunnerConfig) -> Result<Session> {
    let session = Session::with_fill(config.session.clone(), config.initial_fill)
        .context("Failed to create session")?;
    if let Some(name) = &config.pattern {
        session
            .seed_pattern(name, None)
            .with_context(|| format!("Failed to seed pattern '{}'", name))?;
    }
    Ok(session)
}

pub fn render<W: Write>(out: &mut W, snapshot: &Snapshot) -> Result<()> {
    let state = if snapshot.run_state.is_running() {
        "running"
    } else {
        "idle"
    };
    writeln!(
        out,
        "generation {}  population {}  speed {}  interval {}ms  [{}]",
        snapshot.generation,
        snapshot.population,
        snapshot.speed,
        snapshot.interval.as_millis(),
        state
    )?;
    writeln!(out, "{}", snapshot.grid)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Start the session and follow its snapshots until it goes idle, reaches
/// `max_generations`, or `shutdown` completes.
#[instrument(skip_all, fields(session_id = %session.id()))]
pub async fn drive<W, F>(
    session: &Session,
    config: &RunnerConfig,
    out: &mut W,
    shutdown: F,
) -> Result<RunSummary>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut updates = session.subscribe();
    if config.render {
        let initial = updates.borrow_and_update().clone();
        render(out, &initial)?;
    }

    session.start().context("Failed to start session")?;
    if config.speed > 0 {
        session
            .set_speed(config.speed)
            .context("Failed to set session speed")?;
    }

    tokio::pin!(shutdown);

    loop {
        let snapshot = updates.borrow_and_update().clone();
        if config.render {
            render(out, &snapshot)?;
        }
        record_gauge!(
            "population",
            snapshot.population as u64,
            generation = snapshot.generation
        );

        if !snapshot.run_state.is_running() {
            info!(generation = snapshot.generation, "Session went idle");
            break;
        }
        if let Some(max) = config.max_generations {
            if snapshot.generation >= max {
                info!(generation = snapshot.generation, "Reached generation limit");
                session.stop();
                break;
            }
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping session");
                session.stop();
                break;
            }
        }
    }

    let population = session.population();
    let summary = RunSummary {
        generations: session.generation(),
        population,
        extinct: population == 0,
    };
    if summary.extinct {
        record_counter!("extinctions", 1u64, generation = summary.generations);
    }
    Ok(summary)
}
