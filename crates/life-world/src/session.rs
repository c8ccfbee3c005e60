//! Stepping controller for one simulation.
//!
//! A [`Session`] owns the current grid and a recurring ticker that advances it
//! one generation per interval. Every state change is published as a
//! [`Snapshot`] on a watch channel for whatever is displaying the grid.

use crate::grid::Grid;
use crate::patterns;
use crate::rules::{next_generation, Generation};
use life_core::{Cell, Coord, Error, FillMode, Result, RunState, SessionConfig, SessionId};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

/// Immutable view of a session after a change
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub session_id: SessionId,
    /// Generations since the last reset, randomize or load
    pub generation: u64,
    pub grid: Arc<Grid>,
    pub population: usize,
    pub run_state: RunState,
    pub speed: u64,
    pub interval: Duration,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub generation: u64,
    pub population: usize,
    /// The step emptied the grid of a running session, which is now idle
    pub auto_stopped: bool,
}

struct Ticker {
    epoch: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn cancel(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

struct SessionState {
    id: SessionId,
    config: SessionConfig,
    grid: Arc<Grid>,
    population: usize,
    generation: u64,
    run_state: RunState,
    speed: u64,
    // Bumped whenever the armed ticker is invalidated
    epoch: u64,
    ticker: Option<Ticker>,
    rng: ChaCha8Rng,
    updates: watch::Sender<Snapshot>,
}

impl SessionState {
    fn interval(&self) -> Duration {
        self.config.timing.interval_for(self.speed)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            session_id: self.id,
            generation: self.generation,
            grid: Arc::clone(&self.grid),
            population: self.population,
            run_state: self.run_state,
            speed: self.speed,
            interval: self.interval(),
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    fn advance(&mut self) -> StepReport {
        let Generation { grid, population } = next_generation(&self.grid);
        self.grid = Arc::new(grid);
        self.population = population;
        self.generation += 1;

        let auto_stopped = population == 0 && self.run_state.is_running();
        if auto_stopped {
            self.halt();
            self.speed = 0;
            info!(
                session_id = %self.id,
                generation = self.generation,
                "Population extinct, stopping"
            );
        }

        debug!(
            session_id = %self.id,
            generation = self.generation,
            population,
            "Advanced generation"
        );
        self.publish();

        StepReport {
            generation: self.generation,
            population,
            auto_stopped,
        }
    }

    /// Cancel any armed ticker and go idle. Returns whether the session was running.
    fn halt(&mut self) -> bool {
        self.epoch += 1;
        if let Some(ticker) = self.ticker.take() {
            trace!(session_id = %self.id, epoch = ticker.epoch, "Cancelling ticker");
            ticker.cancel();
        }
        let was_running = self.run_state.is_running();
        self.run_state = RunState::Idle;
        was_running
    }

    /// Replace any armed ticker with a fresh one at the current interval.
    fn arm(&mut self, shared: &Arc<Mutex<SessionState>>, runtime: &Handle) {
        if let Some(previous) = self.ticker.take() {
            previous.cancel();
        }
        self.epoch += 1;

        let period = self.interval();
        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_ticker(
            Arc::downgrade(shared),
            self.epoch,
            Instant::now() + period,
            period,
            cancel.clone(),
        ));
        trace!(
            session_id = %self.id,
            epoch = self.epoch,
            interval_ms = period.as_millis() as u64,
            "Armed ticker"
        );

        self.ticker = Some(Ticker {
            epoch: self.epoch,
            cancel,
            handle,
        });
    }

    fn replace_grid(&mut self, grid: Grid) {
        self.population = grid.population();
        self.grid = Arc::new(grid);
        self.generation = 0;
        self.speed = 0;
    }
}

async fn run_ticker(
    state: Weak<Mutex<SessionState>>,
    epoch: u64,
    start: Instant,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticks = time::interval_at(start, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticks.tick() => {}
        }

        let Some(shared) = state.upgrade() else {
            break;
        };
        let mut guard = shared.lock();
        // A tick that raced with stop/set_speed/reset must not touch the new state
        if guard.epoch != epoch || !guard.run_state.is_running() {
            trace!(epoch, "Discarding stale tick");
            break;
        }
        if guard.advance().auto_stopped {
            break;
        }
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current()
        .map_err(|e| Error::InvalidState(format!("no Tokio runtime to drive the ticker: {}", e)))
}

/// A single simulation: current grid, run state, speed and its ticker.
///
/// `start` and `set_speed` spawn the ticker onto the ambient Tokio runtime and
/// fail with `InvalidState` when there is none. Dropping the session cancels
/// its ticker.
pub struct Session {
    id: SessionId,
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    /// Create an idle session with an all-dead grid.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_fill(config, FillMode::Empty)
    }

    /// Create an idle session whose grid is filled according to `fill`.
    pub fn with_fill(config: SessionConfig, fill: FillMode) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (rows, cols) = (config.grid.rows, config.grid.cols);
        let grid = match fill {
            FillMode::Empty => Grid::blank(rows, cols),
            FillMode::Random => {
                Grid::random_unchecked(rows, cols, config.random_density, &mut rng)
            }
        };

        let id = SessionId::new();
        let population = grid.population();
        let grid = Arc::new(grid);
        let (updates, _) = watch::channel(Snapshot {
            session_id: id,
            generation: 0,
            grid: Arc::clone(&grid),
            population,
            run_state: RunState::Idle,
            speed: 0,
            interval: config.timing.interval_for(0),
        });

        info!(session_id = %id, rows, cols, ?fill, population, "Created session");

        Ok(Self {
            id,
            inner: Arc::new(Mutex::new(SessionState {
                id,
                config,
                grid,
                population,
                generation: 0,
                run_state: RunState::Idle,
                speed: 0,
                epoch: 0,
                ticker: None,
                rng,
                updates,
            })),
        })
    }

    /// Create an idle session starting from a caller-supplied grid.
    pub fn with_grid(config: SessionConfig, grid: Grid) -> Result<Self> {
        let session = Self::new(config)?;
        session.load(grid)?;
        Ok(session)
    }

    /// Go from idle to running: step once immediately, then once per interval.
    /// Returns `false` without doing anything if already running.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn start(&self) -> Result<bool> {
        let runtime = current_runtime()?;
        let mut state = self.inner.lock();
        if state.run_state.is_running() {
            debug!("Already running");
            return Ok(false);
        }

        state.run_state = RunState::Running;
        info!(
            speed = state.speed,
            interval_ms = state.interval().as_millis() as u64,
            "Starting"
        );

        let report = state.advance();
        if !report.auto_stopped {
            state.arm(&self.inner, &runtime);
        }
        Ok(true)
    }

    /// Go idle and cancel the pending tick. Returns whether the session was running.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn stop(&self) -> bool {
        let mut state = self.inner.lock();
        let was_running = state.halt();
        if was_running {
            info!(generation = state.generation, "Stopped");
            state.publish();
        }
        was_running
    }

    /// Advance one generation. An emptied grid stops a running session.
    pub fn step(&self) -> StepReport {
        self.inner.lock().advance()
    }

    /// Change the speed of a running session and restart the interval wait from
    /// zero. Returns the speed applied, or `None` when idle (nothing changes).
    /// Without a runtime the session is left as it was.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_speed(&self, speed: u64) -> Result<Option<u64>> {
        let mut state = self.inner.lock();
        if !state.run_state.is_running() {
            debug!(requested = speed, "Ignoring speed change while idle");
            return Ok(None);
        }

        let runtime = current_runtime()?;
        state.speed = state.config.timing.clamp_speed(speed);
        state.arm(&self.inner, &runtime);
        info!(
            speed = state.speed,
            interval_ms = state.interval().as_millis() as u64,
            "Speed changed"
        );
        state.publish();
        Ok(Some(state.speed))
    }

    /// Stop and clear the grid.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        state.halt();
        let grid = state.grid.empty_like();
        state.replace_grid(grid);
        info!("Reset grid");
        state.publish();
    }

    /// Stop and refill the grid randomly from the session's RNG.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn randomize(&self) {
        let mut state = self.inner.lock();
        state.halt();
        let (rows, cols) = state.grid.dimensions();
        let density = state.config.random_density;
        let grid = Grid::random_unchecked(rows, cols, density, &mut state.rng);
        state.replace_grid(grid);
        info!(population = state.population, "Randomized grid");
        state.publish();
    }

    /// Flip one cell of the current grid, returning its new value. Allowed while
    /// running; the next step reads the edited grid.
    pub fn edit_cell(&self, row: usize, col: usize) -> Result<Cell> {
        let mut state = self.inner.lock();
        state.grid.get(row, col)?;

        // Snapshots already handed out keep the unedited grid
        let cell = Arc::make_mut(&mut state.grid).toggle(row, col)?;
        if cell.is_alive() {
            state.population += 1;
        } else {
            state.population -= 1;
        }

        debug!(session_id = %self.id, row, col, ?cell, "Edited cell");
        state.publish();
        Ok(cell)
    }

    /// Stop and replace the grid with `grid`, which must match the session's dimensions.
    #[instrument(skip(self, grid), fields(session_id = %self.id))]
    pub fn load(&self, grid: Grid) -> Result<()> {
        let mut state = self.inner.lock();
        let (expected_rows, expected_cols) = state.grid.dimensions();
        let (rows, cols) = grid.dimensions();
        if (rows, cols) != (expected_rows, expected_cols) {
            return Err(Error::DimensionMismatch {
                expected_rows,
                expected_cols,
                rows,
                cols,
            });
        }

        state.halt();
        state.replace_grid(grid);
        info!(population = state.population, "Loaded grid");
        state.publish();
        Ok(())
    }

    /// Stop and load an otherwise empty grid holding the named pattern, placed
    /// at `origin` or centred when `None`.
    pub fn seed_pattern(&self, name: &str, origin: Option<Coord>) -> Result<()> {
        let pattern = patterns::find(name)?;
        let mut grid = self.inner.lock().grid.empty_like();
        let origin = origin.unwrap_or_else(|| pattern.centered_origin(&grid));
        pattern.stamp(&mut grid, origin)?;
        debug!(session_id = %self.id, pattern = pattern.name, ?origin, "Seeding pattern");
        self.load(grid)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn run_state(&self) -> RunState {
        self.inner.lock().run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state().is_running()
    }

    pub fn population(&self) -> usize {
        self.inner.lock().population
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn speed(&self) -> u64 {
        self.inner.lock().speed
    }

    /// Current step interval
    pub fn interval(&self) -> Duration {
        self.inner.lock().interval()
    }

    /// The current grid. Later steps and edits never change the returned value.
    pub fn grid(&self) -> Arc<Grid> {
        Arc::clone(&self.inner.lock().grid)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().snapshot()
    }

    /// Receive a snapshot after every change to the session.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.lock().updates.subscribe()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.lock().halt();
    }
}
