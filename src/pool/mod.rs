//! Bounded connection pool for the status database.
//!
//! The pool eagerly opens `min` connections at startup, grows by `increment`
//! up to `max` when demand outstrips the idle set, and makes callers wait
//! (bounded by `acquire_timeout`) once the ceiling is reached. Connections
//! are handed out through [`PooledConn`] guards that return themselves on
//! drop, so no exit path — error, early return, cancellation — can leak one.

pub mod backend;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::config::PoolConfig;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to connect to backing store: {0}")]
    Connect(String),

    #[error("pool exhausted: no connection became available within {0:?}")]
    Exhausted(Duration),

    #[error("pool is shut down")]
    Closed,

    #[error("query failed: {0}")]
    Query(String),
}

/// A row from the stuck-jobs probe.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub name: String,
}

/// A live connection to the backing store.
#[async_trait]
pub trait DbConnection: Send {
    /// Run the stuck-jobs probe query.
    async fn stuck_jobs(&mut self) -> Result<Vec<JobRow>, PoolError>;
}

/// Factory that opens new [`DbConnection`]s.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DbConnection>, PoolError>;
}

struct PoolState {
    idle: VecDeque<Box<dyn DbConnection>>,
    /// Connections currently alive: idle + lent + mid-open reservations.
    total: usize,
    closed: bool,
}

struct PoolInner {
    connector: Box<dyn Connect>,
    opts: PoolOptions,
    state: Mutex<PoolState>,
    returned: Notify,
}

#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub min: usize,
    pub max: usize,
    pub increment: usize,
    pub acquire_timeout: Duration,
}

impl From<&PoolConfig> for PoolOptions {
    fn from(cfg: &PoolConfig) -> Self {
        Self {
            min: cfg.min,
            max: cfg.max,
            increment: cfg.increment.max(1),
            acquire_timeout: Duration::from_secs(cfg.acquire_timeout_secs),
        }
    }
}

#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    /// Open the pool with `min` warm connections. A startup connection
    /// failure is fatal — the process must not come up half-connected.
    pub async fn initialize(opts: PoolOptions, connector: Box<dyn Connect>) -> Result<Self, PoolError> {
        let inner = Arc::new(PoolInner {
            connector,
            opts: opts.clone(),
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                total: 0,
                closed: false,
            }),
            returned: Notify::new(),
        });

        for _ in 0..opts.min {
            let conn = inner.connector.connect().await?;
            let mut state = inner.state.lock().unwrap();
            state.idle.push_back(conn);
            state.total += 1;
        }
        debug!(min = opts.min, max = opts.max, "connection pool initialized");

        Ok(Self { inner })
    }

    /// Borrow a connection. Prefers an idle one, grows the pool by
    /// `increment` while below `max`, and otherwise waits (bounded) for a
    /// return. The guard gives the connection back when dropped.
    pub async fn acquire(&self) -> Result<PooledConn, PoolError> {
        let deadline = Instant::now() + self.inner.opts.acquire_timeout;

        loop {
            let grow_by = {
                let mut state = self.inner.state.lock().unwrap();
                if state.closed {
                    return Err(PoolError::Closed);
                }
                if let Some(conn) = state.idle.pop_front() {
                    return Ok(PooledConn::new(conn, Arc::clone(&self.inner)));
                }
                if state.total < self.inner.opts.max {
                    let n = self.inner.opts.increment.min(self.inner.opts.max - state.total);
                    // Reserve the slots before the lock is released so two
                    // callers cannot both grow past max.
                    state.total += n;
                    n
                } else {
                    0
                }
            };

            if grow_by > 0 {
                return self.grow_and_take(grow_by).await;
            }

            // At the ceiling: wait for a return, bounded by the deadline.
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(PoolError::Exhausted(self.inner.opts.acquire_timeout));
            }
            if tokio::time::timeout(remaining, self.inner.returned.notified())
                .await
                .is_err()
            {
                return Err(PoolError::Exhausted(self.inner.opts.acquire_timeout));
            }
        }
    }

    /// Open `n` reserved connections; the first is handed to the caller,
    /// the rest are parked idle. Reservations are rolled back on failure.
    async fn grow_and_take(&self, n: usize) -> Result<PooledConn, PoolError> {
        let mut opened: Vec<Box<dyn DbConnection>> = Vec::with_capacity(n);
        for _ in 0..n {
            match self.inner.connector.connect().await {
                Ok(conn) => opened.push(conn),
                Err(e) => {
                    let mut state = self.inner.state.lock().unwrap();
                    state.total -= n - opened.len();
                    if opened.is_empty() {
                        drop(state);
                        return Err(e);
                    }
                    // Partial growth is still growth; keep what connected.
                    warn!("pool growth cut short: {}", e);
                    break;
                }
            }
        }

        let first = opened.remove(0);
        if !opened.is_empty() {
            let mut state = self.inner.state.lock().unwrap();
            for conn in opened {
                state.idle.push_back(conn);
                self.inner.returned.notify_one();
            }
        }
        Ok(PooledConn::new(first, Arc::clone(&self.inner)))
    }

    /// Drain and close every idle connection and fail all waiters. Guards
    /// still out discard their connection instead of returning it.
    pub async fn shutdown(&self) {
        let drained = {
            let mut state = self.inner.state.lock().unwrap();
            state.closed = true;
            let drained = state.idle.len();
            state.total -= drained;
            state.idle.clear();
            drained
        };
        self.inner.returned.notify_waiters();
        debug!(drained, "connection pool shut down");
    }

    pub fn idle_count(&self) -> usize {
        self.inner.state.lock().unwrap().idle.len()
    }

    pub fn size(&self) -> usize {
        self.inner.state.lock().unwrap().total
    }
}

/// Scoped loan of one connection. Dropping the guard returns the connection
/// to the pool (or discards it after shutdown) and wakes one waiter.
pub struct PooledConn {
    conn: Option<Box<dyn DbConnection>>,
    pool: Arc<PoolInner>,
}

impl std::fmt::Debug for PooledConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConn").finish_non_exhaustive()
    }
}

impl PooledConn {
    fn new(conn: Box<dyn DbConnection>, pool: Arc<PoolInner>) -> Self {
        Self {
            conn: Some(conn),
            pool,
        }
    }

    pub fn connection(&mut self) -> &mut dyn DbConnection {
        self.conn
            .as_mut()
            .expect("connection present until drop")
            .as_mut()
    }

    /// Discard the connection instead of returning it, e.g. after a query
    /// error left it in an unknown state.
    pub fn invalidate(mut self) {
        self.conn.take();
        let mut state = self.pool.state.lock().unwrap();
        state.total -= 1;
        drop(state);
        // A waiter may now grow the pool into the freed slot.
        self.pool.returned.notify_one();
    }
}

impl Drop for PooledConn {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let mut state = self.pool.state.lock().unwrap();
            if state.closed {
                state.total -= 1;
            } else {
                state.idle.push_back(conn);
            }
            drop(state);
            self.pool.returned.notify_one();
        }
    }
}
