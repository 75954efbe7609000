//! Store connectivity tracking.
//!
//! Handlers ask a `ConnectivityProbe` whether the store is reachable before every
//! store-backed operation. The production probe is fed by a heartbeat task so the
//! check itself never blocks a request.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::repository::run_migrations;

pub trait ConnectivityProbe: Send + Sync {
    fn is_connected(&self) -> bool;
}

pub type ProbeState = Arc<dyn ConnectivityProbe>;

/// PoolProbe
///
/// Connectivity flag for a Postgres pool, refreshed by `spawn_heartbeat`.
#[derive(Clone)]
pub struct PoolProbe {
    pool: PgPool,
    connected: Arc<AtomicBool>,
}

impl PoolProbe {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pings the store once, records the outcome and returns it. Migrations run
    /// on every transition from unreachable to reachable.
    pub async fn check(&self) -> bool {
        let reachable = sqlx::query("SELECT 1").execute(&self.pool).await.is_ok();
        let was_connected = self.connected.load(Ordering::Acquire);

        match (was_connected, reachable) {
            (false, true) => match run_migrations(&self.pool).await {
                Ok(()) => {
                    tracing::info!("database reachable, serving live data");
                    self.connected.store(true, Ordering::Release);
                }
                Err(err) => {
                    tracing::error!(error = %err, "database reachable but migrations failed");
                    return false;
                }
            },
            (true, false) => {
                tracing::warn!("database unreachable, falling back to demo data");
                self.connected.store(false, Ordering::Release);
            }
            _ => {}
        }
        reachable
    }

    /// Runs `check` every `interval` for the lifetime of the process.
    pub fn spawn_heartbeat(&self, interval: Duration) -> JoinHandle<()> {
        let probe = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                probe.check().await;
            }
        })
    }
}

impl ConnectivityProbe for PoolProbe {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// StaticProbe
///
/// Manually switched probe for tests.
#[derive(Clone, Default)]
pub struct StaticProbe {
    connected: Arc<AtomicBool>,
}

impl StaticProbe {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(connected)),
        }
    }

    pub fn set(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

impl ConnectivityProbe for StaticProbe {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
