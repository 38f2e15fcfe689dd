use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use slabmap::SlabMap;

use crate::{
    AppConfig, CacheTable, Event, EventError, Pass, PassReport, PassResult, Script, Secrets,
    SecretsError, Session, SessionId,
};

#[cfg(test)]
mod tests;

/// Everything shared by the sessions of one app: the script, the cache table,
/// the configuration, and the secrets.
pub struct App {
    script: Script,
    cache: CacheTable,
    config: AppConfig,
    secrets: Mutex<Option<Arc<Secrets>>>,
}

impl App {
    pub fn new(script: impl Fn(&mut Pass) -> PassResult + Send + Sync + 'static) -> Self {
        Self {
            script: Script::new(script),
            cache: CacheTable::new(),
            config: AppConfig::default(),
            secrets: Mutex::new(None),
        }
    }
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }
    /// Uses `secrets` instead of reading the configured secrets files.
    pub fn with_secrets(self, secrets: Secrets) -> Self {
        *self.secrets.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(secrets));
        self
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
    pub fn cache(&self) -> &CacheTable {
        &self.cache
    }
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the secrets, loading them on first use.
    ///
    /// A failed load is not remembered; the next call tries again.
    pub fn secrets(&self) -> Result<Arc<Secrets>, SecretsError> {
        let mut secrets = self.secrets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(secrets) = &*secrets {
            return Ok(secrets.clone());
        }
        let loaded = Arc::new(Secrets::load(&self.config.secrets.paths)?);
        *secrets = Some(loaded.clone());
        Ok(loaded)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The set of connected sessions of an app.
pub struct Runtime {
    app: Arc<App>,
    sessions: SlabMap<Session>,
    index: HashMap<SessionId, usize>,
}

impl Runtime {
    pub fn new(app: impl Into<Arc<App>>) -> Self {
        Self {
            app: app.into(),
            sessions: SlabMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }
    pub fn len(&self) -> usize {
        self.sessions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Creates a session and runs its first full pass.
    pub fn connect(&mut self) -> (SessionId, PassReport) {
        let mut session = Session::new(self.app.clone());
        let id = session.id();
        tracing::info!(session = %id, "connect");
        let report = session.start();
        let slot = self.sessions.insert(session);
        self.index.insert(id, slot);
        (id, report)
    }

    pub fn disconnect(&mut self, id: SessionId) -> bool {
        let Some(slot) = self.index.remove(&id) else {
            return false;
        };
        self.sessions.remove(slot);
        tracing::info!(session = %id, "disconnect");
        true
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(*self.index.get(&id)?)
    }
    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(*self.index.get(&id)?)
    }

    pub fn dispatch(
        &mut self,
        id: SessionId,
        event: Event,
    ) -> Result<Option<PassReport>, EventError> {
        self.session_mut(id)
            .ok_or(EventError::UnknownSession(id))?
            .dispatch(event)
    }

    /// Runs the due timed fragments of every session.
    pub fn tick(&mut self, now: Instant) -> Vec<(SessionId, PassReport)> {
        let mut reports = Vec::new();
        for session in self.sessions.values_mut() {
            let id = session.id();
            reports.extend(session.tick(now).into_iter().map(|r| (id, r)));
        }
        reports
    }

    /// Drops sessions idle for longer than `server.session_ttl_secs`.
    pub fn expire_idle(&mut self, now: Instant) -> Vec<SessionId> {
        let ttl = self.app.config().server.session_ttl();
        let expired: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| now.saturating_duration_since(s.last_active()) > ttl)
            .map(|s| s.id())
            .collect();
        for id in &expired {
            if let Some(slot) = self.index.remove(id) {
                self.sessions.remove(slot);
                tracing::info!(session = %id, "expired");
            }
        }
        expired
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("app", &self.app)
            .field("sessions", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}
