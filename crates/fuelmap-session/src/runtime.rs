//! Async driver for a [`MapSession`].
//!
//! One tokio task owns the session. Commands arrive over an `mpsc` channel,
//! capability calls run as tasks in a `JoinSet`, and both are handled one at
//! a time in the same loop, so every transition is atomic. Observers follow
//! along through a `watch` channel of [`SessionSnapshot`]s.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fuelmap_core::{
    AppConfig, BrandTag, CapabilityError, Coordinate, DirectionsProvider, Geolocator, MapSurface,
    MarkerHandle, PlaceHit, PlaceId, PlacesProvider, RouteLegs, RouteQuery, TravelMode,
};
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, Id, JoinError, JoinHandle, JoinSet};

use crate::error::SessionError;
use crate::session::{Effect, MapSession, SessionSnapshot};

const COMMAND_BUFFER: usize = 32;

/// The external services a session talks to.
#[derive(Debug, Clone)]
pub struct Capabilities<G, P, D> {
    pub geolocator: G,
    pub places: P,
    pub directions: D,
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    pub locate_timeout: Duration,
}

impl RuntimeOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            locate_timeout: config.locate_timeout(),
        }
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            locate_timeout: Duration::from_millis(4_000),
        }
    }
}

#[derive(Debug)]
enum Command {
    SetFilter(Vec<BrandTag>),
    ToggleBrand(BrandTag),
    ClearFilter,
    ChooseDestination(PlaceId),
    ClickMarker(MarkerHandle),
    Relocate,
    ClearRoute,
    DismissNotice(u64),
    Shutdown,
}

#[derive(Debug)]
enum Completion {
    Located {
        seq: u64,
        result: Result<Coordinate, CapabilityError>,
    },
    Searched {
        seq: u64,
        result: Result<Vec<PlaceHit>, CapabilityError>,
    },
    Routed {
        seq: u64,
        result: Result<RouteLegs, CapabilityError>,
    },
}

/// The request a spawned capability task resolves. Used to settle a task
/// that panicked as an ordinary capability failure.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Locate(u64),
    Search(u64),
    Route(u64),
}

impl Pending {
    fn failed(self, error: &JoinError) -> Completion {
        let cause = |provider: &str| CapabilityError::Provider {
            provider: provider.to_string(),
            message: format!("task failed: {error}"),
        };
        match self {
            Pending::Locate(seq) => Completion::Located {
                seq,
                result: Err(cause("geolocation")),
            },
            Pending::Search(seq) => Completion::Searched {
                seq,
                result: Err(cause("places")),
            },
            Pending::Route(seq) => Completion::Routed {
                seq,
                result: Err(cause("directions")),
            },
        }
    }
}

enum Event {
    Command(Option<Command>),
    Completed(Result<(Id, Completion), JoinError>),
}

/// Client side of a running session.
#[derive(Debug)]
pub struct SessionHandle<S> {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<MapSession<S>>,
}

/// Spawns the session actor and starts locating immediately.
pub fn spawn_session<G, P, D, S>(
    session: MapSession<S>,
    capabilities: Capabilities<G, P, D>,
    options: RuntimeOptions,
) -> SessionHandle<S>
where
    G: Geolocator + 'static,
    P: PlacesProvider + 'static,
    D: DirectionsProvider + 'static,
    S: MapSurface + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot(0));

    let actor = SessionActor {
        session,
        geolocator: Arc::new(capabilities.geolocator),
        places: Arc::new(capabilities.places),
        directions: Arc::new(capabilities.directions),
        locate_timeout: options.locate_timeout,
        commands: command_rx,
        snapshots: snapshot_tx,
        tasks: JoinSet::new(),
        pending: HashMap::new(),
    };
    let task = tokio::spawn(actor.run());

    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        task,
    }
}

impl<S> SessionHandle<S> {
    /// Replaces the brand selection. An empty list shows every station.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn set_filter(&self, tags: Vec<BrandTag>) -> Result<(), SessionError> {
        self.send(Command::SetFilter(tags)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn toggle_brand(&self, tag: BrandTag) -> Result<(), SessionError> {
        self.send(Command::ToggleBrand(tag)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn clear_filter(&self) -> Result<(), SessionError> {
        self.send(Command::ClearFilter).await
    }

    /// Picks a visible station as destination. Unknown ids are logged and
    /// ignored by the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn choose_destination(&self, id: PlaceId) -> Result<(), SessionError> {
        self.send(Command::ChooseDestination(id)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn click_marker(&self, handle: MarkerHandle) -> Result<(), SessionError> {
        self.send(Command::ClickMarker(handle)).await
    }

    /// Re-runs locate followed by search.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn relocate(&self) -> Result<(), SessionError> {
        self.send(Command::Relocate).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn clear_route(&self) -> Result<(), SessionError> {
        self.send(Command::ClearRoute).await
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session has ended.
    pub async fn dismiss_notice(&self, id: u64) -> Result<(), SessionError> {
        self.send(Command::DismissNotice(id)).await
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Waits for the first snapshot satisfying `predicate`, including the
    /// current one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session ends first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(predicate)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Waits until the first search has resolved and no capability call is
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session ends first.
    pub async fn wait_idle(&self) -> Result<SessionSnapshot, SessionError> {
        self.wait_for(SessionSnapshot::is_idle).await
    }

    /// Stops the actor, removes the session's markers, and hands the session
    /// back.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the actor task panicked.
    pub async fn shutdown(self) -> Result<MapSession<S>, SessionError> {
        if self.commands.send(Command::Shutdown).await.is_err() {
            tracing::debug!("session actor already stopped");
        }
        self.task.await.map_err(|e| {
            tracing::error!(error = %e, "session task failed");
            SessionError::Closed
        })
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

struct SessionActor<G, P, D, S> {
    session: MapSession<S>,
    geolocator: Arc<G>,
    places: Arc<P>,
    directions: Arc<D>,
    locate_timeout: Duration,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    tasks: JoinSet<Completion>,
    pending: HashMap<Id, Pending>,
}

impl<G, P, D, S> SessionActor<G, P, D, S>
where
    G: Geolocator + 'static,
    P: PlacesProvider + 'static,
    D: DirectionsProvider + 'static,
    S: MapSurface + 'static,
{
    async fn run(mut self) -> MapSession<S> {
        self.start_locate();
        self.publish();

        loop {
            let event = tokio::select! {
                command = self.commands.recv() => Event::Command(command),
                Some(joined) = self.tasks.join_next_with_id() => Event::Completed(joined),
            };

            match event {
                Event::Command(None | Some(Command::Shutdown)) => break,
                Event::Command(Some(command)) => self.handle_command(command),
                Event::Completed(Ok((id, completion))) => {
                    self.pending.remove(&id);
                    self.handle_completion(completion);
                }
                Event::Completed(Err(e)) => {
                    tracing::error!(error = %e, "capability task failed");
                    if let Some(pending) = self.pending.remove(&e.id()) {
                        self.handle_completion(pending.failed(&e));
                    }
                }
            }
            self.publish();
        }

        self.tasks.abort_all();
        self.pending.clear();
        self.session.shutdown();
        self.snapshots.send_replace(self.session.snapshot(0));
        self.session
    }

    fn handle_command(&mut self, command: Command) {
        tracing::debug!(?command, "session command");
        let effects = match command {
            Command::SetFilter(tags) => self.session.set_filter(tags),
            Command::ToggleBrand(tag) => self.session.toggle_brand(tag),
            Command::ClearFilter => self.session.clear_filter(),
            Command::ChooseDestination(id) => {
                self.session.choose_destination(&id).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "destination not chosen");
                    Vec::new()
                })
            }
            Command::ClickMarker(handle) => {
                self.session.click_marker(handle).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "marker click ignored");
                    Vec::new()
                })
            }
            Command::Relocate => {
                self.start_locate();
                Vec::new()
            }
            Command::ClearRoute => {
                self.session.clear_route();
                Vec::new()
            }
            Command::DismissNotice(id) => {
                self.session.dismiss_notice(id);
                Vec::new()
            }
            Command::Shutdown => Vec::new(),
        };
        self.run_effects(effects);
    }

    fn handle_completion(&mut self, completion: Completion) {
        let effects = match completion {
            Completion::Located { seq, result } => self.session.location_resolved(seq, result),
            Completion::Searched { seq, result } => self.session.search_resolved(seq, result),
            Completion::Routed { seq, result } => {
                self.session.route_resolved(seq, result);
                Vec::new()
            }
        };
        self.run_effects(effects);
    }

    fn start_locate(&mut self) {
        let seq = self.session.begin_locate();
        let geolocator = Arc::clone(&self.geolocator);
        let limit = self.locate_timeout;
        let task = self.tasks.spawn(async move {
            let result = match tokio::time::timeout(limit, geolocator.current_position()).await {
                Ok(result) => result,
                Err(_) => Err(CapabilityError::Timeout(
                    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                )),
            };
            Completion::Located { seq, result }
        });
        self.track(&task, Pending::Locate(seq));
    }

    fn track(&mut self, task: &AbortHandle, pending: Pending) {
        self.pending.insert(task.id(), pending);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Search { seq, query } => {
                    tracing::debug!(seq, center = %query.center, "searching");
                    let places = Arc::clone(&self.places);
                    let task = self.tasks.spawn(async move {
                        let result = places.search(&query).await;
                        Completion::Searched { seq, result }
                    });
                    self.track(&task, Pending::Search(seq));
                }
                Effect::Route(request) => {
                    tracing::debug!(seq = request.seq, to = %request.to.id, "requesting route");
                    let directions = Arc::clone(&self.directions);
                    let query = RouteQuery {
                        origin: request.from,
                        destination: request.to.location,
                        mode: TravelMode::Driving,
                    };
                    let seq = request.seq;
                    let task = self.tasks.spawn(async move {
                        let result = directions.route(&query).await;
                        Completion::Routed { seq, result }
                    });
                    self.track(&task, Pending::Route(seq));
                }
            }
        }
    }

    fn publish(&self) {
        self.snapshots
            .send_replace(self.session.snapshot(self.tasks.len()));
    }
}
