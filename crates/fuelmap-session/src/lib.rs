//! Search, filter, and routing engine of the fuel-station finder.
//!
//! [`MapSession`] holds all state and performs every transition
//! synchronously; [`spawn_session`] runs one on a tokio task against real or
//! fake capabilities.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod markers;
pub mod route;
pub mod runtime;
pub mod session;
pub mod surface;

pub use catalog::{PlaceCatalog, UNNAMED_PLACE};
pub use error::{Notice, NoticeKind, SessionError};
pub use filter::FilterEngine;
pub use markers::{MarkerReconciler, ReconcileReport};
pub use route::{Route, RouteController, RouteOutcome, RouteRequest, RouteState};
pub use runtime::{spawn_session, Capabilities, RuntimeOptions, SessionHandle};
pub use session::{Effect, MapSession, SessionPhase, SessionSettings, SessionSnapshot};
pub use surface::{DrawnRoute, RecordingSurface, SurfaceOp, DEFAULT_OP_LOG_LIMIT};
