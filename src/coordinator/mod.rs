//! Session coordination for the shared splat renderer
//!
//! The self-hosted renderer is the one shared, capacity-constrained
//! resource in this system. This module is its sole arbiter of admission:
//! the server side tracks active viewer sessions by heartbeat
//! ([`SessionStore`] behind the axum routes), and the client side
//! ([`CoordinatorClient`]) feeds that count into strategy selection.
//!
//! Admission is advisory. Clients already mid-render are never evicted when
//! the threshold is crossed; the count only shapes new admission decisions.

mod client;
mod routes;
mod store;

pub use client::{AdmissionClient, CoordinatorClient};
pub use routes::{router, CoordinatorState, RegisterResponse, SessionBody};
pub use store::{SessionStore, StoreStats};
