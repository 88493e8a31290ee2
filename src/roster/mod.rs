//! Roster state: pages and players in their persisted form.
//!
//! Every mutation is a whole-collection read, modify, write cycle through a
//! [`storage::RosterStorage`]. The worker-global instance lives in
//! [`session`].

pub mod clock;
pub mod config;
pub mod drag;
pub mod error;
pub mod model;
pub mod ordering;
pub mod pages;
pub mod players;
pub mod schema;
pub mod session;
pub mod stats;
pub mod storage;
