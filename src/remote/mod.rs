//! Remote data client for the hosted Supabase store

mod client;
mod error;
pub mod models;

pub use client::{QueryBuilder, SupabaseClient};
pub use error::RemoteError;
pub use models::{fetch_blogs, fetch_events, Event, Registration, RowId, EVENTS_SELECT};
