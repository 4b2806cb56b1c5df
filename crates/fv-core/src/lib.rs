pub mod api;
pub mod attendance;
pub mod backup;
pub mod config;
pub mod confirm;
pub mod csv_export;
pub mod filter;
pub mod form;
pub mod panel;
pub mod pipeline;
pub mod session;
pub mod stats;
pub mod store;
pub mod transition;
pub mod types;

#[cfg(test)]
mod testing;
