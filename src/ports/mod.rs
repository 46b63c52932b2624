//! Collaborator traits consumed by the domain.

pub mod config_port;
pub mod indicator_port;
pub mod price_history_port;
pub mod report_port;
