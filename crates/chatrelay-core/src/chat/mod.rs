//! Conversation persistence and turn orchestration.

pub mod context;
pub mod repository;
pub mod service;
pub mod title;
pub mod turn;
