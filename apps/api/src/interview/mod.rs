// Mock interview engine: sessions, store, collaborators, state machine and summaries.
// All LLM calls go through llm_client via the generator implementations.

pub mod feedback_parser;
pub mod generator;
pub mod handlers;
pub mod manager;
pub mod reaper;
pub mod session;
pub mod store;
pub mod summary;
