//! These models represent the objects passed between the chat application and this crate
//!
//! There are several different related formats we need to interact with:
//! - stored messages and their per-message content rows, read from and written to the table store
//! - sdk response messages, produced by the model provider when a turn completes
//! - data stream events, delivered while a response is still arriving
//! - useChat ui messages, rendered by the interface
//!
//! Everything is converted into `ContentFragment` as early as possible; the legacy
//! shapes are only ever seen by the normalizer.
pub mod event;
pub mod fragment;
pub mod message;
pub mod role;
pub mod ui;
