//! # Classbell Feed
//!
//! The client side of the pipeline: render a user's notification snapshot
//! into a view model (icon, colors, humanized timestamp) and reconcile
//! read state with one batched commit after each render pass.

pub mod render;
pub mod subscriber;

pub use render::{render_feed, FeedItem, FeedView, IconStyle};
pub use subscriber::{FeedSink, FeedSubscriber};
