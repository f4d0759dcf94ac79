//! Team chat notification: message card composition and webhook delivery.

pub mod card;
mod webhook;

pub use card::{Fact, MessageCard, Section, compose, compose_at};
pub use webhook::send;
