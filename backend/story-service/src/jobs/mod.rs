//! Background jobs for story-service

pub mod orphan_sweeper;

pub use orphan_sweeper::{OrphanSweeper, SweepReport};
