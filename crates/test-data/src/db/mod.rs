//! Database integration for seeding test data.
//!
//! The [`Seeder`] inserts generated profiles, photos, matches and grants
//! in batches. Inserts are idempotent on primary keys.

mod seeder;

pub use seeder::{SeedError, Seeder};
