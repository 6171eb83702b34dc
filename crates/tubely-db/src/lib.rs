//! Tubely Database Library
//!
//! Repositories for the video metadata records the ingestion pipeline reads
//! and updates.

pub mod db;

pub use db::{PostgresVideoRepository as VideoRepository, VideoRepositoryTrait};
