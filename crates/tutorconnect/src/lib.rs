//! TutorConnect: an in-memory tutoring marketplace served over HTTP.
//!
//! Students find and book tutors, tutors manage their availability and
//! credentials, and an admin reviews verification requests. Payment, calendar
//! sync and the educator registry are simulated with fixed delays; the AI
//! tutor is the only outbound call.

pub mod auth;
pub mod booking;
pub mod config;
pub mod effects;
pub mod integrations;
pub mod marketplace;
pub mod model;
pub mod reviews;
pub mod seed;
pub mod server;
pub mod session;
pub mod types;
pub mod verification;
