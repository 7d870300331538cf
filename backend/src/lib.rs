//! Menu Planner Backend Library
//!
//! Data layer for the nutritionist menu planning platform: schema
//! migrations, integrity-aware error handling, repositories over the
//! relational store, and a minimal HTTP service shell.

pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod state;
