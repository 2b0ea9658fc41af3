//! # QsoLog
//!
//! A contact logbook for radio operators, built around the ADIF
//! interchange format.
//!
//! QsoLog imports contacts from ADIF files and from ARRL Logbook of the
//! World (LoTW), reconciles them against a local SQLite logbook without
//! producing duplicates, merges duplicates that are already stored, and
//! exports the logbook back to ADIF.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │  Sources    │──▶│  qsolog-core     │──▶│   SQLite     │
//! │ file / LoTW │   │ decode+reconcile │   │  contacts    │
//! └─────────────┘   └──────────────────┘   └──────┬───────┘
//!                                                 │
//!                               ┌─────────────────┤
//!                               ▼                 ▼
//!                          ┌──────────┐     ┌──────────┐
//!                          │  export  │     │  dedup   │
//!                          └──────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! qso init                              # create database
//! qso import file ./log.adi --merge-duplicates
//! LOTW_PASSWORD=... qso import lotw --username W1AW
//! qso dedup                             # merge stored duplicates
//! qso export --start-date 2024-01-01
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`connector_lotw`] | LoTW report download |
//! | [`import`] | Import orchestration |
//! | [`export`] | ADIF export |
//! | [`dedup`] | Stored duplicate merge |
//! | [`sqlite_store`] | SQLite contact store |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`progress`] | Import progress reporting |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod connector_lotw;
pub mod db;
pub mod dedup;
pub mod export;
pub mod import;
pub mod logging;
pub mod migrate;
pub mod progress;
pub mod sqlite_store;
