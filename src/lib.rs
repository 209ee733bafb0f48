//! # Telegram Warehouse
//!
//! A channel scraping, warehousing, and analytics pipeline.
//!
//! The pipeline scrapes messages and photos from public Telegram channels
//! through a Bot-API-compatible gateway, lands them as dated JSON files,
//! loads them into raw Postgres tables, delegates the dimensional model to
//! an external SQL-transformation tool, enriches images with a pretrained
//! object-detection model, and serves four read-only analytical endpoints
//! over the transformed tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────┐   ┌───────────┐   ┌────────────┐
//! │ Scraper │──▶│ JSON/JPG │──▶│ raw.*     │──▶│ marts      │
//! │ gateway │   │ on disk  │   │ Postgres  │   │ (external) │
//! └─────────┘   └────┬─────┘   └───────────┘   └─────┬──────┘
//!                    │detector        ▲               │
//!                    ▼                │               ▼
//!               ┌──────────┐   ┌──────┴─────┐   ┌──────────┐
//!               │ CSV      │──▶│ loaders    │   │ HTTP API │
//!               └──────────┘   └────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tgwh init                 # create the raw schema and tables
//! tgwh scrape               # fetch recent messages and photos
//! tgwh load-messages        # land the JSON tree in raw.telegram_messages
//! tgwh transform            # build the dimensional model
//! tgwh detect               # run object detection over the images
//! tgwh load-detections      # land the CSV in raw.image_detections
//! tgwh serve api            # start the analytical API
//! tgwh pipeline             # all of the above, in order
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data records |
//! | [`telegram`] | Gateway client |
//! | [`scrape`] | Channel scraping |
//! | [`load_raw`] | Raw message loading |
//! | [`detect`] | Object-detection enrichment |
//! | [`load_detections`] | Detection CSV loading |
//! | [`transform`] | External transformation step |
//! | [`queries`] | Read queries over the marts |
//! | [`server`] | Analytical HTTP API |
//! | [`pipeline`] | Sequential orchestration |
//! | [`db`] | Database connection |
//! | [`migrate`] | Raw schema migrations |

pub mod config;
pub mod db;
pub mod detect;
pub mod load_detections;
pub mod load_raw;
pub mod migrate;
pub mod models;
pub mod pipeline;
pub mod queries;
pub mod scrape;
pub mod server;
pub mod stats;
pub mod telegram;
pub mod transform;
