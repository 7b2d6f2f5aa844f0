//! # Thread Sentiment
//!
//! On-demand sentiment scoring for Slack conversation threads.
//!
//! A Slack message shortcut posts to the service, which fetches the thread
//! and the root message's reactions, scores every message, folds in the
//! reaction sentiment, and shows the result in a modal. Nothing is stored.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────────┐   ┌───────────┐
//! │  Slack   │──▶│   server    │──▶│    shortcut    │──▶│  views    │
//! │ shortcut │   │ (signature) │   │ (fetch + join) │   │ (modals)  │
//! └──────────┘   └─────────────┘   └───────┬────────┘   └───────────┘
//!                                          ▼
//!                                  ┌────────────────┐
//!                                  │ ThreadAnalyzer │
//!                                  └──┬─────┬────┬──┘
//!                          lexicon ◀──┘     │    └──▶ emoji
//!                                           ▼
//!                                    oracle cascade
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export SLACK_BOT_TOKEN=xoxb-...
//! export SLACK_SIGNING_SECRET=...
//! export GEMINI_API_KEY=...          # optional; enables the oracle fallback
//! thread-sentiment serve
//! thread-sentiment analyze --channel C0123 --ts 1718000000.000100
//! thread-sentiment score "the deploy is blocked again"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment secrets |
//! | [`models`] | Core data types |
//! | [`emoji`] | Reaction resolution and emoji sentiment weights |
//! | [`lexicon`] | AFINN-165 word and in-text emoji scoring |
//! | [`oracle`] | Generative-model fallback scoring and model cascade |
//! | [`analyzer`] | Thread aggregation and mood classification |
//! | [`traits`] | `ChatPlatform` / `OracleClient` extension seams |
//! | [`slack`] | Slack Web API client |
//! | [`views`] | Modal builders |
//! | [`shortcut`] | Shortcut request orchestration |
//! | [`signature`] | Request signature verification |
//! | [`server`] | HTTP receiver |

pub mod analyzer;
pub mod config;
pub mod emoji;
pub mod error;
pub mod lexicon;
pub mod logging;
pub mod models;
pub mod oracle;
pub mod server;
pub mod shortcut;
pub mod signature;
pub mod slack;
pub mod traits;
pub mod views;
