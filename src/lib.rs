//! # gazzi - Local LLM Chat Page
//!
//! `gazzi` serves a single-page chat that forwards each question to a
//! locally-hosted language model and shows the answer, keeping the
//! conversation visible for the lifetime of the browser session.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the chat page on http://127.0.0.1:8501 (needs a local Ollama)
//! gazzi
//!
//! # Pick another model and temperature
//! gazzi serve --model llama3.2 --temperature 0.3
//!
//! # One question from the terminal
//! gazzi ask "대한민국의 수도는?"
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/gazzi/config.toml`:
//!
//! ```toml
//! [chat]
//! provider = "ollama"
//! model = "gemma2:2b"
//! temperature = 0.8
//! title = "Gazzi Chatbot"
//! icon = "📚"
//!
//! [providers.ollama]
//! endpoint = "http://localhost:11434"
//! models = ["gemma2:2b", "llama3.2"]
//! ```

/// Chat turns, per-session logs and the session store.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and provider settings.
pub mod config;

/// File system utilities.
pub mod fs;

/// Question input from stdin.
pub mod input;

/// Tracing subscriber setup.
pub mod logging;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Prompt template, model backend and the responder pipeline.
pub mod pipeline;

/// Terminal UI components (spinner, colors).
pub mod ui;

/// Web front end and HTTP server.
pub mod web;
