//! Shelfscan Library
//!
//! Identifies the books on a photographed bookshelf: OCR fragments are
//! grouped into spines, each spine is searched in a bibliographic catalog,
//! and candidates are rescored against the OCR evidence.
//!
//! # Modules
//!
//! - `scan`: spine clustering, similarity scoring, resolution and ranking
//! - `search`: bibliographic search providers (Google Books) and caching
//! - `ocr`: text extraction providers (Google Cloud Vision)
//! - `routes`, `state`, `error`, `config`: HTTP server wiring

pub mod config;
pub mod error;
pub mod ocr;
pub mod routes;
pub mod scan;
pub mod search;
pub mod state;
