//! Terminal front end for the dialogue engine.
//!
//! - [`input`]: parses REPL lines into engine commands
//! - [`render`]: text views of the path, history, status and outcomes
//! - [`demo`]: built-in content used when no backend URL is given

pub mod demo;
pub mod input;
pub mod render;
