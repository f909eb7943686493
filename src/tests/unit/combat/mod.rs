//! Combat tracker tests through the public facade.

mod lifecycle;
mod persistence;
mod scenarios;
