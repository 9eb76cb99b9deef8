//! egui views. Everything here reads [`AppState`](crate::state::AppState)
//! and forwards user input to it; no data logic lives in the UI.

pub mod charts;
pub mod panels;
pub mod table;
