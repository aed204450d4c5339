//! # chat-widget
//!
//! Leptos + WASM floating chat widget backed by a hosted message table.
//!
//! The headless core (store client, realtime protocol, state reconciliation)
//! lives in the `store` crate. This crate adds the reactive state adapter,
//! the browser websocket transport, and the `ChatWidget` component.

pub mod components;
pub mod config;
pub mod net;
pub mod state;
pub mod util;

/// WASM entry point: install logging and mount the widget into `<body>`.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(components::chat_widget::ChatWidget);
}
