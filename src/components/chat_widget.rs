//! Floating chat widget: toggle button, message list, and composer.
//!
//! SYSTEM CONTEXT
//! ==============
//! The component owns a `RwSignal<ChatState>` and a [`WidgetController`]
//! bound to it. The controller performs all store calls; the view only reads
//! the signal and forwards user intents. Messages are stored newest-first and
//! rendered in reverse so the newest sits at the bottom.
//!
//! LIFECYCLE
//! =========
//! The controller lives in a local `StoredValue`. The live subscription is
//! released in `on_cleanup`; disposing the stored value drops the controller
//! and releases it as well if cleanup never ran.

#[cfg(test)]
#[path = "chat_widget_test.rs"]
mod chat_widget_test;

use std::rc::Rc;

use leptos::prelude::*;
use store::{ChatController, ChatError, ChatOptions, ChatState, Message, SupabaseStore};

use crate::config;
use crate::state::signal::SignalState;
use crate::util::notify;
use crate::util::time_label::time_label;

/// Controller type the widget runs.
pub type WidgetController = ChatController<SupabaseStore, SignalState>;

fn build_controller(chat: RwSignal<ChatState>, options: ChatOptions) -> Option<Rc<WidgetController>> {
    let config = match config::store_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("chat widget disabled: {e}");
            return None;
        }
    };

    let store = SupabaseStore::new(config);
    #[cfg(feature = "hydrate")]
    let store = store.with_realtime(Rc::new(crate::net::socket::BrowserRealtime));

    Some(Rc::new(ChatController::new(Rc::new(store), SignalState(chat), options)))
}

/// Scroll requests only: the memo changes when a send bumps the sequence,
/// not on typing, live inserts, or older pages.
pub(crate) fn scroll_requests(chat: RwSignal<ChatState>) -> Memo<u64> {
    Memo::new(move |_| chat.with(|c| c.scroll_to_newest_seq))
}

/// Floating chat panel with live updates and backward paging.
#[component]
pub fn ChatWidget() -> impl IntoView {
    let chat = RwSignal::new(ChatState::default());
    let controller = StoredValue::new_local(build_controller(chat, config::chat_options()));
    let list_ref = NodeRef::<leptos::html::Div>::new();

    #[cfg(feature = "hydrate")]
    if let Some(ctrl) = controller.get_value() {
        leptos::task::spawn_local(async move { ctrl.mount().await });
    }

    on_cleanup(move || {
        controller.try_with_value(|ctrl| {
            if let Some(ctrl) = ctrl {
                ctrl.teardown();
            }
        });
    });

    let scroll_seq = scroll_requests(chat);
    Effect::new(move || {
        scroll_seq.track();

        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = list_ref.get() {
                let scroll_height = el.scroll_height();
                el.set_scroll_top(scroll_height);
            }
        }
    });

    let on_toggle = move |_| {
        let Some(ctrl) = controller.get_value() else {
            chat.update(|c| {
                c.toggle_open();
            });
            return;
        };
        leptos::task::spawn_local(async move {
            ctrl.toggle().await;
        });
    };

    let on_load_older = move |_| {
        let Some(ctrl) = controller.get_value() else {
            return;
        };
        leptos::task::spawn_local(async move {
            ctrl.load_older().await;
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Some(ctrl) = controller.get_value() else {
            notify::alert("Chat is not configured.");
            return;
        };
        leptos::task::spawn_local(async move {
            match ctrl.post_message().await {
                Ok(_) | Err(ChatError::Validation(_) | ChatError::Detached) => {}
                Err(ChatError::Store(_)) => {
                    if let Some(text) = chat.try_update(|c| {
                        let text = c.send_error.clone();
                        c.dismiss_send_error();
                        text
                    }) {
                        notify::alert(text.as_deref().unwrap_or("Failed to send message"));
                    }
                }
            }
        });
    };

    let is_open = move || chat.with(|c| c.open);
    let can_send = move || chat.with(|c| !c.draft.trim().is_empty());
    let toggle_label = move || if is_open() { "Close chat" } else { "Chat" };

    view! {
        <div class="chat-widget" style="position: fixed; right: 1rem; bottom: 1rem; z-index: 1000">
            <button class="chat-widget__toggle" on:click=on_toggle aria-expanded=move || is_open().to_string()>
                {toggle_label}
            </button>

            <div class="chat-widget__panel" hidden=move || !is_open()>
                <div class="chat-widget__messages" node_ref=list_ref>
                    {move || {
                        chat.with(|c| c.has_older())
                            .then(|| {
                                let loading = move || chat.with(|c| c.is_loading_older());
                                view! {
                                    <button
                                        class="btn chat-widget__older"
                                        on:click=on_load_older
                                        disabled=loading
                                    >
                                        {move || if loading() { "Loading..." } else { "Load older messages" }}
                                    </button>
                                }
                            })
                    }}

                    {move || {
                        let messages = chat.with(|c| c.messages().to_vec());
                        if messages.is_empty() {
                            return view! {
                                <div class="chat-widget__empty">"No messages yet"</div>
                            }
                                .into_any();
                        }

                        messages.iter().rev().map(message_row).collect::<Vec<_>>().into_any()
                    }}
                </div>

                <form class="chat-widget__composer" on:submit=on_submit>
                    <input
                        class="chat-widget__name"
                        type="text"
                        placeholder="Name (optional)"
                        prop:value=move || chat.with(|c| c.author.clone())
                        on:input=move |ev| chat.update(|c| c.author = event_target_value(&ev))
                    />
                    <input
                        class="chat-widget__input"
                        type="text"
                        placeholder="Write a message..."
                        prop:value=move || chat.with(|c| c.draft.clone())
                        on:input=move |ev| chat.update(|c| c.draft = event_target_value(&ev))
                    />
                    <button class="btn btn--primary chat-widget__send" type="submit" disabled=move || !can_send()>
                        "Send"
                    </button>
                </form>
            </div>
        </div>
    }
}

fn message_row(msg: &Message) -> impl IntoView + use<> {
    let name = msg.name.clone();
    let content = msg.content.clone();
    let stamp = time_label(msg.created_at);
    view! {
        <div class="chat-widget__message">
            <div class="chat-widget__meta">
                <span class="chat-widget__author">{name}</span>
                <span class="chat-widget__time">{stamp}</span>
            </div>
            <div class="chat-widget__text" style="white-space: pre-wrap">{content}</div>
        </div>
    }
}
