/// Conversation library page: tile grid, search, keyboard navigation and the detail viewer

use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, KeyboardEvent, MessageEvent, Window};
use yew::prelude::*;

use crate::bridge::{self, BridgeMessage, Inbound};
use crate::conversation::Conversation;
use crate::fixtures::sample_conversations;
use crate::library::{filter_conversations, navigate, NavKey};
use crate::store::{ConversationStore, MemoryStore};
use crate::ui::components::{ConversationTile, ConversationViewer};
use crate::ui::copy_to_clipboard;
use crate::ui::render::ViewMode;

#[derive(Debug, Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Notice(String),
    Error(String),
}

fn request_chat_data(window: &Window) {
    if let Err(e) = bridge::post(window, &BridgeMessage::GetChatData) {
        log::error!("Failed to request chat data: {}", e);
    }
}

/// Error state for a failed delete, `None` when the delete went through.
///
/// Only a successful delete reloads the list, so a failure stays on screen.
fn delete_failure(success: bool, error: Option<String>) -> Option<ViewState> {
    if success {
        return None;
    }
    let message = error.unwrap_or_else(|| "unknown error".to_string());
    log::warn!("Delete failed: {}", message);
    Some(ViewState::Error(format!("Delete failed: {}", message)))
}

fn handle_bridge_message(
    window: &Window,
    event: &MessageEvent,
    conversations: &UseStateHandle<Vec<Conversation>>,
    state: &UseStateHandle<ViewState>,
) {
    if !bridge::from_same_window(event, window) {
        return;
    }
    let Some(payload) = bridge::payload_of(event) else {
        return;
    };

    match bridge::classify(&payload) {
        Inbound::Message(BridgeMessage::ChatDataResponse { data }) => {
            conversations.set(data);
            state.set(ViewState::Idle);
        }
        Inbound::Message(BridgeMessage::DeleteChatResponse { success, error, .. }) => match delete_failure(success, error) {
            Some(failed) => state.set(failed),
            None => request_chat_data(window),
        },
        _ => {}
    }
}

#[function_component(LibraryViewer)]
pub fn library_viewer() -> Html {
    let state = use_state(|| ViewState::Loading);
    let conversations = use_state(Vec::<Conversation>::new);
    let search_query = use_state(String::new);
    let selected = use_state(|| None::<usize>);
    let default_mode = use_state(ViewMode::default);
    let test_mode = use_state(|| {
        web_sys::window()
            .map(|window| !bridge::extension_present(&window))
            .unwrap_or(true)
    });
    let show_extension_alert = use_state(|| false);
    let sample_store = use_state(|| {
        Rc::new(MemoryStore::with_conversations(&sample_conversations()).unwrap_or_default())
    });

    // Load conversations on mount, from the bridge or the sample store
    {
        let state = state.clone();
        let conversations = conversations.clone();
        let show_extension_alert = show_extension_alert.clone();
        let sample_store = (*sample_store).clone();
        let test_mode = *test_mode;

        use_effect_with((), move |_| {
            let mut listener: Option<Closure<dyn FnMut(MessageEvent)>> = None;

            if test_mode {
                show_extension_alert.set(true);
                spawn_local(async move {
                    conversations.set(sample_store.list_all().await);
                    state.set(ViewState::Idle);
                });
            } else if let Some(window) = web_sys::window() {
                let closure = {
                    let window = window.clone();
                    Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                        handle_bridge_message(&window, &event, &conversations, &state)
                    })
                };
                match window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref()) {
                    Ok(()) => {
                        request_chat_data(&window);
                        listener = Some(closure);
                    }
                    Err(e) => log::error!("Failed to listen for bridge messages: {:?}", e),
                }
            }

            move || {
                if let (Some(window), Some(listener)) = (web_sys::window(), listener) {
                    let _ = window.remove_event_listener_with_callback("message", listener.as_ref().unchecked_ref());
                }
            }
        });
    }

    let filtered = filter_conversations(&conversations, &search_query);
    let selected_conversation = selected.and_then(|i| filtered.get(i).cloned());

    // Arrow keys move through the filtered list, Escape closes the viewer
    {
        let selected = selected.clone();
        let len = filtered.len();

        use_effect_with((len, *selected), move |(len, current)| {
            let len = *len;
            let current = *current;
            let listener = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                let Some(key) = NavKey::from_key(&event.key()) else {
                    return;
                };
                if key == NavKey::Escape && current.is_none() {
                    return;
                }
                event.prevent_default();
                selected.set(navigate(current, key, len));
            });

            let window = web_sys::window();
            if let Some(window) = &window {
                if let Err(e) = window.add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref()) {
                    log::error!("Failed to listen for keys: {:?}", e);
                }
            }

            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
                }
            }
        });
    }

    let on_search_input = {
        let search_query = search_query.clone();
        let selected = selected.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_query.set(input.value());
                selected.set(None);
            }
        })
    };

    let on_mode_change = {
        let default_mode = default_mode.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                match select.value().parse::<ViewMode>() {
                    Ok(mode) => default_mode.set(mode),
                    Err(e) => log::warn!("{}", e),
                }
            }
        })
    };

    let on_select = {
        let selected = selected.clone();
        move |index: usize| {
            let selected = selected.clone();
            Callback::from(move |_: ()| selected.set(Some(index)))
        }
    };

    let on_close = {
        let selected = selected.clone();
        Callback::from(move |_: ()| selected.set(None))
    };

    let on_delete = {
        let conversations = conversations.clone();
        let selected = selected.clone();
        let state = state.clone();
        let sample_store = (*sample_store).clone();
        let test_mode = *test_mode;
        let selected_id = selected_conversation.as_ref().map(|c| c.id.clone());

        Callback::from(move |id: String| {
            if selected_id.as_deref() == Some(id.as_str()) {
                selected.set(None);
            }

            if test_mode {
                let conversations = conversations.clone();
                let state = state.clone();
                let sample_store = sample_store.clone();
                spawn_local(async move {
                    match sample_store.delete(Some(&id)).await {
                        Ok(_) => conversations.set(sample_store.list_all().await),
                        Err(e) => state.set(ViewState::Error(format!("Delete failed: {}", e))),
                    }
                });
            } else if let Some(window) = web_sys::window() {
                if let Err(e) = bridge::post(&window, &BridgeMessage::delete(id)) {
                    state.set(ViewState::Error(format!("Delete failed: {}", e)));
                }
            }
        })
    };

    let on_copy = {
        let state = state.clone();
        Callback::from(move |text: String| {
            let state = state.clone();
            spawn_local(async move {
                match copy_to_clipboard(&text).await {
                    Ok(()) => state.set(ViewState::Notice("Copied to clipboard".to_string())),
                    Err(e) => state.set(ViewState::Error(format!("Copy failed: {}", e))),
                }
            });
        })
    };

    let on_dismiss_alert = {
        let show_extension_alert = show_extension_alert.clone();
        Callback::from(move |_| show_extension_alert.set(false))
    };

    let on_backdrop = on_close.reform(|_: MouseEvent| ());
    let stop_propagation = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div class="library">
            <aside class="sidebar">
                <h2 class="sidebar-title">{"Conversations"}</h2>
                <ul class="sidebar-list">
                    {for filtered.iter().enumerate().map(|(index, conversation)| html! {
                        <li
                            key={conversation.id.clone()}
                            class={classes!("sidebar-item", (*selected == Some(index)).then_some("selected"))}
                            onclick={on_select(index).reform(|_: MouseEvent| ())}
                        >
                            {&conversation.title}
                        </li>
                    })}
                </ul>
            </aside>

            <main class="library-main">
                if *show_extension_alert {
                    <Alert r#type={AlertType::Info} title={"Extension not installed"} inline={true}>
                        <p>{"Showing sample conversations. Deleting here does not touch any saved exports."}</p>
                        <Button onclick={on_dismiss_alert} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                            {"Dismiss"}
                        </Button>
                    </Alert>
                }

                {match &*state {
                    ViewState::Loading => html! {
                        <div class="loading-text-center">
                            <Spinner />
                            <p class="loading-text">{"Loading conversations..."}</p>
                        </div>
                    },
                    ViewState::Notice(message) => html! {
                        <Alert r#type={AlertType::Success} title={message.clone()} inline={true}>
                        </Alert>
                    },
                    ViewState::Error(err) => html! {
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    },
                    ViewState::Idle => html! {}
                }}

                <div class="library-controls">
                    <label class="view-mode-label">{"Default View Mode:"}</label>
                    <select id="view-mode" class="view-mode-select" onchange={on_mode_change}>
                        {for ViewMode::ALL.iter().map(|mode| html! {
                            <option value={mode.as_str()} selected={*default_mode == *mode}>{mode.label()}</option>
                        })}
                    </select>
                    <input
                        type="text"
                        placeholder="Search..."
                        value={(*search_query).clone()}
                        oninput={on_search_input}
                        class="search-input"
                    />
                </div>

                if filtered.is_empty() && !matches!(*state, ViewState::Loading) {
                    <div class="empty-state">
                        if search_query.is_empty() {
                            <p>{"No exported conversations yet."}</p>
                            <p class="empty-state-hint">{"Use the Export button on a conversation page."}</p>
                        } else {
                            <p>{"No conversations match your search."}</p>
                        }
                    </div>
                } else {
                    <div class="tile-grid">
                        {for filtered.iter().enumerate().map(|(index, conversation)| html! {
                            <ConversationTile
                                key={conversation.id.clone()}
                                conversation={conversation.clone()}
                                selected={*selected == Some(index)}
                                on_open={on_select(index)}
                                on_delete={on_delete.clone()}
                            />
                        })}
                    </div>
                }

                <footer class="footer">
                    {format!("{} conversations • View and manage your exports.", conversations.len())}
                </footer>
            </main>

            if let Some(conversation) = selected_conversation {
                <div class="viewer-backdrop" onclick={on_backdrop}>
                    <div class="viewer-container" onclick={stop_propagation}>
                        <ConversationViewer
                            conversation={conversation}
                            default_mode={*default_mode}
                            on_close={on_close.clone()}
                            on_copy={on_copy.clone()}
                        />
                    </div>
                </div>
            }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_delete_reloads() {
        assert_eq!(delete_failure(true, None), None);
    }

    #[test]
    fn test_failed_delete_keeps_error() {
        assert_eq!(
            delete_failure(false, Some("QUOTA_BYTES quota exceeded".to_string())),
            Some(ViewState::Error("Delete failed: QUOTA_BYTES quota exceeded".to_string()))
        );
        assert_eq!(
            delete_failure(false, None),
            Some(ViewState::Error("Delete failed: unknown error".to_string()))
        );
    }
}
