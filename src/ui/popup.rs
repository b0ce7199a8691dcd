/// Extension popup: how many conversations have been exported

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::store::{ChromeStore, ConversationStore};

/// Status line for `count` stored conversations
pub fn status_text(count: usize) -> String {
    match count {
        0 => "No chats exported yet.".to_string(),
        1 => "1 chat exported.".to_string(),
        n => format!("{} chats exported.", n),
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let status = use_state(|| "Loading...".to_string());

    {
        let status = status.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match ChromeStore.count().await {
                    Ok(count) => status.set(status_text(count)),
                    Err(e) => {
                        log::error!("Failed to count exports: {}", e);
                        status.set("⚠️ Error reading storage.".to_string());
                    }
                }
            });
            || ()
        });
    }

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Chat Hoarder"}</h1>
            <p id="status" class="popup-status">{(*status).clone()}</p>
            <p class="footer-popup">
                {"Chat Hoarder v0.1.0"}
            </p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(0), "No chats exported yet.");
        assert_eq!(status_text(1), "1 chat exported.");
        assert_eq!(status_text(7), "7 chats exported.");
    }
}
