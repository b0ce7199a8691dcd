/// Reusable viewer components

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::conversation::Conversation;
use crate::ui::render::{
    highlight_code, parse_blocks, parse_inline, record_json, response_copy_text, speaker, transcript_copy_text, Block,
    Inline, TokenKind, ViewMode,
};

const PREVIEW_CHARS: usize = 140;

fn preview(conversation: &Conversation) -> String {
    let text = conversation
        .responses
        .get(1)
        .or_else(|| conversation.responses.first())
        .map(String::as_str)
        .unwrap_or_default();

    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}

#[derive(Properties, PartialEq)]
pub struct ConversationTileProps {
    pub conversation: Conversation,
    #[prop_or(false)]
    pub selected: bool,
    pub on_open: Callback<()>,
    pub on_delete: Callback<String>,
}

#[function_component(ConversationTile)]
pub fn conversation_tile(props: &ConversationTileProps) -> Html {
    let conversation = &props.conversation;

    let on_delete = {
        let on_delete = props.on_delete.clone();
        let id = conversation.id.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_delete.emit(id.clone());
        })
    };

    html! {
        <div
            class={classes!("conversation-tile", props.selected.then_some("selected"))}
            onclick={props.on_open.reform(|_: MouseEvent| ())}
        >
            <h2 class="tile-title">{&conversation.title}</h2>
            <p class="tile-preview">{preview(conversation)}</p>
            <div class="tile-footer">
                <span class="tile-count">{format!("{} turns", conversation.responses.len())}</span>
                <Button onclick={on_delete} variant={ButtonVariant::Danger} size={ButtonSize::Small}>
                    {"🗑️"}
                </Button>
            </div>
        </div>
    }
}

fn render_inline(text: &str) -> Html {
    html! {
        <>
            {for parse_inline(text).into_iter().map(|span| match span {
                Inline::Text(text) => html! { {text} },
                Inline::Bold(text) => html! { <strong>{text}</strong> },
                Inline::Code(text) => html! { <code class="inline-code">{text}</code> },
            })}
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct MarkdownViewProps {
    pub text: String,
}

#[function_component(MarkdownView)]
pub fn markdown_view(props: &MarkdownViewProps) -> Html {
    html! {
        <div class="markdown">
            {for parse_blocks(&props.text).into_iter().map(|block| match block {
                Block::Heading { level, text } => {
                    let tag = format!("h{}", level.clamp(1, 6));
                    html! { <@{tag} class="md-heading">{render_inline(&text)}</@> }
                }
                Block::Code { language, code } => {
                    let language = language.unwrap_or_else(|| "text".to_string());
                    html! {
                        <div class="code-block">
                            <div class="code-language">{&language}</div>
                            <pre><code class={format!("language-{}", language)}>
                                {for highlight_code(Some(&language), &code).into_iter().map(|(kind, text)| match kind {
                                    TokenKind::Plain => html! { {text} },
                                    kind => html! { <span class={kind.class()}>{text}</span> },
                                })}
                            </code></pre>
                        </div>
                    }
                }
                Block::ListItem(text) => html! { <li class="md-list-item">{render_inline(&text)}</li> },
                Block::Paragraph(text) => html! { <p class="md-paragraph">{render_inline(&text)}</p> },
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResponseBlockProps {
    pub index: usize,
    pub text: String,
    pub mode: ViewMode,
    pub on_copy: Callback<String>,
}

#[function_component(ResponseBlock)]
pub fn response_block(props: &ResponseBlockProps) -> Html {
    let on_copy = {
        let text = response_copy_text(props.mode, &props.text);
        props.on_copy.reform(move |_: MouseEvent| text.clone())
    };

    html! {
        <div class={classes!("response-block", if props.index % 2 == 0 { "turn-user" } else { "turn-assistant" })}>
            <div class="response-header">
                <span class="response-speaker">{speaker(props.index)}</span>
                <Button onclick={on_copy} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"📋"}
                </Button>
            </div>
            {match props.mode {
                ViewMode::Pretty => html! { <MarkdownView text={props.text.clone()} /> },
                _ => html! { <pre class="raw-response">{&props.text}</pre> },
            }}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ConversationViewerProps {
    pub conversation: Conversation,
    pub default_mode: ViewMode,
    pub on_close: Callback<()>,
    pub on_copy: Callback<String>,
}

#[function_component(ConversationViewer)]
pub fn conversation_viewer(props: &ConversationViewerProps) -> Html {
    let mode = use_state(|| props.default_mode);

    {
        let mode = mode.clone();
        use_effect_with(props.default_mode, move |default_mode| {
            mode.set(*default_mode);
            || ()
        });
    }

    let conversation = &props.conversation;

    let on_copy_all = {
        let text = transcript_copy_text(*mode, conversation);
        props.on_copy.reform(move |_: MouseEvent| text.clone())
    };

    let on_mode = |target: ViewMode| {
        let mode = mode.clone();
        Callback::from(move |_: MouseEvent| mode.set(target))
    };

    html! {
        <div class="viewer-panel">
            <div class="viewer-header">
                <h1 class="viewer-title">{&conversation.title}</h1>
                <div class="viewer-actions">
                    {for ViewMode::ALL.iter().map(|target| html! {
                        <Button
                            onclick={on_mode(*target)}
                            variant={if *mode == *target { ButtonVariant::Primary } else { ButtonVariant::Secondary }}
                            size={ButtonSize::Small}
                        >
                            {target.label()}
                        </Button>
                    })}
                    <Button onclick={on_copy_all} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                        {"📋 Copy all"}
                    </Button>
                    <Button onclick={props.on_close.reform(|_| ())} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                        {"✗"}
                    </Button>
                </div>
            </div>

            <div class="viewer-body">
                if *mode == ViewMode::Json {
                    <pre class="json-view">{record_json(conversation)}</pre>
                } else {
                    {for conversation.responses.iter().enumerate().map(|(index, text)| html! {
                        <ResponseBlock
                            key={index}
                            index={index}
                            text={text.clone()}
                            mode={*mode}
                            on_copy={props.on_copy.clone()}
                        />
                    })}
                }
            </div>
        </div>
    }
}
