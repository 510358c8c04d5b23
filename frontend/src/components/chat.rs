use super::super::Model;
use super::{answers_table, results};
use shared::{Message, MessagePayload, Role};
use yew::prelude::*;

pub fn render_chat(model: &Model) -> Html {
    html! {
        <section class="chat">
            if model.conversation.is_empty() {
                { render_welcome(model) }
            } else {
                { for model.conversation.messages().iter().map(|message| render_message(model, message)) }
            }
            <div class="chat-bottom" ref={model.chat_bottom.clone()}></div>
        </section>
    }
}

fn render_welcome(model: &Model) -> Html {
    html! {
        <div class="welcome">
            <h2>{ format!("{} for Sugarcane", model.mode.label()) }</h2>
            <p>{ format!(
                "Upload a photo of the affected plant and answer the questionnaire to check for {}.",
                model.mode.target_name()
            ) }</p>
            <p class="hint">{"Questions you are unsure about can stay on Unknown."}</p>
        </div>
    }
}

fn render_message(model: &Model, message: &Message) -> Html {
    let role_class = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };

    html! {
        <div class={classes!("message", role_class)} key={message.id.clone()}>
            <div class="bubble">
                { render_payload(model, &message.payload) }
            </div>
        </div>
    }
}

fn render_payload(model: &Model, payload: &MessagePayload) -> Html {
    match payload {
        MessagePayload::Submission { mode, kind, image_preview, answers } => {
            let questions = model
                .questions
                .as_ref()
                .map(|bank| bank.for_mode(*mode).to_vec())
                .unwrap_or_default();
            html! {
                <div class="submission">
                    <div class="submission-meta">
                        <span class="mode-badge">{ mode.badge() }</span>
                        <span class="kind">{ format!("Analysis: {}", kind.label()) }</span>
                    </div>
                    if let Some(src) = image_preview {
                        <img class="submission-image" src={src.clone()} alt="Submitted image" />
                    }
                    { answers_table::render_answers_table(&questions, answers) }
                </div>
            }
        }
        MessagePayload::Pending { status } => html! {
            <div class="pending">
                <i class="fa-solid fa-spinner fa-spin"></i>{" "}{ status.clone() }
            </div>
        },
        MessagePayload::Prediction(response) => results::render_prediction(response),
        MessagePayload::Failed { status, error } => html! {
            <div class="failed">
                <p class="failed-status"><i class="fa-solid fa-triangle-exclamation"></i>{" "}{ status.clone() }</p>
                <p class="failed-error">{ error.clone() }</p>
            </div>
        },
    }
}
