use super::super::{HealthState, Model, Msg};
use yew::prelude::*;

/// Renders the application header with the backend status badge
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let (class, icon, text) = match &model.health {
        HealthState::Checking => ("status-badge checking", "fa-solid fa-spinner fa-spin", "Checking..."),
        HealthState::Online(_) => ("status-badge online", "fa-solid fa-circle-check", "Backend Online"),
        HealthState::Offline(_) => ("status-badge offline", "fa-solid fa-circle-xmark", "Backend Offline"),
    };
    let toggle = ctx.link().callback(|_: MouseEvent| Msg::ToggleStatusPanel);

    html! {
        <header class="app-header">
            <div class="brand">
                <img src="/logo.svg" alt="GreenBytes" class="brand-logo" />
                <div>
                    <h1>{"GreenBytes AI"}</h1>
                    <p class="subtitle">{"Upload a crop image and answer a few questions for a combined diagnosis"}</p>
                </div>
            </div>
            <button class={class} onclick={toggle} title="Show backend status">
                <i class={icon}></i>{" "}{text}
            </button>
        </header>
    }
}
