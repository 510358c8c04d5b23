use super::super::{HealthState, Model, Msg};
use super::utils::debounce;
use yew::prelude::*;

pub fn render_status_panel(model: &Model, ctx: &Context<Model>) -> Html {
    if !model.show_status {
        return html! {};
    }

    let payload = match &model.health {
        HealthState::Checking => None,
        HealthState::Online(health) | HealthState::Offline(health) => {
            serde_json::to_string_pretty(health).ok()
        }
    };
    let checking = matches!(model.health, HealthState::Checking);
    let link = ctx.link().clone();
    let refresh = debounce(300, move || link.send_message(Msg::CheckHealth));

    html! {
        <section class="status-panel">
            <div class="status-panel-header">
                <h3>{"Backend Status"}</h3>
                <button class="refresh-btn" onclick={refresh} disabled={checking}>
                    <i class="fa-solid fa-rotate"></i>{" Refresh"}
                </button>
            </div>
            if let Some(checked_at) = &model.last_health_check {
                <p class="status-checked">{ format!("Last checked: {}", checked_at) }</p>
            }
            {
                match payload {
                    Some(json) => html! { <pre class="status-payload">{ json }</pre> },
                    None => html! { <p class="status-checked">{"Waiting for response..."}</p> },
                }
            }
        </section>
    }
}
