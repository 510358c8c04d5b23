use super::utils::percent;
use shared::{PredictResponse, REFERENCE_PLACEHOLDER};
use web_sys::HtmlImageElement;
use yew::prelude::*;

pub fn render_prediction(response: &PredictResponse) -> Html {
    let detected = response.fusion.detected;
    let target = response.mode.target_name();

    html! {
        <div class={classes!("results-container", if detected { "detected" } else { "not-detected" })}>
            <div class="result-header">
                <h2>
                    if detected {
                        <><i class="fa-solid fa-triangle-exclamation"></i>{ format!(" {} detected", target) }</>
                    } else {
                        <><i class="fa-solid fa-seedling"></i>{ format!(" No {} detected", target) }</>
                    }
                </h2>
                if !response.fusion.reason.is_empty() {
                    <p class="fusion-reason">{ format!("Decision: {}", response.reason_text()) }</p>
                }
            </div>
            <div class="model-cards">
                { render_yolo_card(response) }
                { render_tabnet_card(response) }
            </div>
            if let Some(trace) = &response.trace {
                if !trace.rules.is_empty() {
                    <ul class="trace-rules">
                        { for trace.rules.iter().map(|rule| html! { <li>{ rule.clone() }</li> }) }
                    </ul>
                }
            }
            if detected {
                { render_reference(response) }
            }
        </div>
    }
}

fn render_yolo_card(response: &PredictResponse) -> Html {
    let yolo = &response.yolo;
    let threshold = response.fusion.thresholds.map(|t| t.yolo);

    html! {
        <div class="model-card">
            <h3><i class="fa-solid fa-image"></i>{" Image model (YOLO)"}</h3>
            if !response.used_image && !yolo.available {
                <p class="muted">{"No image analysed"}</p>
            } else {
                { render_meter(yolo.conf, threshold) }
                <p>{ format!("Detections: {}", yolo.bboxes.len()) }</p>
                <p>{ format!("Label: {}", if yolo.label == 1 { "positive" } else { "negative" }) }</p>
            }
        </div>
    }
}

fn render_tabnet_card(response: &PredictResponse) -> Html {
    let tabnet = &response.tabnet;

    html! {
        <div class="model-card">
            <h3><i class="fa-solid fa-list-check"></i>{" Questionnaire model (TabNet)"}</h3>
            { render_meter(tabnet.conf, response.tabnet_threshold()) }
            <p>{ format!("Label: {}", if tabnet.label == 1 { "positive" } else { "negative" }) }</p>
            if !tabnet.top_positive_keys.is_empty() {
                <p class="top-keys">{ format!("Key signs: {}", tabnet.top_positive_keys.join(", ")) }</p>
            }
        </div>
    }
}

fn render_meter(confidence: f64, threshold: Option<f64>) -> Html {
    html! {
        <div class="confidence-meter">
            <div class="meter-label">{"Confidence:"}</div>
            <div class="meter">
                <div class="meter-fill" style={format!("width: {:.1}%", confidence * 100.0)}></div>
            </div>
            <div class="meter-value">{ percent(confidence) }</div>
            if let Some(threshold) = threshold {
                <div class="meter-threshold">{ format!("threshold {}", percent(threshold)) }</div>
            }
        </div>
    }
}

fn render_reference(response: &PredictResponse) -> Html {
    // Swap to the placeholder once; the placeholder itself never errors back here.
    let onerror = Callback::from(|e: Event| {
        let img: HtmlImageElement = e.target_unchecked_into();
        if !img.src().ends_with(REFERENCE_PLACEHOLDER) {
            img.set_src(REFERENCE_PLACEHOLDER);
        }
    });

    html! {
        <figure class="reference-image">
            <img
                src={response.reference_image_path()}
                alt={format!("Reference: {}", response.mode.short_target())}
                {onerror}
            />
            <figcaption>{ format!("Reference image: {}", response.mode.short_target()) }</figcaption>
        </figure>
    }
}
