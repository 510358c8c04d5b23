use super::super::{Model, Msg};
use super::utils::debounce;
use gloo_file::File as GlooFile;
use shared::{progress_hint, progress_percentage, AnswerValue, Mode, Question, Readiness, ACCEPTED_IMAGE_TYPES};
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_composer(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <section class="composer">
            { render_mode_selector(model, ctx) }
            { render_image_section(model, ctx) }
            { render_questionnaire(model, ctx) }
            { render_submit_bar(model, ctx) }
        </section>
    }
}

fn render_mode_selector(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="mode-selector">
            { for Mode::iter().map(|mode| {
                let active = model.mode == mode;
                let onclick = ctx.link().callback(move |_: MouseEvent| Msg::SetMode(mode));
                html! {
                    <button
                        class={classes!("mode-btn", active.then_some("active"))}
                        disabled={model.loading}
                        {onclick}
                    >
                        <span class="mode-badge">{ mode.badge() }</span>
                        <span class="mode-target">{ mode.target_name() }</span>
                    </button>
                }
            })}
        </div>
    }
}

fn render_image_section(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let toggle = link.callback(|_: Event| Msg::ToggleIncludeImage);

    html! {
        <div class="image-section">
            <label class="include-image">
                <input type="checkbox" checked={model.include_image} onchange={toggle} disabled={model.loading} />
                {" Include image"}
            </label>
            if model.include_image {
                {
                    match &model.image {
                        Some(image) => render_preview(model, ctx, image.preview.url(), &image.file),
                        None => render_drop_zone(model, ctx),
                    }
                }
            }
        </div>
    }
}

fn render_drop_zone(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.item(0));
        input.set_value("");

        match file {
            Some(file) => Msg::FileSelected(GlooFile::from(file)),
            None => Msg::SetError(Some("No image file selected.".into())),
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    let trigger_file_input = || {
        let input = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"))
            .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok());
        if let Some(input) = input {
            input.click();
        }
    };

    html! {
        <div
            class={classes!("drop-zone", model.is_dragging.then_some("dragging"))}
            ondragover={handle_drag_over}
            ondragleave={handle_drag_leave}
            ondrop={handle_drop}
        >
            <input
                type="file"
                id="file-input"
                accept={ACCEPTED_IMAGE_TYPES.join(",")}
                style="display: none;"
                onchange={handle_change}
            />
            <i class="fa-solid fa-cloud-arrow-up"></i>
            <p>{"Drag & drop, paste, or "}</p>
            <button class="upload-btn" onclick={debounce(300, trigger_file_input)}>
                {"Choose image"}
            </button>
            <p class="hint">{"JPEG or PNG, up to 8MB"}</p>
        </div>
    }
}

fn render_preview(model: &Model, ctx: &Context<Model>, preview: Option<&str>, file: &GlooFile) -> Html {
    let remove = ctx.link().callback(|_: MouseEvent| Msg::RemoveImage);
    html! {
        <div class="image-preview">
            {
                match preview {
                    Some(src) => html! { <img src={src.to_string()} alt={file.name()} /> },
                    None => html! { <div class="preview-loading"><i class="fa-solid fa-spinner fa-spin"></i></div> },
                }
            }
            <div class="preview-info">
                <span class="file-name">{ file.name() }</span>
                <span class="file-size">{ format!("{:.1} KB", file.size() as f64 / 1024.0) }</span>
                <button class="remove-btn" onclick={remove} disabled={model.loading} title="Remove image">
                    <i class="fa-solid fa-xmark"></i>
                </button>
            </div>
        </div>
    }
}

fn render_questionnaire(model: &Model, ctx: &Context<Model>) -> Html {
    let questions = model.active_questions();
    if model.questions.is_none() {
        return html! { <p class="questions-loading">{"Loading questions..."}</p> };
    }

    let answered = model.answered_count();
    let pct = progress_percentage(answered, questions.len());

    html! {
        <div class="questionnaire">
            <div class="questionnaire-header">
                <h3>{ format!("{} Questionnaire", model.mode.short_target()) }</h3>
                <span class="answered-count">{ format!("{}/{} answered", answered, questions.len()) }</span>
            </div>
            <div class="progress">
                <div class="progress-fill" style={format!("width: {:.0}%", pct)}></div>
            </div>
            <p class="progress-hint">{ progress_hint(pct) }</p>
            <ol class="question-list">
                { for questions.iter().map(|question| render_question(model, ctx, question)) }
            </ol>
        </div>
    }
}

fn render_question(model: &Model, ctx: &Context<Model>, question: &Question) -> Html {
    let current = model.answers.get(&question.key);
    html! {
        <li class="question">
            <span class="question-text">{ question.text.clone() }</span>
            <div class="answer-buttons">
                { for AnswerValue::ALL.iter().map(|&value| {
                    let key = question.key.clone();
                    let onclick = ctx.link().callback(move |_: MouseEvent| Msg::SetAnswer(key.clone(), value));
                    html! {
                        <button
                            class={classes!("answer-btn", value.badge_class(), (current == value).then_some("selected"))}
                            disabled={model.loading}
                            {onclick}
                        >
                            { value.label() }
                        </button>
                    }
                })}
            </div>
        </li>
    }
}

fn render_submit_bar(model: &Model, ctx: &Context<Model>) -> Html {
    let total = model.active_questions().len();
    let readiness = Readiness::from_counts(model.answered_count(), total);
    let image_ready = model.image.is_some();
    let submit = ctx.link().callback(|_: MouseEvent| Msg::Submit);

    html! {
        <div class="submit-bar">
            <div class="indicators">
                if model.include_image {
                    <span class={classes!("indicator", if image_ready { "ok" } else { "missing" })}>
                        { if image_ready { "Image Uploaded" } else { "Image Required" } }
                    </span>
                }
                <span class={classes!("indicator", if readiness.is_sufficient() { "ok" } else { "missing" })}>
                    { if readiness.is_sufficient() { "Questions Sufficient" } else { "More questions needed" } }
                </span>
            </div>
            if readiness == Readiness::Ready && (image_ready || !model.include_image) {
                <div class="ready-banner">{"Ready for analysis"}</div>
            }
            <button class="analyze-btn" onclick={submit} disabled={!model.can_submit()}>
                if model.loading {
                    <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</>
                } else {
                    <><i class="fa-solid fa-magnifying-glass"></i>{ format!(" Analyze {}", model.mode.short_target()) }</>
                }
            </button>
        </div>
    }
}
