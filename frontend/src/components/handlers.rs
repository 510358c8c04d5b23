use super::super::{HealthState, ImageData, Model, Msg, MODE_STORAGE_KEY};
use super::utils::{generate_id, Preview};
use crate::api;
use gloo_file::File as GlooFile;
use gloo_storage::{LocalStorage, Storage};
use shared::{validate_upload, AnswerSheet, AnswerValue, Mode, PredictResponse, QuestionBank, SubmissionKind, UploadError};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

pub fn load_questions(ctx: &Context<Model>) {
    let link = ctx.link().clone();
    spawn_local(async move {
        link.send_message(Msg::QuestionsLoaded(api::fetch_questions().await));
    });
}

pub fn handle_questions_loaded(model: &mut Model, result: Result<QuestionBank, String>) -> bool {
    match result {
        Ok(bank) => {
            model.answers = AnswerSheet::for_questions(bank.for_mode(model.mode));
            model.questions = Some(bank);
        }
        Err(e) => {
            gloo_console::error!(format!("Failed to load questions: {}", e));
            model.error = Some(e);
        }
    }
    true
}

pub fn handle_set_mode(model: &mut Model, mode: Mode) -> bool {
    if model.mode == mode {
        return false;
    }
    model.mode = mode;
    if let Err(e) = LocalStorage::set(MODE_STORAGE_KEY, mode) {
        log::warn!("Failed to persist mode: {}", e);
    }
    model.answers = AnswerSheet::for_questions(model.active_questions());
    model.error = None;
    true
}

pub fn handle_set_answer(model: &mut Model, key: &str, value: AnswerValue) -> bool {
    match model.answers.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Ignoring answer: {}", e);
            false
        }
    }
}

pub fn handle_file_selected(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    if let Err(e) = validate_upload(&file.raw_mime_type(), file.size()) {
        model.error = Some(e.to_string());
        return true;
    }

    let id = generate_id();
    model.error = None;
    model.image = Some(ImageData {
        file: file.clone(),
        preview: Preview::new(id),
    });

    let link = ctx.link().clone();
    spawn_local(async move {
        match gloo_file::futures::read_as_data_url(&file).await {
            Ok(url) => link.send_message(Msg::PreviewReady(id, url)),
            Err(e) => log::warn!("Failed to read image preview: {}", e),
        }
    });

    true
}

pub fn handle_submit(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.loading {
        return false;
    }

    let image = if model.include_image {
        match &model.image {
            Some(image) => Some((image.file.clone(), image.preview.url().map(str::to_string))),
            None => {
                model.error = Some(UploadError::Missing.to_string());
                return true;
            }
        }
    } else {
        None
    };

    let kind = if image.is_some() {
        SubmissionKind::Combined
    } else {
        SubmissionKind::AnswersOnly
    };
    let mode = model.mode;
    let wire_answers = model
        .answers
        .to_wire(model.answer_shape, model.active_questions());
    let (file, preview) = image.unzip();
    let pending_id = model
        .conversation
        .begin(mode, kind, preview.flatten(), model.answers.clone());

    model.loading = true;
    model.error = None;
    log::info!("Submitting {} analysis for {}", kind.label(), mode);

    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = api::predict(mode, wire_answers, file).await;
        link.send_message(Msg::PredictionFinished(pending_id, outcome));
    });

    true
}

pub fn handle_prediction_finished(
    model: &mut Model,
    pending_id: &str,
    outcome: Result<PredictResponse, String>,
) -> bool {
    if let Err(e) = &outcome {
        gloo_console::error!(format!("Prediction failed: {}", e));
    }
    if !model.conversation.resolve(pending_id, outcome) {
        log::warn!("No pending message with id {}", pending_id);
    }
    model.loading = false;
    model.image = None;
    true
}

pub fn handle_check_health(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.health = HealthState::Checking;

    let link = ctx.link().clone();
    spawn_local(async move {
        let health = api::check_health().await;
        let state = if health.ok {
            HealthState::Online(health)
        } else {
            HealthState::Offline(health)
        };
        let checked_at = String::from(js_sys::Date::new_0().to_locale_time_string("en-US"));
        link.send_message(Msg::HealthChecked(state, checked_at));
    });

    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        process_file_list(ctx, file_list);
    }

    true
}

pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if !model.include_image {
        return false;
    }
    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        if file_list.length() > 0 {
            event.prevent_default();
            process_file_list(ctx, file_list);
            return true;
        }
    }
    false
}

// Only the first file is used; validation happens in `handle_file_selected`.
pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    match file_list.item(0) {
        Some(file) => ctx.link().send_message(Msg::FileSelected(GlooFile::from(file))),
        None => ctx
            .link()
            .send_message(Msg::SetError(Some("No image file found.".into()))),
    }
}
