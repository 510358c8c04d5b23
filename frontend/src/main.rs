mod api;
mod components;

use components::handlers;
use components::utils::Preview;
use components::{chat, composer, header, status_panel, utils};
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_storage::{LocalStorage, Storage};
use shared::{
    AnswerShape, AnswerSheet, AnswerValue, Conversation, HealthStatus, Mode, PredictResponse,
    QuestionBank,
};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

const MODE_STORAGE_KEY: &str = "greenbytes.mode";

// Models
pub struct ImageData {
    file: GlooFile,
    preview: Preview,
}

#[derive(Clone, PartialEq)]
pub enum HealthState {
    Checking,
    Online(HealthStatus),
    Offline(HealthStatus),
}

// Yew msg components
pub enum Msg {
    // Startup
    QuestionsLoaded(Result<QuestionBank, String>),

    // Form operations
    SetMode(Mode),
    ToggleIncludeImage,
    FileSelected(GlooFile),
    PreviewReady(u64, String),
    RemoveImage,
    SetAnswer(String, AnswerValue),

    // Analysis operations
    Submit,
    PredictionFinished(String, Result<PredictResponse, String>),

    // Backend status
    CheckHealth,
    HealthChecked(HealthState, String),
    ToggleStatusPanel,

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
pub struct Model {
    questions: Option<QuestionBank>,
    mode: Mode,
    answers: AnswerSheet,
    answer_shape: AnswerShape,
    include_image: bool,
    image: Option<ImageData>,
    conversation: Conversation,
    loading: bool,
    error: Option<String>,
    is_dragging: bool,
    health: HealthState,
    last_health_check: Option<String>,
    show_status: bool,
    paste_listener: Option<EventListener>,
    chat_bottom: NodeRef,
    rendered_messages: usize,
}

impl Model {
    fn active_questions(&self) -> &[shared::Question] {
        self.questions
            .as_ref()
            .map(|bank| bank.for_mode(self.mode).as_slice())
            .unwrap_or_default()
    }

    fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    fn can_submit(&self) -> bool {
        !self.loading
            && !self.conversation.has_pending()
            && self.questions.is_some()
            && (!self.include_image || self.image.is_some())
    }
}

// Yew component implementation
impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mode = LocalStorage::get::<Mode>(MODE_STORAGE_KEY).unwrap_or_default();

        let mut model = Self {
            questions: None,
            mode,
            answers: AnswerSheet::default(),
            answer_shape: AnswerShape::default(),
            include_image: true,
            image: None,
            conversation: Conversation::new(),
            loading: false,
            error: None,
            is_dragging: false,
            health: HealthState::Checking,
            last_health_check: None,
            show_status: false,
            paste_listener: None,
            chat_bottom: NodeRef::default(),
            rendered_messages: 0,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        handlers::load_questions(ctx);
        ctx.link().send_message(Msg::CheckHealth);

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::QuestionsLoaded(result) => handlers::handle_questions_loaded(self, result),

            // Form operations
            Msg::SetMode(mode) => handlers::handle_set_mode(self, mode),
            Msg::ToggleIncludeImage => {
                self.include_image = !self.include_image;
                self.error = None;
                true
            }
            Msg::FileSelected(file) => handlers::handle_file_selected(self, ctx, file),
            Msg::PreviewReady(id, url) => self
                .image
                .as_mut()
                .is_some_and(|image| image.preview.accept(id, url)),
            Msg::RemoveImage => {
                self.image = None;
                true
            }
            Msg::SetAnswer(key, value) => handlers::handle_set_answer(self, &key, value),

            // Analysis operations
            Msg::Submit => handlers::handle_submit(self, ctx),
            Msg::PredictionFinished(id, outcome) => {
                handlers::handle_prediction_finished(self, &id, outcome)
            }

            // Backend status
            Msg::CheckHealth => handlers::handle_check_health(self, ctx),
            Msg::HealthChecked(state, checked_at) => {
                self.health = state;
                self.last_health_check = Some(checked_at);
                true
            }
            Msg::ToggleStatusPanel => {
                self.show_status = !self.show_status;
                true
            }

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { header::render_header(self, ctx) }
                { status_panel::render_status_panel(self, ctx) }

                <main class="main-content">
                    { chat::render_chat(self) }
                    { utils::render_error_message(self) }
                    { composer::render_composer(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"GreenBytes AI | Sugarcane disease & pest analysis"}</p>
                </footer>
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let count = self.conversation.messages().len();
        if count != self.rendered_messages {
            self.rendered_messages = count;
            if let Some(bottom) = self.chat_bottom.cast::<web_sys::Element>() {
                bottom.scroll_into_view();
            }
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
