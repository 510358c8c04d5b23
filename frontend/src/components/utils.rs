use super::super::Model;
use gloo_timers::callback::Timeout;
use js_sys::Date;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use yew::prelude::*;

pub fn generate_id() -> u64 {
    static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
    let now = Date::now() as u64;
    let count = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    now * 1000 + (count % 1000)
}

/// Data URL preview of the picked file, tagged with the pick it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preview {
    id: u64,
    url: Option<String>,
}

impl Preview {
    pub fn new(id: u64) -> Self {
        Self { id, url: None }
    }

    /// Stores `url` if it was read for this pick. Reads that finish after
    /// another file was picked are ignored.
    pub fn accept(&mut self, id: u64, url: String) -> bool {
        if id != self.id {
            return false;
        }
        self.url = Some(url);
        true
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || inner_callback()));
    })
}

/// Formats a 0..1 confidence as a percentage with one decimal.
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}
