pub(crate) mod controller;

use std::future::Future;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

use crate::components::ui::Spinner;
use crate::config::AppConfig;
use crate::identity::{FirebaseAuth, IdentityProvider};
use crate::location::BrowserHistory;
use crate::models::{ViewKind, ViewState};
use crate::pages::{EditorView, ListView, LoginView, ToastHost};
use crate::state::AppState;
use crate::store::Firestore;

pub(crate) use controller::AppController;

/// Elements that keep focus when clicked around in the editor.
const FOCUS_KEEPERS: &str = "#editor, #title";

pub(crate) type BrowserController = AppController<FirebaseAuth, Firestore, BrowserHistory>;

#[derive(Clone, Copy)]
pub(crate) struct AppContext {
    pub state: AppState,
    controller: StoredValue<Rc<BrowserController>, LocalStorage>,
}

impl AppContext {
    /// Run a controller operation on the UI task queue.
    pub fn spawn<F, Fut>(&self, op: F)
    where
        F: FnOnce(Rc<BrowserController>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        spawn_local(op(self.controller.get_value()));
    }
}

fn blur_outside_editor(ev: &web_sys::MouseEvent) {
    let inside = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .and_then(|el| el.closest(FOCUS_KEEPERS).ok().flatten())
        .is_some();
    if inside {
        return;
    }
    let active = document()
        .active_element()
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
    if let Some(el) = active {
        let _ = el.blur();
    }
}

#[component]
pub(crate) fn App(config: AppConfig) -> impl IntoView {
    let state = AppState::new();
    let auth = FirebaseAuth::new(&config);
    let store = Firestore::new(&config.firestore_url, &config.project_id, auth.clone());
    let controller = AppController::new(
        state,
        auth.clone(),
        store,
        config.routing.into(),
        BrowserHistory,
    );
    let ctx = AppContext {
        state,
        controller: StoredValue::new_local(Rc::new(controller)),
    };
    provide_context(ctx);

    ctx.controller.get_value().identity().observe(Rc::new(move |identity| {
        ctx.spawn(move |c| async move { c.on_identity(identity).await });
    }));
    ctx.spawn(|c| async move { c.on_location_changed().await });
    spawn_local(async move { auth.restore().await });

    let _popstate = window_event_listener(ev::popstate, move |_: web_sys::PopStateEvent| {
        ctx.spawn(|c| async move { c.on_location_changed().await });
    });
    let _blur = window_event_listener(ev::click, move |ev: web_sys::MouseEvent| {
        if state.view.get_untracked().kind() == ViewKind::Editor {
            blur_outside_editor(&ev);
        }
    });

    view! {
        <main class="min-h-screen bg-background text-foreground">
            {move || {
                if !state.session_ready.get() {
                    return view! {
                        <div class="flex min-h-screen items-center justify-center">
                            <Spinner />
                        </div>
                    }
                    .into_any();
                }
                match state.view.get() {
                    ViewState::Login => view! { <LoginView /> }.into_any(),
                    ViewState::List => view! { <ListView /> }.into_any(),
                    ViewState::Editor(_) => view! { <EditorView /> }.into_any(),
                }
            }}
            <ToastHost />
        </main>
    }
}
