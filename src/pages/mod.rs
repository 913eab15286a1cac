use std::rc::Rc;

use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::AppContext;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, Label, Spinner,
};
use crate::list::ListEntry;
use crate::models::ViewKind;
use crate::paste::handle_paste;

const TOAST_MS: i32 = 2000;

fn alert(message: &str) {
    let _ = window().alert_with_message(message);
}

#[component]
pub fn LoginView() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let loading: RwSignal<bool> = RwSignal::new(false);

    let ctx = expect_context::<AppContext>();

    // Identity changes arrive through the provider's observer, so success
    // needs no handling here.
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        loading.set(true);
        ctx.spawn(move |c| async move {
            if let Err(e) = c.sign_in(&email_val, &password_val).await {
                alert(&format!("Error\n{e}"));
            }
            loading.set(false);
        });
    };

    let on_sign_up = move |_: web_sys::MouseEvent| {
        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        loading.set(true);
        ctx.spawn(move |c| async move {
            if let Err(e) = c.sign_up(&email_val, &password_val).await {
                alert(&format!("Error\n{e}"));
            }
            loading.set(false);
        });
    };

    let on_google = move |_: web_sys::MouseEvent| {
        ctx.spawn(move |c| async move {
            if let Err(e) = c.sign_in_interactive().await {
                alert(&format!("Error\n{e}"));
            }
        });
    };

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Notes"</CardTitle>
                    <CardDescription class="text-xs">"Sign in to see your notes."</CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="email" class="text-xs">"Email"</Label>
                            <Input
                                id="email"
                                r#type="email"
                                placeholder="you@example.com"
                                bind_value=email
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input
                                id="password"
                                r#type="password"
                                placeholder="••••••••"
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                "Sign in"
                            </span>
                        </Button>
                    </form>

                    <div class="mt-3 flex flex-col gap-2">
                        <Button
                            class="w-full"
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || loading.get()
                            on:click=on_sign_up
                        >
                            "Sign up"
                        </Button>
                        <Button
                            class="w-full"
                            variant=ButtonVariant::Secondary
                            size=ButtonSize::Sm
                            on:click=on_google
                        >
                            "Sign in with Google"
                        </Button>
                    </div>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn Avatar() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let identity = ctx.state.identity;

    let on_switch = move |_: web_sys::MouseEvent| {
        ctx.spawn(move |c| async move {
            if let Err(e) = c.sign_in_interactive().await {
                alert(&format!("Account switch failed\n{e}"));
            }
        });
    };

    let initial = move || {
        identity
            .get()
            .and_then(|i| i.email)
            .and_then(|e| e.chars().next())
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string())
    };

    view! {
        <button
            class="size-8 overflow-hidden rounded-full border bg-muted text-xs font-medium hover:cursor-pointer"
            title="Switch account"
            on:click=on_switch
        >
            {move || match identity.get().and_then(|i| i.photo_url) {
                Some(src) => view! { <img class="size-full object-cover" src=src alt="" /> }.into_any(),
                None => view! { <span>{initial}</span> }.into_any(),
            }}
        </button>
    }
}

#[component]
pub fn ListView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let entries = ctx.state.entries;

    let on_new = move |_: web_sys::MouseEvent| ctx.spawn(|c| async move { c.create_note().await });

    let render_entry = move |entry: ListEntry| {
        let id_for_open = entry.id.clone();
        let id_for_delete = entry.id.clone();
        view! {
            <li
                class="flex cursor-pointer items-center justify-between gap-3 border-b px-3 py-3 hover:bg-accent/50"
                on:click=move |_: web_sys::MouseEvent| {
                    let id = id_for_open.clone();
                    ctx.spawn(move |c| async move {
                        if let Err(e) = c.navigate_to(ViewKind::Editor, Some(&id)).await {
                            tracing::warn!(error = %e, "opening note failed");
                        }
                    });
                }
            >
                <span class="truncate text-sm font-medium">{entry.title}</span>
                <div class="flex shrink-0 items-center gap-2">
                    <span class="text-xs text-muted-foreground">{entry.updated_label}</span>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        class="h-7 w-7 text-destructive"
                        attr:title="Delete"
                        on:click=move |ev: web_sys::MouseEvent| {
                            ev.stop_propagation();
                            let id = id_for_delete.clone();
                            ctx.spawn(move |c| async move { c.delete_note(&id).await });
                        }
                    >
                        <svg
                            xmlns="http://www.w3.org/2000/svg"
                            width="16"
                            height="16"
                            viewBox="0 0 24 24"
                            fill="none"
                            stroke="currentColor"
                            stroke-width="2"
                            stroke-linecap="round"
                            stroke-linejoin="round"
                            aria-hidden="true"
                        >
                            <path d="M3 6h18" />
                            <path d="M8 6V4h8v2" />
                            <path d="M19 6l-1 14H6L5 6" />
                            <path d="M10 11v6" />
                            <path d="M14 11v6" />
                        </svg>
                    </Button>
                </div>
            </li>
        }
    };

    view! {
        <div class="mx-auto flex w-full max-w-2xl flex-col px-4 py-6">
            <header class="mb-4 flex items-center justify-between">
                <h1 class="text-lg font-semibold">"Notes"</h1>
                <div class="flex items-center gap-2">
                    <Button size=ButtonSize::Sm on:click=on_new>"New note"</Button>
                    <Avatar />
                </div>
            </header>
            <ul class="rounded-md border">
                <For each=move || entries.get() key=|e: &ListEntry| e.id.clone() children=render_entry />
            </ul>
        </div>
    }
}

#[component]
pub fn EditorView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let state = ctx.state;
    let surface: NodeRef<html::Div> = NodeRef::new();

    // Replace the surface contents whenever a note is opened.
    Effect::new(move |_| {
        state.editor_revision.track();
        if let Some(el) = surface.get() {
            el.set_inner_html(&state.editor_content.get_untracked());
        }
    });

    // Also runs after an image paste resolves, possibly once the view is gone.
    let save = move || {
        let Some(el) = surface.try_get_untracked().flatten() else {
            return;
        };
        let title = state.editor_title.get_untracked();
        let content = el.inner_html();
        let text = el.inner_text();
        ctx.spawn(move |c| async move { c.save_editor(&title, &content, &text).await });
    };

    let on_back = move |_: web_sys::MouseEvent| {
        ctx.spawn(|c| async move {
            if let Err(e) = c.navigate_to(ViewKind::List, None).await {
                tracing::warn!(error = %e, "leaving editor failed");
            }
        });
    };

    let on_paste = move |ev: web_sys::ClipboardEvent| {
        if let Some(el) = surface.try_get_untracked().flatten() {
            handle_paste(&ev, &el, Rc::new(save));
        }
    };

    view! {
        <div class="mx-auto flex w-full max-w-2xl flex-col gap-3 px-4 py-6">
            <div class="flex items-center gap-2">
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_back>"← Back"</Button>
            </div>
            <input
                id="title"
                class="w-full bg-transparent text-xl font-semibold outline-none placeholder:text-muted-foreground"
                placeholder="Title"
                prop:value=move || state.editor_title.get()
                on:input=move |ev: web_sys::Event| {
                    state.editor_title.set(event_target_value(&ev));
                    save();
                }
            />
            <div
                id="editor"
                node_ref=surface
                contenteditable="true"
                class="min-h-[60vh] w-full whitespace-pre-wrap break-words text-sm leading-relaxed outline-none [&_img]:max-w-full [&_.video]:relative [&_.video]:aspect-video [&_.video_iframe]:absolute [&_.video_iframe]:inset-0 [&_.video_iframe]:size-full"
                on:input=move |_: web_sys::Event| save()
                on:paste=on_paste
            ></div>
        </div>
    }
}

#[component]
pub fn ToastHost() -> impl IntoView {
    let toast = expect_context::<AppContext>().state.toast;

    Effect::new(move |_| {
        let Some(current) = toast.get() else {
            return;
        };
        let id = current.id;
        let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            wasm_bindgen::closure::Closure::once_into_js(move || {
                if toast.get_untracked().is_some_and(|t| t.id == id) {
                    toast.set(None);
                }
            })
            .as_ref()
            .unchecked_ref(),
            TOAST_MS,
        );
    });

    view! {
        <Show when=move || toast.get().is_some() fallback=|| ().into_view()>
            <div class="fixed bottom-6 left-1/2 -translate-x-1/2 rounded-md bg-foreground px-4 py-2 text-sm text-background shadow-md">
                {move || toast.get().map(|t| t.message)}
            </div>
        </Show>
    }
}
