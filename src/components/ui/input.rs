use leptos::prelude::*;
use tw_merge::tw_merge;

/// Text input kept in sync with `bind_value`.
#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] id: String,
    #[prop(optional)] required: bool,
    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "placeholder:text-muted-foreground border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base outline-none transition-[color,box-shadow] md:text-sm",
        "focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50",
        "disabled:cursor-not-allowed disabled:opacity-50",
        class
    );

    let name = id.clone();

    view! {
        <input
            type=r#type
            class=merged_class
            placeholder=placeholder
            id=id
            name=name
            required=required
            prop:value=move || bind_value.get()
            on:input=move |ev: web_sys::Event| bind_value.set(event_target_value(&ev))
        />
    }
}
