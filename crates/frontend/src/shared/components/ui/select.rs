use leptos::prelude::*;

/// Native `<select>` with a label, driven by `(value, label)` option pairs.
///
/// Used where the option list arrives from the backend, so it is rendered
/// reactively from `options`.
#[component]
pub fn Select(
    #[prop(into)] label: String,
    /// `id` of the `<select>`, referenced by the label
    #[prop(into)]
    id: String,
    #[prop(into)] value: Signal<String>,
    on_change: Callback<String>,
    #[prop(into)] options: Signal<Vec<(String, String)>>,
) -> impl IntoView {
    view! {
        <div class="form__group">
            <label class="form__label" for=id.clone()>
                {label}
            </label>
            <select
                id=id
                class="form__select"
                on:change=move |ev| on_change.run(event_target_value(&ev))
            >
                <For
                    each=move || options.get()
                    key=|(val, _)| val.clone()
                    children=move |(val, text)| {
                        let current = val.clone();
                        let is_selected = move || value.get() == current;
                        view! {
                            <option value=val selected=is_selected>
                                {text}
                            </option>
                        }
                    }
                />
            </select>
        </div>
    }
}
