use contracts::dashboards::d400_monthly_sales::{DashboardSettings, REQUIRED_COLUMNS};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::shared::components::ui::Select;

/// CSV chosen in the file picker, kept client-side and re-sent on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedCsv {
    pub name: String,
    pub text: String,
}

/// Strict UTF-8 decoding; the banner text matches the backend's load error.
fn decode_csv_bytes(bytes: Vec<u8>) -> Result<String, String> {
    String::from_utf8(bytes).map_err(|e| format!("데이터 로드 오류: UTF-8 텍스트가 아닙니다: {}", e))
}

async fn read_file_text(file: web_sys::File) -> Result<String, String> {
    // `File::text()` would replace invalid bytes with U+FFFD
    let array_buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("파일을 읽을 수 없습니다: {:?}", e))?;

    let uint8_array = js_sys::Uint8Array::new(&array_buffer);
    let mut bytes = vec![0; uint8_array.length() as usize];
    uint8_array.copy_to(&mut bytes);

    decode_csv_bytes(bytes)
}

/// `데이터/표시 설정` panel.
#[component]
pub fn Sidebar(
    settings: ReadSignal<Option<DashboardSettings>>,
    unit: RwSignal<String>,
    goal: RwSignal<String>,
    view_mode: RwSignal<String>,
    show_labels: RwSignal<bool>,
    use_brand_primary: RwSignal<bool>,
    upload: RwSignal<Option<UploadedCsv>>,
    /// Reports file picker problems to the dashboard
    on_error: Callback<String>,
) -> impl IntoView {
    let file_input = NodeRef::<leptos::html::Input>::new();

    let unit_options = Signal::derive(move || {
        settings
            .get()
            .map(|s| {
                s.units
                    .into_iter()
                    .map(|u| (u64::from(u.value).to_string(), u.label))
                    .collect()
            })
            .unwrap_or_default()
    });
    let view_options = Signal::derive(move || {
        settings
            .get()
            .map(|s| {
                s.views
                    .into_iter()
                    .map(|v| (v.value.code().to_string(), v.label))
                    .collect()
            })
            .unwrap_or_default()
    });

    let handle_file_select = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };

        let limit = settings.get_untracked().map(|s| s.max_upload_bytes);
        if let Some(limit) = limit {
            if file.size() > limit as f64 {
                on_error.run(format!(
                    "파일이 너무 큽니다: {} bytes (최대 {} bytes)",
                    file.size(),
                    limit
                ));
                input.set_value("");
                return;
            }
        }

        let name = file.name();
        spawn_local(async move {
            match read_file_text(file).await {
                Ok(text) => {
                    log::info!("D400: loaded {} ({} chars)", name, text.len());
                    upload.set(Some(UploadedCsv { name, text }));
                }
                Err(e) => on_error.run(e),
            }
        });
    };

    let reset_to_sample = move |_| {
        upload.set(None);
        if let Some(input) = file_input.get_untracked() {
            input.set_value("");
        }
    };

    let caption = format!(
        "CSV 업로드 (필수: {}) · 월 표기 예: 2024-01",
        REQUIRED_COLUMNS.join(", ")
    );

    view! {
        <aside class="d400-sidebar" aria-label="데이터/표시 설정">
            <h2 class="d400-sidebar__title">"데이터/표시 설정"</h2>
            <p class="d400-sidebar__caption">{caption}</p>

            <Flex vertical=true gap=FlexGap::Medium>
                <div class="form__group">
                    <label class="form__label" for="d400-csv-file">"CSV 업로드"</label>
                    <input
                        id="d400-csv-file"
                        type="file"
                        accept=".csv,text/csv"
                        node_ref=file_input
                        on:change=handle_file_select
                    />
                    {move || upload.get().map(|u| view! {
                        <span class="d400-sidebar__file">{u.name}</span>
                    })}
                </div>

                <Select
                    label="표시 단위"
                    id="d400-unit"
                    value=unit
                    options=unit_options
                    on_change=Callback::new(move |v: String| unit.set(v))
                />

                <div class="form__group">
                    <label class="form__label" for="d400-goal">"연간 목표 매출(원)"</label>
                    <Input
                        input_type=InputType::Number
                        value=goal
                        attr:id="d400-goal"
                        attr:min="0"
                        attr:step="1000000"
                    />
                </div>

                <Select
                    label="보기 모드"
                    id="d400-view"
                    value=view_mode
                    options=view_options
                    on_change=Callback::new(move |v: String| view_mode.set(v))
                />

                <Switch checked=show_labels label="데이터 라벨 표시"/>
                <Switch checked=use_brand_primary label="브랜드 네이비를 본선 색으로 사용"/>

                <Button
                    appearance=ButtonAppearance::Secondary
                    disabled=Signal::derive(move || upload.get().is_none())
                    on_click=reset_to_sample
                >
                    "예시 데이터로 되돌리기"
                </Button>
            </Flex>
        </aside>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_csv_bytes() {
        let text = decode_csv_bytes("월,매출액\n".as_bytes().to_vec()).unwrap();
        assert_eq!(text, "월,매출액\n");
    }

    #[test]
    fn test_decode_csv_bytes_rejects_cp949() {
        // "월" in CP949 / EUC-KR
        let err = decode_csv_bytes(vec![0xBF, 0xF9, b',', b'a']).unwrap_err();
        assert!(err.starts_with("데이터 로드 오류: UTF-8 텍스트가 아닙니다"));
    }
}
