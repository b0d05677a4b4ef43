use axum::extract::Multipart;
use contracts::dashboards::d400_monthly_sales::svg::render_chart_default;
use contracts::dashboards::d400_monthly_sales::{
    ChartKind, DashboardOptions, DashboardRequest, DashboardResponse, DashboardSettings, DataSource,
    DisplayUnit, ViewMode, DASHBOARD_TITLE,
};

use super::charts::{build_chart, build_charts};
use super::error::{DashboardError, LoadError};
use super::kpi::compute_kpis;
use super::loader::{decode_upload, load_data};
use super::sample::SAMPLE_CSV;
use super::stats::describe;
use crate::shared::config;

/// Defaults and select options for the sidebar.
pub async fn settings() -> DashboardSettings {
    let dashboard = &config::get().dashboard;
    DashboardSettings::new(dashboard.default_options(), dashboard.max_upload_bytes)
}

/// Dashboard for CSV text posted as JSON, or for the example data when
/// the request carries none.
pub async fn build_dashboard(request: DashboardRequest) -> Result<DashboardResponse, DashboardError> {
    let Some(csv_text) = request.csv_text else {
        return build_sample_dashboard(request.options).await;
    };

    let limit = config::get().dashboard.max_upload_bytes;
    if csv_text.len() > limit {
        return Err(LoadError::TooLarge {
            size: csv_text.len(),
            limit,
        }
        .into());
    }

    let source = DataSource::Upload {
        file_name: request.file_name.unwrap_or_else(|| "upload.csv".to_string()),
    };
    assemble(&csv_text, source, request.options)
}

pub async fn build_sample_dashboard(options: DashboardOptions) -> Result<DashboardResponse, DashboardError> {
    let text = sample_text().await?;
    assemble(&text, DataSource::Sample, options)
}

/// Reads a `file` part plus option fields from a multipart upload.
pub async fn build_dashboard_from_multipart(
    multipart: &mut Multipart,
) -> Result<DashboardResponse, DashboardError> {
    let limit = config::get().dashboard.max_upload_bytes;
    let mut options = config::get().dashboard.default_options();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DashboardError::InvalidOption(format!("multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| DashboardError::InvalidOption(format!("multipart: {}", e)))?;
            tracing::info!("D400: received upload '{}' ({} bytes)", file_name, bytes.len());
            upload = Some((file_name, bytes.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| DashboardError::InvalidOption(format!("multipart: {}", e)))?;
            apply_option_field(&mut options, &name, &value)?;
        }
    }

    match upload {
        Some((file_name, bytes)) => {
            let text = decode_upload(bytes, limit)?;
            assemble(&text, DataSource::Upload { file_name }, options)
        }
        None => build_sample_dashboard(options).await,
    }
}

/// SVG export of one example-data chart; `file` is e.g. `bar_rate.svg`.
pub async fn render_chart_svg(file: &str, options: DashboardOptions) -> Result<String, DashboardError> {
    let stem = file.strip_suffix(".svg").unwrap_or(file);
    let kind = ChartKind::from_file_stem(stem).ok_or_else(|| DashboardError::UnknownChart(file.to_string()))?;
    validate_options(&options)?;

    let text = sample_text().await?;
    let table = load_data(&text, options.unit)?;
    let panel = build_chart(kind, &table, &options);
    Ok(render_chart_default(&panel.spec))
}

/// Applies one form field to `options`. Unknown fields are ignored.
pub fn apply_option_field(options: &mut DashboardOptions, name: &str, value: &str) -> Result<(), DashboardError> {
    let value = value.trim();
    match name {
        "unit" => {
            options.unit = value
                .parse::<u64>()
                .ok()
                .and_then(DisplayUnit::from_divisor)
                .ok_or_else(|| DashboardError::InvalidOption(format!("unit={}", value)))?;
        }
        "goal" => {
            options.goal = value
                .parse::<f64>()
                .map_err(|_| DashboardError::InvalidOption(format!("goal={}", value)))?;
        }
        "view" => {
            options.view =
                ViewMode::from_code(value).ok_or_else(|| DashboardError::InvalidOption(format!("view={}", value)))?;
        }
        "show_labels" => options.show_labels = parse_flag(name, value)?,
        "use_brand_primary" => options.use_brand_primary = parse_flag(name, value)?,
        other => tracing::debug!("D400: ignoring form field '{}'", other),
    }
    Ok(())
}

fn parse_flag(name: &str, value: &str) -> Result<bool, DashboardError> {
    match value {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" | "" => Ok(false),
        _ => Err(DashboardError::InvalidOption(format!("{}={}", name, value))),
    }
}

fn validate_options(options: &DashboardOptions) -> Result<(), DashboardError> {
    if !options.goal.is_finite() {
        return Err(DashboardError::InvalidOption(format!("goal={}", options.goal)));
    }
    Ok(())
}

/// Example CSV: the configured file if set, otherwise the embedded one.
async fn sample_text() -> Result<String, DashboardError> {
    read_sample(config::get().dashboard.sample_csv.as_deref()).await
}

async fn read_sample(configured: Option<&str>) -> Result<String, DashboardError> {
    match configured {
        Some(path) => {
            let path = config::resolve_path(path);
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| anyhow::anyhow!("failed to read sample CSV {}: {}", path.display(), e))?;
            tracing::debug!("D400: using sample CSV {}", path.display());
            Ok(String::from_utf8(bytes).map_err(LoadError::from)?)
        }
        None => Ok(SAMPLE_CSV.to_string()),
    }
}

fn assemble(text: &str, source: DataSource, options: DashboardOptions) -> Result<DashboardResponse, DashboardError> {
    validate_options(&options)?;

    let table = load_data(text, options.unit)?;
    if !table.warnings.is_empty() {
        tracing::warn!("D400: {} rows reported while loading {}", table.warnings.len(), source.label());
    }

    let kpi = compute_kpis(&table, options.goal);
    let charts = build_charts(&table, &options);
    let stats = describe(&table.revenues());

    tracing::info!(
        "D400: built dashboard from {} ({} rows, {} charts)",
        source.label(),
        table.len(),
        charts.len()
    );

    Ok(DashboardResponse {
        title: DASHBOARD_TITLE.to_string(),
        source,
        unit_label: options.unit.label().to_string(),
        kpi,
        charts,
        preview: table.records(),
        stats,
        warnings: table.warnings,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "d400-form-boundary";

    /// Builds a multipart extractor; parts are `(name, file name, value)`.
    async fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        let request = Request::builder()
            .method("POST")
            .uri("/api/d400/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn temp_csv(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("d400_{}_{}.csv", name, std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_sample_dashboard() {
        let response = build_sample_dashboard(DashboardOptions::default()).await.unwrap();
        assert_eq!(response.title, "월별 매출 대시보드");
        assert_eq!(response.source, DataSource::Sample);
        assert_eq!(response.unit_label, "백만원");
        assert_eq!(response.charts.len(), 4);
        assert_eq!(response.preview.len(), 12);
        assert_eq!(response.stats.count, 12);
        assert!(response.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_uploaded_csv_with_view_mode() {
        let request = DashboardRequest {
            csv_text: Some("월,매출액,전년동월,증감률\n2024-02,200,100,100\n2024-01,100,100,0\n".to_string()),
            file_name: Some("sales.csv".to_string()),
            options: DashboardOptions {
                view: ViewMode::Heatmap,
                unit: DisplayUnit::Won,
                ..DashboardOptions::default()
            },
        };
        let response = build_dashboard(request).await.unwrap();
        assert_eq!(
            response.source,
            DataSource::Upload {
                file_name: "sales.csv".to_string()
            }
        );
        assert_eq!(response.charts.len(), 1);
        assert_eq!(response.charts[0].kind, ChartKind::Heatmap);
        assert_eq!(response.preview[0].month, "2024-01");
        assert_eq!(response.kpi.cumulative_total, 300.0);
    }

    #[tokio::test]
    async fn test_missing_column_is_load_error() {
        let request = DashboardRequest {
            csv_text: Some("월,매출액,증감률\n2024-01,1,1\n".to_string()),
            file_name: None,
            options: DashboardOptions::default(),
        };
        let err = build_dashboard(request).await.unwrap_err();
        assert!(matches!(err, DashboardError::Load(LoadError::MissingColumn(ref c)) if c == "전년동월"));
    }

    #[tokio::test]
    async fn test_non_finite_goal_rejected() {
        let options = DashboardOptions {
            goal: f64::INFINITY,
            ..DashboardOptions::default()
        };
        let err = build_sample_dashboard(options).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidOption(_)));
    }

    #[tokio::test]
    async fn test_render_chart_svg() {
        let svg = render_chart_svg("bar_rate.svg", DashboardOptions::default()).await.unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("월별 증감률(%)"));

        let err = render_chart_svg("pie.svg", DashboardOptions::default()).await.unwrap_err();
        assert!(matches!(err, DashboardError::UnknownChart(_)));
    }

    #[test]
    fn test_apply_option_field() {
        let mut options = DashboardOptions::default();
        apply_option_field(&mut options, "unit", "1000").unwrap();
        apply_option_field(&mut options, "goal", " 150000000 ").unwrap();
        apply_option_field(&mut options, "view", "change_rate").unwrap();
        apply_option_field(&mut options, "show_labels", "on").unwrap();
        apply_option_field(&mut options, "unknown", "x").unwrap();
        assert_eq!(options.unit, DisplayUnit::Thousand);
        assert_eq!(options.goal, 150_000_000.0);
        assert_eq!(options.view, ViewMode::ChangeRate);
        assert!(options.show_labels);

        assert!(apply_option_field(&mut options, "unit", "7").is_err());
        assert!(apply_option_field(&mut options, "view", "pie").is_err());
        assert!(apply_option_field(&mut options, "use_brand_primary", "maybe").is_err());
    }

    #[tokio::test]
    async fn test_multipart_file_with_options() {
        let csv = "월,매출액,전년동월,증감률\n2024-02,2000,1000,100\n2024-01,1000,1000,0\n";
        let mut form = multipart(&[
            ("unit", None, "1000"),
            ("file", Some("sales.csv"), csv),
            ("view", None, "cumulative"),
            ("goal", None, "6000"),
            ("show_labels", None, "on"),
        ])
        .await;

        let response = build_dashboard_from_multipart(&mut form).await.unwrap();
        assert_eq!(
            response.source,
            DataSource::Upload {
                file_name: "sales.csv".to_string()
            }
        );
        // fields after the file part still apply
        assert_eq!(response.options.view, ViewMode::Cumulative);
        assert_eq!(response.options.goal, 6000.0);
        assert!(response.options.show_labels);
        assert_eq!(response.unit_label, "천원");
        assert_eq!(response.charts.len(), 1);
        assert_eq!(response.charts[0].kind, ChartKind::Cumulative);
        assert_eq!(response.kpi.cumulative_total, 3000.0);
        assert_eq!(response.kpi.goal_attainment, Some(50.0));
    }

    #[tokio::test]
    async fn test_multipart_without_file_uses_sample() {
        let mut form = multipart(&[("view", None, "trend")]).await;
        let response = build_dashboard_from_multipart(&mut form).await.unwrap();
        assert_eq!(response.source, DataSource::Sample);
        assert_eq!(response.preview.len(), 12);
        assert_eq!(response.charts[0].kind, ChartKind::Trend);
    }

    #[tokio::test]
    async fn test_multipart_rejects_bad_option_and_encoding() {
        let mut form = multipart(&[("unit", None, "7")]).await;
        let err = build_dashboard_from_multipart(&mut form).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidOption(_)));

        // "월" encoded as CP949 is not valid UTF-8
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cp949.csv\"\r\n\r\n",
            b = BOUNDARY
        )
        .into_bytes();
        body.extend_from_slice(&[0xBF, 0xF9, b',', b'1', b'\n']);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap();
        let mut form = Multipart::from_request(request, &()).await.unwrap();
        let err = build_dashboard_from_multipart(&mut form).await.unwrap_err();
        assert!(matches!(err, DashboardError::Load(LoadError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_posted_csv_over_limit_is_too_large() {
        let limit = config::get().dashboard.max_upload_bytes;
        let mut csv_text = String::from("월,매출액,전년동월,증감률\n");
        while csv_text.len() <= limit {
            csv_text.push_str("2024-01,1,1,0\n");
        }
        let size = csv_text.len();
        let request = DashboardRequest {
            csv_text: Some(csv_text),
            file_name: None,
            options: DashboardOptions::default(),
        };
        let err = build_dashboard(request).await.unwrap_err();
        assert!(
            matches!(err, DashboardError::Load(LoadError::TooLarge { size: s, limit: l }) if s == size && l == limit)
        );
    }

    #[tokio::test]
    async fn test_infinite_values_survive_json() {
        let request = DashboardRequest {
            csv_text: Some("월,매출액,전년동월,증감률\n2024-01,100,90,inf\n2024-02,200,100,10\n".to_string()),
            file_name: None,
            options: DashboardOptions {
                unit: DisplayUnit::Won,
                ..DashboardOptions::default()
            },
        };
        let response = build_dashboard(request).await.unwrap();
        assert_eq!(response.preview.len(), 2);
        assert_eq!(response.kpi.avg_change_rate, 5.0);

        let json = serde_json::to_string(&response).unwrap();
        let back: DashboardResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.preview[0].change_rate, f64::INFINITY);
        assert_eq!(back.kpi.avg_revenue, 150.0);
    }

    #[tokio::test]
    async fn test_configured_sample_file() {
        let path = temp_csv("sample", "월,매출액,전년동월,증감률\n2023-12,5,4,25\n".as_bytes());
        let text = read_sample(path.to_str()).await.unwrap();
        assert!(text.contains("2023-12"));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read_sample(None).await.unwrap(), SAMPLE_CSV);

        let missing = std::env::temp_dir().join("d400_missing_sample.csv");
        let err = read_sample(missing.to_str()).await.unwrap_err();
        assert!(matches!(err, DashboardError::Internal(_)));

        let path = temp_csv("cp949", &[0xBF, 0xF9, b'\n']);
        let err = read_sample(path.to_str()).await.unwrap_err();
        assert!(matches!(err, DashboardError::Load(LoadError::Encoding(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
