use crate::config::{ExportOptions, RenderConfig, EXPORT_FILE_NAME};
use crate::model::QueryResult;
use crate::render::{ExpandedCellRef, HorizontalScroll, RenderPass, ScrollDirection};
use crate::storage::{ExportRecord, LocalDb};
use crate::views::ResultViewManager;
use serde::Serialize;
use tauri::State;

#[derive(Debug, Serialize)]
pub struct OpenedView {
    pub view_id: String,
    pub render: RenderPass,
}

#[tauri::command]
pub async fn open_result_view(
    result: QueryResult,
    views: State<'_, ResultViewManager>,
) -> Result<OpenedView, String> {
    let view_id = views.open(result).await;
    let render = views.render(&view_id).await.map_err(|e| e.to_string())?;
    Ok(OpenedView { view_id, render })
}

#[tauri::command]
pub async fn close_result_view(
    view_id: String,
    views: State<'_, ResultViewManager>,
) -> Result<(), String> {
    views.close(&view_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn render_result_view(
    view_id: String,
    views: State<'_, ResultViewManager>,
) -> Result<RenderPass, String> {
    views.render(&view_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn go_to_page(
    view_id: String,
    page: usize,
    views: State<'_, ResultViewManager>,
) -> Result<RenderPass, String> {
    views
        .update_and_render(&view_id, |view| {
            view.go_to_page(page);
        })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn scroll_result_view(
    view_id: String,
    scroll_top: f64,
    views: State<'_, ResultViewManager>,
) -> Result<RenderPass, String> {
    views
        .update_and_render(&view_id, |view| view.scroll_to(scroll_top))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn scroll_result_view_horizontal(
    view_id: String,
    scroll_left: f64,
    scroll_width: f64,
    client_width: f64,
    views: State<'_, ResultViewManager>,
) -> Result<HorizontalScroll, String> {
    views
        .update(&view_id, |view| {
            view.scroll_horizontal(scroll_left, scroll_width, client_width);
            view.horizontal()
        })
        .await
        .map_err(|e| e.to_string())
}

/// Offset the table should smoothly scroll to for a left/right button press.
#[tauri::command]
pub async fn horizontal_scroll_target(
    view_id: String,
    direction: ScrollDirection,
    views: State<'_, ResultViewManager>,
) -> Result<f64, String> {
    views
        .read(&view_id, |view| view.horizontal_step(direction))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn activate_cell(
    view_id: String,
    row_index: usize,
    cell_index: usize,
    views: State<'_, ResultViewManager>,
) -> Result<RenderPass, String> {
    views
        .update_and_render(&view_id, |view| {
            view.activate_cell(row_index, cell_index);
        })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn pointer_down(
    view_id: String,
    target: Option<ExpandedCellRef>,
    views: State<'_, ResultViewManager>,
) -> Result<RenderPass, String> {
    views
        .update_and_render(&view_id, |view| {
            view.pointer_down(target);
        })
        .await
        .map_err(|e| e.to_string())
}

/// Escape pressed inside the table.
#[tauri::command]
pub async fn collapse_cell(
    view_id: String,
    views: State<'_, ResultViewManager>,
) -> Result<RenderPass, String> {
    views
        .update_and_render(&view_id, |view| view.collapse())
        .await
        .map_err(|e| e.to_string())
}

/// Ask where to save `query_results.csv` and write every row of the view there.
/// Returns false when the user cancels the dialog.
#[tauri::command]
pub async fn export_csv(
    view_id: String,
    options: Option<ExportOptions>,
    app: tauri::AppHandle,
    views: State<'_, ResultViewManager>,
    local_db: State<'_, LocalDb>,
) -> Result<bool, String> {
    use tauri_plugin_dialog::DialogExt;

    let options = options.unwrap_or_default();
    views
        .ensure_exportable(&view_id)
        .await
        .map_err(|e| e.to_string())?;

    let file_path = app
        .dialog()
        .file()
        .add_filter("CSV", &["csv"])
        .set_file_name(EXPORT_FILE_NAME)
        .blocking_save_file();

    let Some(file_path) = file_path else {
        return Ok(false);
    };
    let path = file_path
        .as_path()
        .ok_or_else(|| "Export destination is not a local file".to_string())?
        .to_path_buf();

    let summary = views
        .save_csv(&view_id, &options, &path)
        .await
        .map_err(|e| {
            tracing::error!(view_id = %view_id, error = %e, "CSV export failed");
            e.to_string()
        })?;

    if let Err(e) = local_db
        .add_export(&path.to_string_lossy(), summary.rows, summary.bytes)
        .await
    {
        tracing::warn!(error = %e, "failed to record export history");
    }
    Ok(true)
}

#[tauri::command]
pub async fn get_export_history(
    limit: Option<i64>,
    local_db: State<'_, LocalDb>,
) -> Result<Vec<ExportRecord>, String> {
    local_db
        .get_export_history(limit.unwrap_or(20))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_render_config(
    views: State<'_, ResultViewManager>,
) -> Result<RenderConfig, String> {
    Ok(views.config().await)
}

#[tauri::command]
pub async fn set_render_config(
    config: RenderConfig,
    views: State<'_, ResultViewManager>,
    local_db: State<'_, LocalDb>,
) -> Result<(), String> {
    views
        .set_config(config.clone())
        .await
        .map_err(|e| e.to_string())?;
    local_db
        .save_render_config(&config)
        .await
        .map_err(|e| e.to_string())
}
