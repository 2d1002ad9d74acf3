pub mod config;
pub mod export;
pub mod model;
pub mod render;
pub mod storage;
pub mod views;

#[cfg(feature = "desktop")]
mod commands;

pub use config::{CsvQuoting, ExportOptions, RenderConfig};
pub use model::{CellValue, QueryResult};
pub use views::{ResultViewManager, ViewError};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("resultgrid_lib=info,resultgrid=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(views::ResultViewManager::new())
        .setup(|app| {
            let app_handle = app.handle().clone();

            tauri::async_runtime::block_on(async {
                if let Err(e) = storage::init_local_db(&app_handle).await {
                    tracing::error!(error = %e, "failed to initialize local database");
                    return;
                }

                // Restore the render config saved by a previous session
                let local_db = app_handle.state::<storage::LocalDb>();
                match local_db.get_render_config().await {
                    Ok(Some(config)) => {
                        let views = app_handle.state::<views::ResultViewManager>();
                        if let Err(e) = views.set_config(config).await {
                            tracing::warn!(error = %e, "ignoring stored render config");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "failed to read stored render config"),
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::open_result_view,
            commands::close_result_view,
            commands::render_result_view,
            commands::go_to_page,
            commands::scroll_result_view,
            commands::scroll_result_view_horizontal,
            commands::horizontal_scroll_target,
            commands::activate_cell,
            commands::pointer_down,
            commands::collapse_cell,
            commands::export_csv,
            commands::get_export_history,
            commands::get_render_config,
            commands::set_render_config,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
