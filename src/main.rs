// src/main.rs
use std::env;
use std::sync::Arc;

use movielog::app::{Controller, MovieLogApp};
use movielog::catalog::{Catalog, CsvStore};
use movielog::config::{ensure_data_dir, load_config};
use movielog::metadata::OmdbClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn pick_renderer() -> eframe::Renderer {
    match env::var("MOVIELOG_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

/// Startup conditions the window cannot recover from.
fn die(msg: String) -> ! {
    error!("{msg}");
    eprintln!("movielog: {msg}");
    std::process::exit(2);
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cfg = load_config();

    if let Err(e) = ensure_data_dir(&cfg.data_file) {
        die(format!(
            "data directory for {} is not usable: {e}",
            cfg.data_file.display()
        ));
    }

    // A catalog we cannot parse is never overwritten by an empty one.
    let catalog = match Catalog::open(Box::new(CsvStore::new(&cfg.data_file))) {
        Ok(c) => c,
        Err(e) => die(format!(
            "cannot load {}: {e}. Fix or move the file and start again.",
            cfg.data_file.display()
        )),
    };
    info!("{} movie(s) in {}", catalog.len(), catalog.location());

    let fetcher = match OmdbClient::new(&cfg) {
        Ok(c) => c,
        Err(e) => die(e.to_string()),
    };

    let app = MovieLogApp::new(Controller::new(catalog, Arc::new(fetcher)));

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("MovieLog")
            .with_inner_size([860.0, 560.0]),
        ..Default::default()
    };

    match eframe::run_native("MovieLog", options, Box::new(|_cc| Ok(Box::new(app)))) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: on WSL use X/Wayland; otherwise try MOVIELOG_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
