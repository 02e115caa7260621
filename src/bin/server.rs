use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use patrol::config::{Params, Stepping, VisitedSet};
use patrol::grid::Pos;
use patrol::render;

const MAX_SCALE: usize = 32;

#[derive(Deserialize)]
struct SolveRequest {
    grid: String,
    parallel: Option<bool>,
    stepping: Option<Stepping>,
    visited: Option<VisitedSet>,
    scale: Option<usize>,
}

#[derive(Serialize)]
struct SolveResponse {
    width: usize,
    height: usize,
    /// Pixels per cell in `layers`, after the render budget is applied.
    scale: usize,
    visited: usize,
    loop_obstacles: usize,
    loop_cells: Vec<Pos>,
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn solve_blocking(req: SolveRequest) -> Result<SolveResponse, ApiError> {
    let defaults = Params::default();
    let params = Params {
        parallel: req.parallel.unwrap_or(defaults.parallel),
        stepping: req.stepping.unwrap_or(defaults.stepping),
        visited: req.visited.unwrap_or(defaults.visited),
        ..defaults
    };
    let requested = req.scale.unwrap_or(8).clamp(1, MAX_SCALE);

    let (report, timings) = patrol::solve(&req.grid, &params)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e))?;

    let w = report.layout.index.width();
    let h = report.layout.index.height();
    let scale = render::fit_scale(w, h, requested).ok_or_else(|| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{w}x{h} grid is too large to render"),
        )
    })?;
    if scale < requested {
        log::debug!("render scale lowered from {requested} to {scale} for {w}x{h} grid");
    }
    let layer = |name: &str, rgba: Vec<u8>| -> Result<Layer, ApiError> {
        let big = render::upscale(&rgba, w, h, scale);
        let data_url = encode_png(&big, w * scale, h * scale)
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
        Ok(Layer {
            name: name.into(),
            data_url,
        })
    };

    let layers = vec![
        layer("patrol", render::render_patrol(&report.layout, &report.path, &[]))?,
        layer(
            "loops",
            render::render_patrol(&report.layout, &report.path, &report.loop_cells),
        )?,
    ];

    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(SolveResponse {
        width: w,
        height: h,
        scale,
        visited: report.visited,
        loop_obstacles: report.loop_obstacles(),
        loop_cells: report.loop_cells,
        layers,
        timings: timing_entries,
    })
}

async fn solve_handler(Json(req): Json<SolveRequest>) -> Result<Json<SolveResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || solve_blocking(req))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))??;

    log::info!(
        "solved {}x{}: visited={} loop_obstacles={}",
        response.width,
        response.height,
        response.visited,
        response.loop_obstacles
    );
    Ok(Json(response))
}

fn app() -> Router {
    Router::new()
        .route("/api/solve", post(solve_handler))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr: SocketAddr = match std::env::var("PATROL_ADDR") {
        Ok(s) => s.parse()?,
        Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
    };
    log::info!("patrol server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "....#.....\n.........#\n..........\n..#.......\n.......#..\n..........\n.#..^.....\n........#.\n#.........\n......#...\n";

    fn request(grid: &str) -> SolveRequest {
        serde_json::from_value(serde_json::json!({ "grid": grid, "stepping": "cell", "scale": 2 }))
            .unwrap()
    }

    #[test]
    fn test_solve_sample() {
        let resp = solve_blocking(request(SAMPLE)).ok().unwrap();
        assert_eq!(resp.visited, 41);
        assert_eq!(resp.loop_obstacles, 6);
        assert_eq!(resp.layers.len(), 2);
        assert!(resp.layers[0].data_url.starts_with("data:image/png;base64,"));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["loop_cells"][0], serde_json::json!({ "x": 3, "y": 6 }));
    }

    /// Width and height from the IHDR chunk of a PNG data URL.
    fn png_dimensions(data_url: &str) -> (u32, u32) {
        let b64 = data_url.strip_prefix("data:image/png;base64,").unwrap();
        let png = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        let be = |i: usize| u32::from_be_bytes(png[i..i + 4].try_into().unwrap());
        (be(16), be(20))
    }

    #[test]
    fn test_large_grid_render_is_clamped() {
        let mut grid = String::with_capacity(801 * 800);
        for y in 0..800 {
            for x in 0..800 {
                grid.push(if (x, y) == (400, 799) { '^' } else { '.' });
            }
            grid.push('\n');
        }
        let req: SolveRequest =
            serde_json::from_value(serde_json::json!({ "grid": grid, "scale": 32 })).unwrap();

        let resp = solve_blocking(req).ok().unwrap();
        assert_eq!(resp.visited, 800);
        assert_eq!(resp.scale, 5);
        for layer in &resp.layers {
            let (w, h) = png_dimensions(&layer.data_url);
            assert_eq!((w, h), (4000, 4000));
            assert!(w as usize * h as usize <= render::MAX_PIXELS);
        }
    }

    #[test]
    fn test_small_grid_keeps_requested_scale() {
        let resp = solve_blocking(request(SAMPLE)).ok().unwrap();
        assert_eq!(resp.scale, 2);
        assert_eq!(png_dimensions(&resp.layers[0].data_url), (20, 20));
    }

    #[test]
    fn test_malformed_grid_is_unprocessable() {
        let Err((status, Json(body))) = solve_blocking(request("..\n.")) else {
            panic!("expected an error");
        };
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.contains("row 1"));
    }
}
