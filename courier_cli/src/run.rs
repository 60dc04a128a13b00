use std::path::{Path, PathBuf};

use clap::Args;
use courier::{
    parsers::vrp_file::VrpFileImporter,
    problem::{distance_type::DistanceType, routing_solution::RoutingSolution},
    render::{
        color::Palette,
        display::Viewport,
        route_renderer::RouteRenderer,
    },
    session::{
        session::{Session, SessionUpdate},
        session_config::{SessionConfig, parse_duration},
    },
    solver::{construction_engine::ConstructionEngine, engine::Algorithm},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::{geojson_surface::GeoJsonSurface, inspect::routes_table, svg_view::SvgView};

#[derive(Args)]
pub struct RunArgs {
    /// The .vrp file to solve
    #[arg(short, long)]
    input: PathBuf,

    /// Time budget of the solver (e.g., "30", "30s", "PT1M")
    #[arg(short, long, value_parser = parse_time_limit)]
    time_limit: Option<jiff::SignedDuration>,

    /// first-fit or nearest-neighbour
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Comma separated route colors (e.g., "#ff0000,#0000ff")
    #[arg(long)]
    palette: Option<String>,

    /// JSON file with the session settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file, GeoJSON for road problems and SVG for planar ones
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_time_limit(input: &str) -> Result<jiff::SignedDuration, String> {
    parse_duration(input).map_err(|error| error.to_string())
}

fn load_config(args: &RunArgs) -> anyhow::Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    config.apply_env()?;

    if let Some(time_limit) = args.time_limit {
        config.time_limit = time_limit;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(palette) = &args.palette {
        config.palette = Palette::parse_list(palette)?;
    }

    Ok(config)
}

fn summary(solution: &RoutingSolution) -> String {
    let routes = solution
        .vehicle_indices()
        .filter(|&vehicle| solution.customers_of(vehicle).next().is_some())
        .count();
    format!(
        "routes = {}, unassigned = {}",
        routes,
        solution.unassigned_customers().count()
    )
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let bytes = std::fs::read(&args.input)?;
    let mut session = Session::open(&bytes, &VrpFileImporter, ConstructionEngine, config)?;

    let palette = session.config().palette.clone();
    let mut viewport: Viewport<GeoJsonSurface, SvgView> =
        Viewport::new(RouteRenderer::new(palette.clone()), SvgView::new(palette));

    info!(
        input = ?args.input,
        time_limit = %session.config().time_limit,
        algorithm = %session.config().algorithm,
        "running"
    );

    let bar = ProgressBar::new(session.config().time_limit_secs());
    bar.set_style(ProgressStyle::default_bar().template("[{bar:40}] ({pos}/{len}s) {msg}")?);
    bar.set_message("running...");

    session.start()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    let (status, error) = loop {
        tokio::select! {
            result = &mut ctrl_c, if !stopping => {
                result?;
                session.stop();
                stopping = true;
                bar.set_message("stopping...");
            }
            event = session.next_event() => {
                let Some(event) = event else {
                    anyhow::bail!("session closed before the run finished");
                };

                match session.apply(event) {
                    Some(SessionUpdate::Progress { elapsed, .. }) => bar.set_position(elapsed),
                    Some(SessionUpdate::ProgressFinished) => {
                        bar.set_position(session.config().time_limit_secs());
                    }
                    Some(SessionUpdate::SolutionChanged) => {
                        viewport.show(session.solution())?;
                        bar.set_message(summary(session.solution()));
                    }
                    Some(SessionUpdate::RunFinished { status, error }) => break (status, error),
                    None => {}
                }
            }
        }
    };

    bar.finish_and_clear();
    viewport.show(session.solution())?;
    info!(%status, "{}", summary(session.solution()));
    println!("{}", routes_table(session.solution())?);

    if let Some(output) = &args.output {
        write_output(session.solution().distance_type(), viewport, output)?;
    }

    match error {
        Some(error) => {
            warn!(%error, "solver failed, kept the best solution found");
            Err(error.into())
        }
        None => Ok(()),
    }
}

fn write_output(
    distance_type: DistanceType,
    viewport: Viewport<GeoJsonSurface, SvgView>,
    output: &Path,
) -> anyhow::Result<()> {
    let (mut map, planar) = viewport.into_parts();

    let contents = match distance_type {
        DistanceType::Road => {
            map.on_ready(GeoJsonSurface::default());
            match map.into_surface() {
                Some(surface) => serde_json::to_string_pretty(&surface.into_geojson())?,
                None => String::new(),
            }
        }
        DistanceType::Planar => planar.document().unwrap_or_default().to_string(),
    };

    std::fs::write(output, contents)?;
    info!("wrote {:?}", output);
    Ok(())
}
