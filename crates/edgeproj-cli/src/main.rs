//! edgeproj CLI - hidden-line drawings of triangle meshes
//!
//! Reads a JSON triangle soup, projects it along one or all axis views and
//! writes the visible edges as `LineSegments` JSON.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use edgeproj::edges::extract_feature_edges;
use edgeproj::{
    generate_with, write_separate, Axis, CancelToken, ExportDocument, JobRequest, Projection,
    ProjectionOptions, ProjectionOutput, ProjectionWorker, TriangleSoup, ViewDirection,
};

mod input;

#[derive(Parser)]
#[command(name = "edgeproj")]
#[command(about = "Orthographic hidden-line projection of triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a mesh and write the visible edges
    Project(ProjectArgs),
    /// Display information about a mesh file
    Info {
        /// Mesh JSON file
        input: PathBuf,
        /// Crease angle in degrees used for the edge count
        #[arg(short, long, default_value_t = 50.0)]
        angle: f64,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// Mesh JSON file (`{ "position", "index" }` or `{ "parts": [...] }`)
    input: PathBuf,
    /// Output file, or output directory with --separate
    #[arg(short, long)]
    output: PathBuf,
    /// View to generate: top, bottom, front, back, left, right or all
    #[arg(short, long, value_parser = parse_projection)]
    view: Option<Projection>,
    /// Crease angle in degrees
    #[arg(short, long)]
    angle: Option<f64>,
    /// Skip edges where separate surfaces cut through each other
    #[arg(long)]
    no_intersections: bool,
    /// Process candidate edges in input order
    #[arg(long)]
    no_sort: bool,
    /// Up coordinate written into output segments
    #[arg(long)]
    height: Option<f64>,
    /// Work budget between progress reports, in milliseconds
    #[arg(long)]
    iteration_ms: Option<u64>,
    /// TOML file with projection options; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write one file per view into the output directory
    #[arg(long)]
    separate: bool,
    /// Run the projection on a background worker thread
    #[arg(long)]
    background: bool,
}

impl ProjectArgs {
    fn options(&self) -> Result<ProjectionOptions> {
        let mut options = match &self.config {
            Some(path) => input::load_options(path)?,
            None => ProjectionOptions::default(),
        };
        if let Some(projection) = self.view {
            options.projection = projection;
        }
        if let Some(angle) = self.angle {
            options.angle_threshold = angle;
        }
        if let Some(height) = self.height {
            options.output_height = height;
        }
        if let Some(ms) = self.iteration_ms {
            options.iteration_time_ms = ms;
        }
        if self.no_intersections {
            options.include_intersection_edges = false;
        }
        if self.no_sort {
            options.sort_edges = false;
        }
        options.validate()?;
        Ok(options)
    }
}

fn parse_projection(s: &str) -> std::result::Result<Projection, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(Projection::AllViews);
    }
    s.parse::<ViewDirection>()
        .map(Projection::View)
        .map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Project(args) => {
            project(&args)?;
        }
        Commands::Info { input, angle } => {
            show_info(&input, angle)?;
        }
    }

    Ok(())
}

fn project(args: &ProjectArgs) -> Result<()> {
    let parts = input::load_parts(&args.input)?;
    let options = args.options()?;

    let output = if args.background {
        project_in_background(&parts, &options)?
    } else {
        project_in_place(&parts, &options)?
    };

    for view in &output.views {
        info!(view = %view.direction, segments = view.lines.len(), "projected");
    }

    if args.separate {
        let prefix = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("projection");
        for path in write_separate(&output, &options, &args.output, prefix)? {
            println!("Wrote {}", path.display());
        }
    } else {
        ExportDocument::new(&output, &options).write(&args.output)?;
        println!(
            "Wrote {} segment(s) in {} view(s) to {}",
            output.segment_count(),
            output.views.len(),
            args.output.display()
        );
    }

    Ok(())
}

fn project_in_place(parts: &[TriangleSoup], options: &ProjectionOptions) -> Result<ProjectionOutput> {
    let mut next_report = 0.0;
    let output = generate_with(parts, options, &CancelToken::new(), |progress, partial| {
        if progress.fraction >= next_report {
            debug!(
                fraction = progress.fraction,
                view = %progress.view,
                stage = ?progress.stage,
                segments = partial.len(),
                "progress"
            );
            next_report = progress.fraction + 0.1;
        }
    })?;
    Ok(output)
}

fn project_in_background(
    parts: &[TriangleSoup],
    options: &ProjectionOptions,
) -> Result<ProjectionOutput> {
    let mesh = TriangleSoup::merge(parts)?;
    let mut worker = ProjectionWorker::spawn()?;
    let handle = worker.submit(JobRequest::new(mesh, options.clone()))?;
    let output = handle.wait(|fraction| debug!(fraction, "worker progress"))?;
    worker.dispose();
    Ok(output)
}

fn show_info(path: &Path, angle: f64) -> Result<()> {
    let parts = input::load_parts(path)?;
    for part in &parts {
        part.validate()?;
    }
    let mesh = TriangleSoup::merge(&parts)?;
    let bounds = mesh.bounds();

    println!("mesh: {}", path.display());
    println!("  Parts: {}", parts.len());
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!(
        "  Bounds: [{:.4}, {:.4}, {:.4}] - [{:.4}, {:.4}, {:.4}]",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );

    println!("\nFeature edges at {angle} degrees:");
    for view in ViewDirection::ALL {
        let oriented = mesh.transformed_triangles(&view.transform_about(&bounds.center()));
        let count = extract_feature_edges(&oriented, Axis::Z, angle).len();
        println!("  {view}: {count}");
    }

    Ok(())
}
