//! Command implementations for the arena scanner.

use arena_data::{BoundingBox, DataError, ScanSession, save_obj};
use arena_reconstruct::{ReconstructionConfig, ReconstructionError, Reconstructor};
use glam::DVec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Could not serialize configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    /// Install the global subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.level)),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Arguments of the `meshify` command.
#[derive(Debug, Clone, Default)]
pub struct MeshifyOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub wall_count: Option<usize>,
    pub ceiling_height: Option<f64>,
}

impl MeshifyOptions {
    /// Load the configuration file, if any, and apply command-line overrides.
    fn resolve_config(&self) -> Result<ReconstructionConfig, ReconstructionError> {
        let mut config = match &self.config {
            Some(path) => ReconstructionConfig::from_path(path)?,
            None => ReconstructionConfig::default(),
        };
        if let Some(wall_count) = self.wall_count {
            config.wall_count = wall_count;
        }
        if let Some(height) = self.ceiling_height {
            config.ceiling_height = height;
        }
        Ok(config)
    }
}

/// Run the reconstruction and write the mesh.
pub fn meshify(options: MeshifyOptions) -> Result<(), AppError> {
    let config = options.resolve_config()?;
    let reconstructor = Reconstructor::new(config)?;
    let session = ScanSession::load(&options.input)?;

    let seed = options.seed.unwrap_or_else(rand::random);
    info!("Cluster seed: {} (pass --seed {} to repeat this run)", seed, seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let reconstruction = reconstructor.run(&session, &mut rng)?;
    save_obj(&reconstruction.mesh, &options.output)?;

    println!(
        "Wrote {}. This is the unprocessed arena mesh: check and clean it up in a 3D editor before use.",
        options.output.display()
    );
    Ok(())
}

/// What `inspect` reports about a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub samples: usize,
    pub body_samples: usize,
    pub bounds: Option<BoundingBox>,
    pub mean_body: Option<DVec3>,
}

impl SessionSummary {
    pub fn new(session: &ScanSession) -> Self {
        Self {
            samples: session.len(),
            body_samples: session.body_positions.len(),
            bounds: session.marker_bounds(),
            mean_body: session.mean_body_position(),
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "samples:        {}", self.samples)?;
        writeln!(f, "body samples:   {}", self.body_samples)?;
        match &self.bounds {
            Some(bounds) => {
                writeln!(f, "marker min:     {:.3}", bounds.min)?;
                writeln!(f, "marker max:     {:.3}", bounds.max)?;
                writeln!(f, "marker extent:  {:.3}", bounds.extent())?;
                writeln!(f, "height range:   {:.3} .. {:.3}", bounds.min.y, bounds.max.y)?;
            }
            None => writeln!(f, "marker bounds:  none")?,
        }
        match self.mean_body {
            Some(mean) => write!(f, "mean body:      {:.3}", mean),
            None => write!(f, "mean body:      none"),
        }
    }
}

pub fn inspect(input: &Path) -> Result<(), AppError> {
    let session = ScanSession::load(input)?;
    println!("{}", SessionSummary::new(&session));
    Ok(())
}

pub fn print_default_config() -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(&ReconstructionConfig::default())?;
    println!("{}", json);
    Ok(())
}
