use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub mod catalog;
pub mod chance;
mod compose;
pub mod node;
pub mod packer;
pub mod registry;
pub mod roulette;
pub mod tier;
mod weapon;

pub use catalog::Catalog;
pub use node::GeneratedNode;
pub use registry::ValidItems;
pub use roulette::{Loadout, Roulette};
pub use tier::{Request, Tier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CroupierSettings {
    /// Mod root or its `data` folder.
    pub data_path: PathBuf,
    /// Host item registry snapshot. Without one, every catalog id is valid.
    pub items_path: Option<PathBuf>,
    pub tier: Tier,
    pub needs_gun: bool,
    pub count: u32,
    pub seed: Option<u64>,
    pub output_path: Option<PathBuf>,
    pub pretty: bool,
}

#[derive(Debug, Error)]
pub enum CroupierError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tier '{0}', expected low, mid or top")]
    InvalidTier(String),
    #[error("unknown trader offer: {0}")]
    UnknownOffer(String),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CroupierError>;

/// Everything one `run` produced. `seed` replays the run exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub request: Request,
    pub loadouts: Vec<Loadout>,
}

/// Generate one loadout. All randomness comes from `rng`, so a seeded
/// generator reproduces the same item list for the same catalog and registry.
pub fn generate<R: Rng + ?Sized>(
    catalog: &Catalog,
    valid: &ValidItems,
    request: Request,
    rng: &mut R,
) -> Loadout {
    Roulette::new(catalog, valid, rng).spin(request)
}

pub fn run(settings: CroupierSettings) -> Result<RunReport> {
    if !settings.data_path.exists() {
        return Err(CroupierError::Config(format!(
            "Data path does not exist: {}",
            settings.data_path.display()
        )));
    }
    if settings.count == 0 {
        return Err(CroupierError::Config("count must be at least 1".to_string()));
    }

    let catalog = Catalog::shared(&settings.data_path);
    let valid = match &settings.items_path {
        Some(path) => ValidItems::load(path)?,
        None => ValidItems::from_catalog(&catalog),
    };
    info!("item registry snapshot holds {} template ids", valid.len());

    let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    let request = Request::new(settings.tier, settings.needs_gun);

    let loadouts: Vec<Loadout> = (0..settings.count)
        .map(|_| generate(&catalog, &valid, request, &mut rng))
        .collect();
    info!(
        "seed {seed}: {} {} loadout(s), {} items, {} dropped",
        loadouts.len(),
        request.tier,
        loadouts.iter().map(|l| l.items.len()).sum::<usize>(),
        loadouts.iter().map(|l| l.dropped).sum::<usize>(),
    );

    let report = RunReport {
        seed,
        request,
        loadouts,
    };
    let json = if settings.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &settings.output_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, json)?;
            info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(report)
}
