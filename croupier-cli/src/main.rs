use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use croupier_core::{run, CroupierSettings, Request, Tier};

#[derive(Debug, Parser)]
#[command(name = "croupier", version, about = "Random tiered loadout generator")]
struct Args {
    /// Mod root or its `data` folder.
    #[arg(long)]
    data: PathBuf,

    /// Host item registry snapshot (JSON list of ids or table keyed by id).
    #[arg(long)]
    items: Option<PathBuf>,

    #[arg(long, default_value_t = Tier::Low)]
    tier: Tier,

    #[arg(long, default_value_t = false)]
    gun: bool,

    /// Trader offer id; sets tier and gun from the offer table.
    #[arg(long, conflicts_with_all = ["tier", "gun"])]
    offer: Option<String>,

    #[arg(long, default_value_t = 1)]
    count: u32,

    #[arg(long)]
    seed: Option<u64>,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let request = match args.offer.as_deref() {
        Some(offer) => match Request::from_offer_id(offer) {
            Ok(request) => request,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        },
        None => Request::new(args.tier, args.gun),
    };

    let settings = CroupierSettings {
        data_path: args.data,
        items_path: args.items,
        tier: request.tier,
        needs_gun: request.needs_gun,
        count: args.count,
        seed: args.seed,
        output_path: args.output,
        pretty: args.pretty,
    };

    if let Err(err) = run(settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
