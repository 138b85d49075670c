#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use {
    std::{
        io::stderr,
        path::PathBuf,
    },
    chrono::prelude::*,
    tokio::io::AsyncWriteExt as _,
    wheel::{
        fs::{
            self,
            File,
        },
        traits::IoResultExt as _,
    },
    tcgages::{
        card::CardRepository,
        generate::{
            Generation,
            load_enemies,
        },
        options::{
            PackToggles,
            PlayerOptions,
            option_definitions,
        },
        table::Tables,
    },
    crate::{
        config::Config,
        msg::Message,
    },
};

mod config;
mod msg;

#[derive(clap::Parser)]
#[clap(version)]
struct Args {
    /// Directory containing `pack_list.csv` and one folder per pack. Overrides `dataDir` from the config.
    #[clap(long)]
    data_dir: Option<PathBuf>,
    /// Print status updates as machine-readable JSON.
    #[clap(long)]
    json_messages: bool,
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(clap::Subcommand)]
enum Subcommand {
    /// Write the game, item, location, region, category and option tables as JSON.
    Tables {
        /// Overrides `outputDir` from the config.
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Show a pack's HP distribution.
    Distribution {
        pack: String,
    },
    /// Run one player's generation steps and write the result as JSON.
    Generate {
        /// A JSON file with player options. Defaults are used if omitted.
        #[clap(long)]
        options: Option<PathBuf>,
        /// Seed for all random choices. Defaults to the current time.
        #[clap(long)]
        seed: Option<u64>,
        /// Defaults to `generation.json` in the output directory.
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)] Card(#[from] tcgages::card::Error),
    #[error(transparent)] Config(#[from] config::Error),
    #[error(transparent)] Distribution(#[from] tcgages::distribution::Error),
    #[error(transparent)] Generate(#[from] tcgages::generate::Error),
    #[error(transparent)] Json(#[from] serde_json::Error),
    #[error(transparent)] Table(#[from] tcgages::table::Error),
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[error("no data directory configured, pass --data-dir or set dataDir in tcgages.json")]
    MissingDataDir,
}

impl wheel::CustomExit for Error {
    fn exit(self, cmd_name: &'static str) -> ! {
        eprintln!("{cmd_name}: {self}");
        eprintln!("debug info: {self:?}");
        std::process::exit(1)
    }
}

#[wheel::main(custom_exit)]
async fn main(args: Args) -> Result<(), Error> {
    let mut stderr = stderr();
    let config = Config::load().await?;
    let mut log_file = if config.log {
        Some(File::create("tcgages.log").await?)
    } else {
        None
    };

    macro_rules! log {
        ($($fmt:tt)*) => {{
            if let Some(ref mut log_file) = log_file {
                log_file.write_all(Local::now().format("%Y-%m-%d %H:%M:%S ").to_string().as_bytes()).await.at("tcgages.log")?;
                log_file.write_all(format!($($fmt)*).as_bytes()).await.at("tcgages.log")?;
                log_file.write_all(b"\n").await.at("tcgages.log")?;
                log_file.flush().await.at("tcgages.log")?;
            }
        }};
    }

    let data_dir = args.data_dir.or(config.data_dir).ok_or(Error::MissingDataDir)?;
    let output_dir = config.output_dir.unwrap_or_else(|| PathBuf::from("output"));
    Message::Loading { data_dir: &data_dir }.print(args.json_messages, &mut stderr)?;
    log!("loading card data from {}", data_dir.display());
    let repo = CardRepository::new(&data_dir);
    let packs = repo.list_packs()?;
    log!("packs: {packs:?}");
    match args.subcommand {
        Subcommand::Tables { output_dir: output_dir_arg } => {
            let output_dir = output_dir_arg.unwrap_or(output_dir);
            let tables = Tables::build(&repo)?;
            Message::Loaded {
                packs: &packs,
                items: tables.items.len(),
                locations: tables.locations.len(),
                regions: tables.regions.len(),
                categories: tables.categories.len(),
            }.print(args.json_messages, &mut stderr)?;
            for (name, requires) in tables.regions.iter().filter_map(|(hp, region)| Some((tcgages::table::tier_name(hp), region.requires.as_ref()?))) {
                log!("{name}: {requires}");
            }
            fs::create_dir_all(&output_dir).await?;
            let options = option_definitions(packs.iter().map(|pack| &**pack));
            for (file_name, value) in [
                ("game.json", serde_json::to_vec(&tables.game)?),
                ("items.json", serde_json::to_vec(&tables.items)?),
                ("locations.json", serde_json::to_vec(&tables.locations)?),
                ("regions.json", serde_json::to_vec(&tables.regions)?),
                ("categories.json", serde_json::to_vec(&tables.categories)?),
                ("options.json", serde_json::to_vec(&options)?),
            ] {
                let path = output_dir.join(file_name);
                fs::write(&path, value).await?;
                log!("wrote {}", path.display());
                Message::Written { path: &path }.print(args.json_messages, &mut stderr)?;
            }
        }
        Subcommand::Distribution { pack } => {
            let histogram = repo.hp_distribution(&pack)?;
            let percentages = repo.hp_distribution_percentages(&pack)?;
            for (hp, count) in histogram {
                let percentage = percentages.get(&hp).copied().unwrap_or_default();
                Message::Tier { pack: &pack, hp, count, percentage }.print(args.json_messages, &mut stderr)?;
            }
        }
        Subcommand::Generate { options, seed, output } => {
            let options: PlayerOptions = if let Some(path) = options {
                log!("reading player options from {}", path.display());
                fs::read_json(path).await?
            } else {
                PlayerOptions::default()
            };
            let seed = seed.unwrap_or_else(|| Utc::now().timestamp_micros() as u64);
            log!("generating with seed {seed}");
            let tables = Tables::build(&repo)?;
            let toggles = PackToggles::new(packs.iter().map(|pack| &**pack), &options);
            for pack in toggles.removed() {
                log!("pack {pack} removed");
            }
            let enemies = load_enemies(&repo)?;
            let outcome = Generation::new(&tables, &options, toggles, seed).run(&enemies)?;
            Message::Generated {
                precollected: &outcome.precollected,
                placements: outcome.placements.len(),
                pool: outcome.item_pool.len(),
                seed,
            }.print(args.json_messages, &mut stderr)?;
            let output = output.unwrap_or_else(|| output_dir.join("generation.json"));
            if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write_json(&output, &outcome).await?;
            log!("wrote {}", output.display());
            Message::Written { path: &output }.print(args.json_messages, &mut stderr)?;
        }
    }
    Ok(())
}
