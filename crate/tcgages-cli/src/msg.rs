use {
    std::{
        io::prelude::*,
        path::Path,
    },
    crossterm::style::Print,
    itertools::Itertools as _,
    serde::Serialize,
    wheel::traits::IoResultExt as _,
    tcgages::Hp,
    crate::Error,
};

#[derive(Serialize)]
pub(crate) enum Message<'a> {
    Loading {
        data_dir: &'a Path,
    },
    Loaded {
        packs: &'a [String],
        items: usize,
        locations: usize,
        regions: usize,
        categories: usize,
    },
    Tier {
        pack: &'a str,
        hp: Hp,
        count: usize,
        percentage: f64,
    },
    Generated {
        seed: u64,
        precollected: &'a [String],
        placements: usize,
        pool: usize,
    },
    Written {
        path: &'a Path,
    },
}

impl Message<'_> {
    pub(crate) fn print(self, json: bool, writer: &mut impl Write) -> Result<(), Error> {
        if json {
            serde_json::to_writer(&mut *writer, &self)?;
            writeln!(writer).at_unknown()?;
        } else {
            match self {
                Self::Loading { data_dir } => crossterm::execute!(writer,
                    Print(format_args!("loading card data from {}\n", data_dir.display())),
                ).at_unknown()?,
                Self::Loaded { packs, items, locations, regions, categories } => crossterm::execute!(writer,
                    Print(format_args!(
                        "{} pack{} ({}): {items} items, {locations} locations, {regions} regions, {categories} categories\n",
                        packs.len(),
                        if packs.len() == 1 { "" } else { "s" },
                        packs.iter().format(", "),
                    )),
                ).at_unknown()?,
                Self::Tier { pack, hp, count, percentage } => crossterm::execute!(writer,
                    Print(format_args!("{pack}: {hp} HP: {count} card{} ({:.02}% at or below)\n", if count == 1 { "" } else { "s" }, percentage * 100.0)),
                ).at_unknown()?,
                Self::Generated { seed, precollected, placements, pool } => crossterm::execute!(writer,
                    Print(format_args!("seed {seed}: starting with {}\n", if precollected.is_empty() { "nothing".to_owned() } else { precollected.iter().format(", ").to_string() })),
                    Print(format_args!("{placements} power Pokemon locked, {pool} items left to place\n")),
                ).at_unknown()?,
                Self::Written { path } => crossterm::execute!(writer,
                    Print(format_args!("wrote {}\n", path.display())),
                ).at_unknown()?,
            }
        }
        Ok(())
    }
}
