use {
    std::{
        fs,
        path::Path,
    },
    tempfile::TempDir,
    crate::{
        Hp,
        card::CardRepository,
    },
};

/// A throwaway data directory with a pack listing.
pub(crate) struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub(crate) fn new(packs: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = csv::Writer::from_path(dir.path().join("pack_list.csv")).unwrap();
        writer.write_record(["Pack Directory"]).unwrap();
        for pack in packs {
            writer.write_record([pack]).unwrap();
            fs::create_dir_all(dir.path().join(pack)).unwrap();
        }
        writer.flush().unwrap();
        Self { dir }
    }

    /// The two-pack layout: `_default` has three 30 HP and two 70 HP cards, `jungle` one 70 HP card.
    pub(crate) fn two_packs() -> Self {
        let fixture = Self::new(&["_default", "jungle"]);
        fixture.cards("_default", &[
            ("Pikachu", "Base", "58", "Pokemon - Lightning", 30),
            ("Bulbasaur", "Base", "44", "Pokemon - Grass", 30),
            ("Charmander", "Base", "46", "Pokemon - Fire", 30),
            ("Charmeleon", "Base", "24", "Pokemon - Fire", 70),
            ("Raichu", "Base", "14", "Pokemon - Lightning", 70),
        ]);
        fixture.cards("jungle", &[
            ("Snorlax", "Jungle", "11", "Pokemon - Colorless", 70),
        ]);
        fixture
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn repo(&self) -> CardRepository {
        CardRepository::new(self.dir.path())
    }

    /// Writes `card_list.csv` for a pack from (name, set name, set number, type, HP) rows.
    pub(crate) fn cards(&self, pack: &str, cards: &[(&str, &str, &str, &str, Hp)]) {
        let mut writer = csv::Writer::from_path(self.dir.path().join(pack).join("card_list.csv")).unwrap();
        writer.write_record(["Card Name", "Set Name", "Set Number", "Card Type", "HP", "Card Image URL"]).unwrap();
        for &(name, set_name, set_number, card_type, hp) in cards {
            let hp = hp.to_string();
            let image_url = format!("https://example.com/{set_name}/{set_number}.png");
            writer.write_record([name, set_name, set_number, card_type, hp.as_str(), image_url.as_str()]).unwrap();
        }
        writer.flush().unwrap();
    }

    pub(crate) fn file(&self, pack: &str, name: &str, contents: &str) {
        fs::create_dir_all(self.dir.path().join(pack)).unwrap();
        fs::write(self.dir.path().join(pack).join(name), contents).unwrap();
    }
}
