use {
    std::{
        fs::File,
        path::{
            Path,
            PathBuf,
        },
    },
    itertools::Itertools as _,
    serde::{
        Deserialize,
        Deserializer,
        Serialize,
        de::DeserializeOwned,
    },
    crate::{
        DEFAULT_PACK,
        Hp,
        TYPE_SEPARATOR,
    },
};

const PACK_LIST: &str = "pack_list.csv";
const CARD_LIST: &str = "card_list.csv";
const EVOLUTION_LIST: &str = "evolutions_list.csv";
const ENERGY_LIST: &str = "energy_list.csv";
const ENEMY_LIST: &str = "enemies.csv";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed row in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
}

/// Non-creature cards leave the HP cell empty or write 0.
fn deserialize_hp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hp, D::Error> {
    let hp = String::deserialize(deserializer)?;
    let hp = hp.trim();
    if hp.is_empty() {
        Ok(0)
    } else {
        hp.parse().map_err(|e| serde::de::Error::custom(format!("invalid HP {hp:?}: {e}")))
    }
}

fn identity(name: &str, set_name: &str, set_number: &str) -> String {
    format!("{name} {set_name} {set_number}")
}

#[derive(Deserialize)]
struct PackRow {
    #[serde(rename = "Pack Directory")]
    directory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Card {
    #[serde(rename = "Card Name")]
    pub name: String,
    #[serde(rename = "Set Name")]
    pub set_name: String,
    #[serde(rename = "Set Number")]
    pub set_number: String,
    #[serde(rename = "Card Type")]
    pub card_type: String,
    #[serde(rename = "HP", deserialize_with = "deserialize_hp")]
    pub hp: Hp,
    #[serde(rename = "Card Image URL", default)]
    pub image_url: String,
}

impl Card {
    /// The item name for this card, unique across sets.
    pub fn item_name(&self) -> String {
        identity(&self.name, &self.set_name, &self.set_number)
    }

    pub fn root_type(&self) -> &str {
        self.card_type.split(TYPE_SEPARATOR).next().unwrap_or_default().trim()
    }

    /// Whether the type has a subtype, like `Supporter - Draw`.
    pub fn is_compound_type(&self) -> bool {
        self.card_type.contains(TYPE_SEPARATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Evolution {
    #[serde(rename = "Evolution Card Name")]
    pub name: String,
    #[serde(rename = "Evolution Set Name")]
    pub set_name: String,
    #[serde(rename = "Evolution Set Number")]
    pub set_number: String,
    #[serde(rename = "Card Image URL", default)]
    pub image_url: String,
}

impl Evolution {
    pub fn item_name(&self) -> String {
        identity(&self.name, &self.set_name, &self.set_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Energy {
    #[serde(rename = "Energy Card Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Enemy {
    #[serde(rename = "Card Name")]
    pub name: String,
    #[serde(rename = "Set Name")]
    pub set_name: String,
    #[serde(rename = "Set Number")]
    pub set_number: String,
    #[serde(rename = "HP", deserialize_with = "deserialize_hp")]
    pub hp: Hp,
    #[serde(rename = "Card Image URL", default)]
    pub image_url: String,
}

impl Enemy {
    pub fn display_name(&self) -> String {
        identity(&self.name, &self.set_name, &self.set_number)
    }
}

/// A pack's cards, read once so the table builder doesn't hit the disk per table.
#[derive(Debug, Clone)]
pub struct Pack {
    pub name: String,
    pub cards: Vec<Card>,
}

/// Read-only access to a data directory laid out as `pack_list.csv` plus one folder per pack.
///
/// Nothing is cached: every call reads its file again, so callers should batch.
#[derive(Debug, Clone)]
pub struct CardRepository {
    data_dir: PathBuf,
}

impl CardRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Pack directory names in listing order, with `_default` moved to the front.
    pub fn list_packs(&self) -> Result<Vec<String>, Error> {
        let mut packs = read_rows::<PackRow>(&self.data_dir.join(PACK_LIST))?
            .into_iter()
            .map(|PackRow { directory }| directory)
            .filter(|directory| !directory.is_empty())
            .unique()
            .collect_vec();
        if let Some(pos) = packs.iter().position(|pack| pack == DEFAULT_PACK) {
            let default = packs.remove(pos);
            packs.insert(0, default);
        }
        Ok(packs)
    }

    pub fn list_cards(&self, pack: &str) -> Result<Vec<Card>, Error> {
        read_rows(&self.data_dir.join(pack).join(CARD_LIST))
    }

    pub fn load_pack(&self, pack: &str) -> Result<Pack, Error> {
        Ok(Pack {
            cards: self.list_cards(pack)?,
            name: pack.to_owned(),
        })
    }

    pub fn list_evolutions(&self, pack: &str) -> Result<Vec<Evolution>, Error> {
        read_rows(&self.data_dir.join(pack).join(EVOLUTION_LIST))
    }

    /// Names of the evolution cards in a pack, deduplicated and sorted.
    pub fn unique_evolutions(&self, pack: &str) -> Result<Vec<String>, Error> {
        Ok(self.list_evolutions(pack)?.iter().map(Evolution::item_name).sorted().dedup().collect())
    }

    pub fn list_energy_cards(&self, pack: &str) -> Result<Vec<Energy>, Error> {
        read_rows(&self.data_dir.join(pack).join(ENERGY_LIST))
    }

    pub fn list_enemy_cards(&self, pack: &str) -> Result<Vec<Enemy>, Error> {
        read_rows(&self.data_dir.join(pack).join(ENEMY_LIST))
    }

    /// Image URL of a card item, or an empty string if no pack has it.
    pub fn card_picture(&self, item_name: &str) -> Result<String, Error> {
        for pack in self.list_packs()? {
            if let Some(card) = self.list_cards(&pack)?.into_iter().find(|card| card.item_name() == item_name) {
                return Ok(card.image_url)
            }
        }
        Ok(String::default())
    }

    pub fn evolution_picture(&self, item_name: &str) -> Result<String, Error> {
        for pack in self.list_packs()? {
            if let Some(evolution) = self.list_evolutions(&pack)?.into_iter().find(|evolution| evolution.item_name() == item_name) {
                return Ok(evolution.image_url)
            }
        }
        Ok(String::default())
    }

    pub fn enemy_picture(&self, display_name: &str) -> Result<String, Error> {
        for pack in self.list_packs()? {
            if let Some(enemy) = self.list_enemy_cards(&pack)?.into_iter().find(|enemy| enemy.display_name() == display_name) {
                return Ok(enemy.image_url)
            }
        }
        Ok(String::default())
    }
}

/// Missing or unreadable files contribute no rows. Rows that don't fit the schema are errors.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Error> {
    let Ok(file) = File::open(path) else { return Ok(Vec::default()) };
    let mut rows = Vec::default();
    for row in csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file).into_deserialize() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Ok(Vec::default()),
            Err(source) => return Err(Error::Csv { path: path.to_owned(), source }),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use {
        itertools::Itertools as _,
        crate::fixture::Fixture,
        super::*,
    };

    #[test]
    fn default_pack_is_listed_first() {
        let fixture = Fixture::new(&["jungle", "_default", "fossil"]);
        assert_eq!(fixture.repo().list_packs().unwrap(), ["_default", "jungle", "fossil"]);
    }

    #[test]
    fn missing_files_read_as_empty() {
        let fixture = Fixture::new(&["_default"]);
        let repo = fixture.repo();
        assert!(repo.list_cards("_default").unwrap().is_empty());
        assert!(repo.list_enemy_cards("_default").unwrap().is_empty());
        assert!(repo.list_cards("not-a-pack").unwrap().is_empty());
        assert!(CardRepository::new(fixture.path().join("nowhere")).list_packs().unwrap().is_empty());
    }

    #[test]
    fn cards_keep_row_order_and_parse_hp() {
        let fixture = Fixture::new(&["_default"]);
        fixture.cards("_default", &[
            ("Pikachu", "Base", "58", "Pokemon - Lightning", 40),
            ("Professor Oak", "Base", "88", "Supporter - Draw", 0),
        ]);
        let cards = fixture.repo().list_cards("_default").unwrap();
        assert_eq!(cards.iter().map(Card::item_name).collect_vec(), ["Pikachu Base 58", "Professor Oak Base 88"]);
        assert_eq!(cards[0].hp, 40);
        assert_eq!(cards[0].root_type(), "Pokemon");
        assert!(cards[1].is_compound_type());
    }

    #[test]
    fn empty_hp_cell_is_zero() {
        let fixture = Fixture::new(&["_default"]);
        fixture.file("_default", CARD_LIST, "Card Name,Set Name,Set Number,Card Type,HP,Card Image URL\nPotion,Base,94,Trainer,,https://example.com/potion.png\n");
        let cards = fixture.repo().list_cards("_default").unwrap();
        assert_eq!(cards[0].hp, 0);
        assert_eq!(cards[0].root_type(), "Trainer");
        assert!(!cards[0].is_compound_type());
    }

    #[test]
    fn malformed_hp_names_the_file() {
        let fixture = Fixture::new(&["_default"]);
        fixture.file("_default", CARD_LIST, "Card Name,Set Name,Set Number,Card Type,HP,Card Image URL\nPikachu,Base,58,Pokemon,forty,\n");
        let Err(Error::Csv { path, .. }) = fixture.repo().list_cards("_default") else { panic!("expected a CSV error") };
        assert!(path.ends_with(CARD_LIST));
    }

    #[test]
    fn evolutions_are_deduplicated_and_sorted() {
        let fixture = Fixture::new(&["_default"]);
        fixture.file("_default", EVOLUTION_LIST, "Evolution Card Name,Evolution Set Name,Evolution Set Number,Card Image URL\nRaichu,Base,14,r\nCharmeleon,Base,24,c\nRaichu,Base,14,r\n");
        assert_eq!(fixture.repo().unique_evolutions("_default").unwrap(), ["Charmeleon Base 24", "Raichu Base 14"]);
    }

    #[test]
    fn pictures_are_looked_up_across_packs() {
        let fixture = Fixture::new(&["_default", "jungle"]);
        fixture.file("jungle", CARD_LIST, "Card Name,Set Name,Set Number,Card Type,HP,Card Image URL\nSnorlax,Jungle,11,Pokemon - Colorless,90,https://example.com/snorlax.png\n");
        fixture.file("jungle", ENEMY_LIST, "Card Name,Set Name,Set Number,HP,Card Image URL\nMewtwo,Base,10,60,https://example.com/mewtwo.png\n");
        let repo = fixture.repo();
        assert_eq!(repo.card_picture("Snorlax Jungle 11").unwrap(), "https://example.com/snorlax.png");
        assert_eq!(repo.enemy_picture("Mewtwo Base 10").unwrap(), "https://example.com/mewtwo.png");
        assert_eq!(repo.card_picture("Missingno Glitch 0").unwrap(), "");
        assert_eq!(repo.evolution_picture("Raichu Base 14").unwrap(), "");
    }

    #[test]
    fn energy_cards_are_read_by_name() {
        let fixture = Fixture::new(&["_default"]);
        fixture.file("_default", ENERGY_LIST, "Energy Card Name\nDouble Colorless Energy\nRainbow Energy\n");
        let energy = fixture.repo().list_energy_cards("_default").unwrap();
        assert_eq!(energy.into_iter().map(|Energy { name }| name).collect_vec(), ["Double Colorless Energy", "Rainbow Energy"]);
    }
}
