use {
    std::path::PathBuf,
    serde::Deserialize,
    wheel::fs,
};
#[cfg(windows)] use directories::ProjectDirs;
#[cfg(unix)] use xdg::BaseDirectories;

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) log: bool,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) output_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[cfg(windows)]
    #[error("user folder not found")]
    MissingHomeDir,
}

impl Config {
    /// A missing config file means defaults.
    pub(crate) async fn load() -> Result<Self, Error> {
        #[cfg(unix)] {
            if let Some(config_path) = BaseDirectories::new().find_config_file("tcgages.json") {
                Ok(fs::read_json(config_path).await?)
            } else {
                Ok(Self::default())
            }
        }
        #[cfg(windows)] {
            let config_path = ProjectDirs::from("", "", "tcgages").ok_or(Error::MissingHomeDir)?.config_dir().join("config.json");
            if fs::exists(&config_path).await? {
                Ok(fs::read_json(config_path).await?)
            } else {
                Ok(Self::default())
            }
        }
    }
}
