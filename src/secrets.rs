use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

use crate::SecretsError;


pub type SecretValue = toml::Value;

/// Read-only key-value store of deployment secrets.
///
/// Keys are either flat (`api_key = "..."`) or grouped into sections (`[database]`).
/// `Debug` output never shows values.
#[derive(Clone, Default)]
pub struct Secrets {
    table: toml::Table,
    source: Option<PathBuf>,
}

impl Secrets {
    pub fn from_toml_str(s: &str) -> Result<Self, SecretsError> {
        let table = s
            .parse::<toml::Table>()
            .map_err(|source| SecretsError::Parse { source })?;
        Ok(Self {
            table,
            source: None,
        })
    }

    /// Loads the first of `paths` that exists.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SecretsError> {
        for path in paths {
            let path = path.as_ref();
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(SecretsError::Read {
                        path: path.to_owned(),
                        source,
                    })
                }
            };
            let mut secrets = Self::from_toml_str(&text)?;
            secrets.source = Some(path.to_owned());
            tracing::info!(path = %path.display(), keys = secrets.table.len(), "loaded secrets");
            return Ok(secrets);
        }
        Err(SecretsError::NotFound {
            searched: paths.iter().map(|p| p.as_ref().to_owned()).collect(),
        })
    }

    /// File the secrets were read from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, key: &str) -> Result<&SecretValue, SecretsError> {
        self.table
            .get(key)
            .ok_or_else(|| SecretsError::MissingKey(key.to_owned()))
    }

    /// Looks up a dotted path such as `"database.host"`.
    pub fn get_path(&self, path: &str) -> Result<&SecretValue, SecretsError> {
        lookup(&self.table, path).ok_or_else(|| SecretsError::MissingKey(path.to_owned()))
    }

    /// Looks up a dotted path and converts the value to `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, SecretsError> {
        decode(path, self.get_path(path)?)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }
    pub fn contains_path(&self, path: &str) -> bool {
        lookup(&self.table, path).is_some()
    }

    pub fn section(&self, name: &str) -> Result<SecretsSection<'_>, SecretsError> {
        match self.get_path(name)? {
            SecretValue::Table(table) => Ok(SecretsSection {
                path: name.to_owned(),
                table,
            }),
            _ => Err(SecretsError::NotASection(name.to_owned())),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(|k| k.as_str())
    }
    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("source", &self.source)
            .field("keys", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A named sub-table of [`Secrets`].
#[derive(Clone)]
pub struct SecretsSection<'a> {
    path: String,
    table: &'a toml::Table,
}

impl<'a> SecretsSection<'a> {
    pub fn name(&self) -> &str {
        &self.path
    }
    pub fn get(&self, key: &str) -> Result<&'a SecretValue, SecretsError> {
        self.table
            .get(key)
            .ok_or_else(|| SecretsError::MissingKey(format!("{}.{key}", self.path)))
    }
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SecretsError> {
        decode(&format!("{}.{key}", self.path), self.get(key)?)
    }
    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }
    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.table.keys().map(|k| k.as_str())
    }
}

impl fmt::Debug for SecretsSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsSection")
            .field("name", &self.path)
            .field("keys", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn lookup<'a>(table: &'a toml::Table, path: &str) -> Option<&'a SecretValue> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = table.get(head)?;
    match (rest, value) {
        (None, value) => Some(value),
        (Some(rest), SecretValue::Table(table)) => lookup(table, rest),
        (Some(_), _) => None,
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: &SecretValue) -> Result<T, SecretsError> {
    value
        .clone()
        .try_into()
        .map_err(|source| SecretsError::Decode {
            key: key.to_owned(),
            source,
        })
}
