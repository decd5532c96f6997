use std::{collections::HashMap, path::PathBuf, sync::Arc};

/// Font loading and retrieval backed by `fontdb` and `fontdue`.
///
/// The database tracks every available face while actual font data is parsed
/// lazily the first time a face is used for measurement or rasterization.
pub struct FontStore {
    font_db: fontdb::Database,
    /// Faces parsed by fontdue so far. Not every face in the database is
    /// necessarily loaded here.
    loaded: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
    fallback: Option<fontdb::ID>,
}

impl Default for FontStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStore {
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            fallback: None,
        }
    }

    /// Loads the system fonts into the database.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)
    }

    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Resolves a family name to a loaded font.
    ///
    /// Unknown families fall back to the database's sans-serif face so a
    /// misspelled family degrades to readable text instead of a blank skin.
    /// The fallback id is cached after the first resolution.
    pub fn query_family(&mut self, family: &str) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family), fontdb::Family::SansSerif],
            ..fontdb::Query::default()
        };

        let id = match self.font_db.query(&query) {
            Some(id) => id,
            None => {
                if self.fallback.is_none() {
                    log::warn!("no face found for family `{family}` and no sans-serif fallback");
                }
                self.fallback?
            }
        };
        self.fallback.get_or_insert(id);
        self.font(id).map(|font| (id, font))
    }

    /// Retrieves a loaded font by ID, parsing it on first use.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let loaded: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(loaded))
                    }
                    Err(e) => {
                        log::error!("failed to load font (id: {id:?}): {e}");
                        None
                    }
                }
            }
        }
    }
}
