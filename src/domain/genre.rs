use serde::Serialize;

/// One entry of the fixed genre catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub key: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    /// Selects the hero partial rendered on the genre page.
    pub theme: &'static str,
}

pub const GENRES: [Genre; 5] = [
    Genre { key: "pop", name: "Pop", emoji: "🎤", color: "#2b0219", theme: "pop" },
    Genre { key: "rock", name: "Rock", emoji: "🤘", color: "#2a0505", theme: "rock" },
    Genre { key: "hiphop", name: "Hip-Hop", emoji: "🎤", color: "#45350b", theme: "hiphop" },
    Genre { key: "jazz", name: "Jazz", emoji: "🎺", color: "#02102b", theme: "jazz" },
    Genre { key: "electronique", name: "Électronique", emoji: "🎧", color: "#052022", theme: "electronique" },
];

/// Display used for stored announcements whose genre key is not in the catalog.
pub const UNKNOWN_GENRE: Genre = Genre {
    key: "inconnu",
    name: "Inconnu",
    emoji: "❓",
    color: "#333333",
    theme: "unknown",
};

impl Genre {
    /// Exact lookup on a canonical key.
    pub fn find(key: &str) -> Option<&'static Genre> {
        GENRES.iter().find(|g| g.key == key)
    }

    /// Resolve a user-supplied name or path segment.
    pub fn resolve(name: &str) -> Option<&'static Genre> {
        Self::find(&canonical_genre_key(name))
    }

    /// Lookup that never fails, for rendering stored records.
    pub fn display_for(key: &str) -> &'static Genre {
        Self::find(key).unwrap_or(&UNKNOWN_GENRE)
    }
}

/// Fold a genre name into a catalog key: lowercase, accents stripped,
/// hyphens, underscores and whitespace removed.
pub fn canonical_genre_key(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' | 'í' => 'i',
        'ô' | 'ö' | 'ó' => 'o',
        'ù' | 'û' | 'ü' | 'ú' => 'u',
        'ç' => 'c',
        other => other,
    }
}
