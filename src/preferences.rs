//! Static lookup tables for the onboarding wizard selections, plus the
//! year-range heuristics derived from them.
//!
//! The wizard screens submit small integer ids; anything the tables don't
//! know is dropped silently so a stale client can never fail a whole
//! aggregation over one bad id.

/// Canonical genre tags, keyed by the wizard's genre ids.
const GENRES: &[(u32, &str)] = &[
    (1, "pop"),
    (2, "rock"),
    (3, "hip-hop"),
    (4, "rap"),
    (5, "jazz"),
    (6, "blues"),
    (7, "classical"),
    (8, "country"),
    (9, "electronic"),
    (10, "dance"),
    (11, "metal"),
    (12, "folk"),
    (13, "soul"),
    (14, "r&b"),
    (15, "reggae"),
    (16, "punk"),
    (17, "indie"),
    (18, "latin"),
    (19, "funk"),
    (20, "gospel"),
    (21, "house"),
    (22, "techno"),
    (23, "disco"),
    (24, "alternative"),
];

/// A language selection resolved to the market it scopes searches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Region identifier understood by the catalog search API.
    pub market: &'static str,
    /// Display name of the language.
    pub name: &'static str,
    /// Adjective form, usable in UI copy ("Israeli artists").
    pub demonym: &'static str,
}

const fn language(market: &'static str, name: &'static str, demonym: &'static str) -> Language {
    Language {
        market,
        name,
        demonym,
    }
}

const LANGUAGES: &[(u32, Language)] = &[
    (1, language("US", "English", "American")),
    (2, language("GB", "English", "British")),
    (3, language("ES", "Spanish", "Spanish")),
    (4, language("MX", "Spanish", "Mexican")),
    (5, language("FR", "French", "French")),
    (6, language("DE", "German", "German")),
    (7, language("IT", "Italian", "Italian")),
    (8, language("PT", "Portuguese", "Portuguese")),
    (9, language("BR", "Portuguese", "Brazilian")),
    (10, language("NL", "Dutch", "Dutch")),
    (11, language("RU", "Russian", "Russian")),
    (12, language("IL", "Hebrew", "Israeli")),
    (13, language("SE", "Swedish", "Swedish")),
    (14, language("NO", "Norwegian", "Norwegian")),
    (15, language("DK", "Danish", "Danish")),
    (16, language("FI", "Finnish", "Finnish")),
    (17, language("IS", "Icelandic", "Icelandic")),
    (18, language("PL", "Polish", "Polish")),
    (19, language("CZ", "Czech", "Czech")),
    (20, language("SK", "Slovak", "Slovak")),
    (21, language("HU", "Hungarian", "Hungarian")),
    (22, language("RO", "Romanian", "Romanian")),
    (23, language("BG", "Bulgarian", "Bulgarian")),
    (24, language("GR", "Greek", "Greek")),
    (25, language("TR", "Turkish", "Turkish")),
    (26, language("SA", "Arabic", "Saudi")),
    (27, language("EG", "Arabic", "Egyptian")),
    (28, language("MA", "Arabic", "Moroccan")),
    (29, language("JP", "Japanese", "Japanese")),
    (30, language("KR", "Korean", "Korean")),
    (31, language("TW", "Mandarin", "Taiwanese")),
    (32, language("HK", "Cantonese", "Hongkonger")),
    (33, language("IN", "Hindi", "Indian")),
    (34, language("PK", "Urdu", "Pakistani")),
    (35, language("TH", "Thai", "Thai")),
    (36, language("VN", "Vietnamese", "Vietnamese")),
    (37, language("ID", "Indonesian", "Indonesian")),
    (38, language("MY", "Malay", "Malaysian")),
    (39, language("PH", "Filipino", "Filipino")),
    (40, language("UA", "Ukrainian", "Ukrainian")),
    (41, language("RS", "Serbian", "Serbian")),
    (42, language("HR", "Croatian", "Croatian")),
    (43, language("SI", "Slovenian", "Slovenian")),
    (44, language("EE", "Estonian", "Estonian")),
    (45, language("LV", "Latvian", "Latvian")),
    (46, language("LT", "Lithuanian", "Lithuanian")),
    (47, language("AR", "Spanish", "Argentine")),
    (48, language("CO", "Spanish", "Colombian")),
    (49, language("CL", "Spanish", "Chilean")),
    (50, language("ZA", "English", "South African")),
];

/// The year span the listener dialed in on the era screen.
///
/// The wizard does not validate ordering, so `from > to` must be
/// tolerated; every consumer goes through [`YearRange::normalized`],
/// which swaps inverted bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn normalized(self) -> YearRange {
        if self.from > self.to {
            YearRange {
                from: self.to,
                to: self.from,
            }
        } else {
            self
        }
    }
}

/// Resolve wizard genre ids to canonical tags, dropping unknown ids.
pub fn resolve_genres(ids: &[u32]) -> Vec<&'static str> {
    ids.iter()
        .filter_map(|id| {
            GENRES
                .iter()
                .find(|(genre_id, _)| genre_id == id)
                .map(|(_, tag)| *tag)
        })
        .collect()
}

/// Resolve wizard language ids to market records, dropping unknown ids.
pub fn resolve_languages(ids: &[u32]) -> Vec<Language> {
    ids.iter()
        .filter_map(|id| {
            LANGUAGES
                .iter()
                .find(|(language_id, _)| language_id == id)
                .map(|(_, language)| *language)
        })
        .collect()
}

const DECADE_LABELS: &[(i32, &str)] = &[
    (1950, "1950s 50s fifties"),
    (1960, "1960s 60s sixties"),
    (1970, "1970s 70s seventies"),
    (1980, "1980s 80s eighties"),
    (1990, "1990s 90s nineties"),
    (2000, "2000s 00s two thousands"),
    (2010, "2010s 10s tens"),
];

/// Derive the free-text era fragment appended to catalog queries.
///
/// The rules are evaluated top to bottom and the first match wins; the
/// branches overlap, so reordering them changes behavior.
pub fn era_keyword(range: YearRange) -> &'static str {
    let YearRange { from, to } = range.normalized();

    if to < 1950 {
        return "classic vintage jazz blues early";
    }
    for &(decade, label) in DECADE_LABELS {
        if from >= decade && to <= decade + 9 {
            return label;
        }
    }
    // The newest decade has no upper bound.
    if from >= 2020 {
        return "2020s 20s twenties";
    }
    if from < 2000 && to < 2010 {
        return "classic retro";
    }
    if from >= 2000 && to >= 2020 {
        return "modern contemporary";
    }
    if from < 1990 {
        return "vintage classic";
    }
    ""
}

/// Popularity cut applied to merged candidates, derived from the era.
///
/// Catalog popularity tracks current relevance, so older-era selections
/// cut today's mega-popular acts and very recent selections cut the
/// long tail. A heuristic, not ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularityRule {
    /// Keep candidates strictly below the bound.
    Below(u32),
    /// Keep candidates strictly above the bound.
    Above(u32),
    /// Keep everything.
    All,
}

impl PopularityRule {
    pub fn keeps(self, popularity: u32) -> bool {
        match self {
            PopularityRule::Below(bound) => popularity < bound,
            PopularityRule::Above(bound) => popularity > bound,
            PopularityRule::All => true,
        }
    }
}

/// First-match-wins, same ordering caveat as [`era_keyword`].
pub fn era_popularity_rule(range: YearRange) -> PopularityRule {
    let YearRange { from, to } = range.normalized();

    if to < 1970 {
        PopularityRule::Below(80)
    } else if to < 2000 {
        PopularityRule::Below(85)
    } else if from >= 2020 {
        PopularityRule::Above(50)
    } else {
        PopularityRule::All
    }
}
