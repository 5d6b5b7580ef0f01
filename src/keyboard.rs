use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Returned by [`KeyboardLayout::distance`] when either key is not on the grid.
pub const UNMAPPED_DISTANCE: f64 = 4.0;

/// Accented letters that have their own key on AZERTY.
pub const DIRECT_ACCENTS: &str = "éèàùç";

/// Accented letters that need a dead key followed by the base letter.
pub const COMPOSED_ACCENTS: &str = "âêîôûäëïöü";

const QWERTY_ROWS: &[&str] = &["`1234567890-=", "qwertyuiop[]\\", "asdfghjkl;'", "zxcvbnm,./"];

const AZERTY_ROWS: &[&str] = &[
    "&é\"'(-è_çà)=",
    "azertyuiop^$",
    "qsdfghjklmù*",
    "wxcvbn,;:!",
];

const FALLBACK_ROWS: &[&str] = &["1234567890", "qwertyuiop", "asdfghjkl;", "zxcvbnm,./"];

const NEIGHBOR_DELTAS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Qwerty,
    Azerty,
    /// Reduced letters-and-digits grid used for unrecognized layout names.
    Fallback,
}

impl Layout {
    /// Resolve a layout name. Unknown names resolve to [`Layout::Fallback`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "qwerty" => Layout::Qwerty,
            "azerty" => Layout::Azerty,
            _ => Layout::Fallback,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layout::Qwerty => "qwerty",
            Layout::Azerty => "azerty",
            Layout::Fallback => "fallback",
        }
    }

    fn rows(self) -> &'static [&'static str] {
        match self {
            Layout::Qwerty => QWERTY_ROWS,
            Layout::Azerty => AZERTY_ROWS,
            Layout::Fallback => FALLBACK_ROWS,
        }
    }
}

pub fn is_direct_accent(c: char) -> bool {
    DIRECT_ACCENTS.contains(c)
}

pub fn is_composed_accent(c: char) -> bool {
    COMPOSED_ACCENTS.contains(c)
}

/// Strip the diacritic from a composed accent (`ê` -> `e`); other characters pass through.
pub fn composed_base(c: char) -> char {
    if !is_composed_accent(c) {
        return c;
    }
    std::iter::once(c)
        .nfd()
        .find(|ch| !is_combining_mark(*ch))
        .unwrap_or(c)
}

fn lookup_key(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    composed_base(lower)
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    layout: Layout,
    grid: Vec<Vec<char>>,
    positions: HashMap<char, (usize, usize)>,
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl KeyboardLayout {
    pub fn new(layout: Layout) -> Self {
        let grid: Vec<Vec<char>> = layout
            .rows()
            .iter()
            .map(|row| row.chars().collect())
            .collect();

        let mut positions = HashMap::new();
        for (r, row) in grid.iter().enumerate() {
            for (col, &c) in row.iter().enumerate() {
                positions.insert(c, (r, col));
            }
        }

        Self {
            layout,
            grid,
            positions,
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(Layout::from_name(name))
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.grid
    }

    /// Grid cell of `c`, ignoring case and composed accents.
    pub fn position(&self, c: char) -> Option<(usize, usize)> {
        self.positions.get(&lookup_key(c)).copied()
    }

    fn key_position(&self, c: char) -> Option<(usize, usize)> {
        self.positions.get(&composed_base(c)).copied()
    }

    /// Exact grid membership; unlike [`Self::position`] there is no case or
    /// accent folding, so `contains('Q')` is false on every layout.
    pub fn contains(&self, c: char) -> bool {
        self.positions.contains_key(&c)
    }

    /// Keys in the 8-cell neighborhood of `c`, in row-major order.
    ///
    /// Lookup is case-insensitive and composed accents use their base letter.
    /// Unmapped characters have no neighbors.
    pub fn neighbors_of(&self, c: char) -> Vec<char> {
        let Some((row, col)) = self.position(c) else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(NEIGHBOR_DELTAS.len());
        for (dr, dc) in NEIGHBOR_DELTAS {
            let Some(nr) = row.checked_add_signed(dr) else {
                continue;
            };
            let Some(nc) = col.checked_add_signed(dc) else {
                continue;
            };
            if let Some(&key) = self.grid.get(nr).and_then(|keys| keys.get(nc)) {
                out.push(key);
            }
        }
        out
    }

    /// Euclidean distance between two keys in grid units.
    ///
    /// Composed accents are measured from their base letter. Case is kept, so
    /// uppercase letters are off-grid and get [`UNMAPPED_DISTANCE`].
    pub fn distance(&self, a: char, b: char) -> f64 {
        let (Some((r1, c1)), Some((r2, c2))) = (self.key_position(a), self.key_position(b))
        else {
            return UNMAPPED_DISTANCE;
        };
        let dr = r1 as f64 - r2 as f64;
        let dc = c1 as f64 - c2 as f64;
        (dr * dr + dc * dc).sqrt()
    }

    /// Pick a key next to `c`, or any key on the grid when `c` has no neighbors.
    pub fn random_neighbor(&self, c: char, rng: &mut impl Rng) -> char {
        let neighbors = self.neighbors_of(c);
        if let Some(&key) = neighbors.choose(rng) {
            return key;
        }

        let all_keys: Vec<char> = self.grid.iter().flatten().copied().collect();
        // Grids are compiled in and never empty.
        all_keys.choose(rng).copied().unwrap_or(c)
    }
}
