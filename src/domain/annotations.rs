//! Per-ply annotations: comments, NAGs, evaluations, arrows and the
//! workbook's private markers.

/// Lowest NAG id describing the quality of a move (`!`)
pub const MIN_MOVE_NAG: u16 = 1;
/// Highest NAG id describing the quality of a move (`?!`)
pub const MAX_MOVE_NAG: u16 = 6;
/// Lowest NAG id describing a position assessment (`=`)
pub const MIN_POSITION_NAG: u16 = 11;
/// Highest NAG id describing a position assessment (`-+`)
pub const MAX_POSITION_NAG: u16 = 19;

const NAG_GLYPHS: &[(u16, &str)] = &[
    (1, "!"),
    (2, "?"),
    (3, "!!"),
    (4, "??"),
    (5, "!?"),
    (6, "?!"),
    (11, "="),
    (12, "="),
    (13, "\u{221E}"),
    (14, "\u{2A72}"),
    (15, "\u{2A71}"),
    (16, "\u{00B1}"),
    (17, "\u{2213}"),
    (18, "+-"),
    (19, "-+"),
];

/// Annotation payload carried by a tree node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Free text following the move
    pub comment: Option<String>,
    /// Free text shown before the move (opening a variation)
    pub comment_before_move: Option<String>,
    /// Engine evaluation as text, e.g. `+0.35` or `#-3`
    pub engine_evaluation: Option<String>,
    /// Arrows, e.g. `Ge2e4,Rd7d5`
    pub arrows: Option<String>,
    /// Circled squares, e.g. `Ge4,Rd5`
    pub circles: Option<String>,
    /// Numeric annotation glyphs in the order they were added
    pub nags: Vec<u16>,
    pub is_thumbnail: bool,
    /// References to other articles
    pub references: Option<String>,
    /// Points awarded for finding this move in an exercise
    pub quiz_points: i32,
    /// Bracketed commands we do not understand, kept verbatim (without
    /// the surrounding brackets) so newer files survive a round trip
    pub unprocessed_commands: Vec<String>,
}

impl Annotations {
    /// True if nothing would be written for this node besides the move.
    pub fn is_empty(&self) -> bool {
        self == &Annotations::default()
    }

    /// Adds a NAG given as `$n`. Anything else is ignored.
    pub fn add_nag_token(&mut self, token: &str) -> bool {
        match parse_nag_token(token) {
            Some(id) => {
                self.nags.push(id);
                true
            }
            None => false,
        }
    }

    /// The first NAG in the move-quality range, if any
    pub fn move_nag(&self) -> Option<u16> {
        self.nags
            .iter()
            .copied()
            .find(|id| (MIN_MOVE_NAG..=MAX_MOVE_NAG).contains(id))
    }

    /// The first NAG in the position-assessment range, if any
    pub fn position_nag(&self) -> Option<u16> {
        self.nags
            .iter()
            .copied()
            .find(|id| (MIN_POSITION_NAG..=MAX_POSITION_NAG).contains(id))
    }

    /// Glyph text for display, e.g. `!?` followed by `±`
    pub fn nag_glyphs(&self) -> String {
        self.nags.iter().filter_map(|id| nag_glyph(*id)).collect()
    }
}

/// Parse `$n` into its numeric id
pub fn parse_nag_token(token: &str) -> Option<u16> {
    token.strip_prefix('$')?.parse().ok()
}

/// Map a move suffix such as `!?` to its NAG id
pub fn nag_from_glyph(glyph: &str) -> Option<u16> {
    NAG_GLYPHS
        .iter()
        .find(|(id, g)| *g == glyph && *id <= MAX_MOVE_NAG)
        .map(|(id, _)| *id)
}

/// Display glyph for a NAG id
pub fn nag_glyph(id: u16) -> Option<&'static str> {
    NAG_GLYPHS.iter().find(|(n, _)| *n == id).map(|(_, g)| *g)
}

/// NAGs as they are written after a move: ` $1 $14`
pub fn format_nags(nags: &[u16]) -> String {
    nags.iter().map(|id| format!(" ${}", id)).collect()
}

/// Splits trailing `!`/`?` glyphs off a move token.
/// Returns the bare move and the NAG id of the suffix, if recognized.
pub fn split_move_glyph(token: &str) -> (&str, Option<u16>) {
    let bare = token.trim_end_matches(['!', '?']);
    let suffix = &token[bare.len()..];
    if suffix.is_empty() {
        (bare, None)
    } else {
        (bare, nag_from_glyph(suffix))
    }
}
