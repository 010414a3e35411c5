use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use ttf_parser::Face;

// Loaded once; only read afterwards, so concurrent renders can share it.
static SYSTEM_FONTS: Lazy<Database> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    db
});

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// Ascent above and descent below the baseline, both positive, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

/// Source of text widths. Implementations must be usable from several renders at once.
pub trait TextMeasurer: Send + Sync {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32;
    fn line_metrics(&self, font: &FontSpec) -> LineMetrics;
}

/// Built-in per-character width table, used when no font can be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMetrics;

impl TextMeasurer for FallbackMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        if font.size <= 0.0 {
            return 0.0;
        }
        text.chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| if ch == '\t' { 4.0 * char_width_factor(' ') } else { char_width_factor(ch) })
            .sum::<f32>()
            * font.size
    }

    fn line_metrics(&self, font: &FontSpec) -> LineMetrics {
        LineMetrics {
            ascent: font.size * 0.8,
            descent: font.size * 0.2,
        }
    }
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Advance widths of a Helvetica-like sans-serif, as a fraction of the em.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '-' => 0.375,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

/// Metrics read from an installed font via fontdb + ttf-parser.
pub struct SystemFontMetrics {
    regular: FontFace,
    bold: Option<FontFace>,
}

impl SystemFontMetrics {
    /// Looks up `font_family` (a CSS-like list) among the system fonts.
    pub fn load(font_family: &str) -> Option<Self> {
        let regular = load_face(&SYSTEM_FONTS, font_family, Weight::NORMAL)?;
        let bold = load_face(&SYSTEM_FONTS, font_family, Weight::BOLD);
        Some(Self { regular, bold })
    }

    fn face(&self, font: &FontSpec) -> &FontFace {
        match (&self.bold, font.bold) {
            (Some(bold), true) => bold,
            _ => &self.regular,
        }
    }
}

impl TextMeasurer for SystemFontMetrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        if text.is_empty() || font.size <= 0.0 {
            return 0.0;
        }
        let normalized = text.replace('\t', "    ");
        self.face(font).measure_width(&normalized, font.size)
    }

    fn line_metrics(&self, font: &FontSpec) -> LineMetrics {
        let face = self.face(font);
        let scale = font.size / face.units_per_em as f32;
        LineMetrics {
            ascent: face.ascender as f32 * scale,
            descent: -(face.descender as f32) * scale,
        }
    }
}

/// The measurer a render actually uses: a system font, or the built-in table.
pub enum Metrics {
    System(SystemFontMetrics),
    Fallback(FallbackMetrics),
}

impl Metrics {
    /// `fast` skips font lookup entirely. A missing font degrades to [`FallbackMetrics`].
    pub fn resolve(font_family: &str, fast: bool) -> Self {
        if fast {
            return Metrics::Fallback(FallbackMetrics);
        }
        match SystemFontMetrics::load(font_family) {
            Some(metrics) => Metrics::System(metrics),
            None => Metrics::Fallback(FallbackMetrics),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Metrics::Fallback(_))
    }
}

impl TextMeasurer for Metrics {
    fn text_width(&self, text: &str, font: &FontSpec) -> f32 {
        match self {
            Metrics::System(metrics) => metrics.text_width(text, font),
            Metrics::Fallback(metrics) => metrics.text_width(text, font),
        }
    }

    fn line_metrics(&self, font: &FontSpec) -> LineMetrics {
        match self {
            Metrics::System(metrics) => metrics.line_metrics(font),
            Metrics::Fallback(metrics) => metrics.line_metrics(font),
        }
    }
}

fn load_face(db: &Database, font_family: &str, weight: Weight) -> Option<FontFace> {
    #[derive(Clone, Copy)]
    enum FamilyToken {
        Generic(fontdb::Family<'static>),
        Name(usize),
    }

    let mut names: Vec<String> = Vec::new();
    let mut order: Vec<FamilyToken> = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "serif" => order.push(FamilyToken::Generic(Family::Serif)),
            "sans-serif" => order.push(FamilyToken::Generic(Family::SansSerif)),
            "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
            "system-ui" | "-apple-system" | "ui-sans-serif" => {
                order.push(FamilyToken::Generic(Family::SansSerif))
            }
            "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
            _ => {
                let idx = names.len();
                names.push(raw.to_string());
                order.push(FamilyToken::Name(idx));
            }
        }
    }
    if order.is_empty() {
        order.push(FamilyToken::Generic(Family::SansSerif));
    }

    let families: Vec<Family<'_>> = order
        .iter()
        .map(|token| match *token {
            FamilyToken::Generic(family) => family,
            FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
        })
        .collect();

    let query = Query {
        families: &families,
        weight,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
        .flatten()
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        let units_per_em = face.units_per_em().max(1);
        let ascender = face.ascender();
        let descender = face.descender();
        drop(face);
        Some(Self {
            data,
            index,
            units_per_em,
            ascender,
            descender,
            ascii_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        if text.is_ascii() {
            let mut width = 0.0f32;
            for byte in text.as_bytes() {
                if *byte == b'\n' {
                    continue;
                }
                let advance = self.ascii_advances[*byte as usize];
                if advance == 0 {
                    width += fallback;
                } else {
                    width += advance as f32 * scale;
                }
            }
            return width.max(0.0);
        }

        // Non-ASCII text re-parses the face; parsing only reads the table directory.
        let Ok(face) = Face::parse(&self.data, self.index) else {
            return text.chars().filter(|ch| *ch != '\n').count() as f32 * fallback;
        };
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            match face.glyph_index(ch) {
                Some(glyph_id) => {
                    width += face.glyph_hor_advance(glyph_id).unwrap_or(0) as f32 * scale;
                }
                None => width += fallback,
            }
        }
        width.max(0.0)
    }
}
