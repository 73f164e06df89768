//! Rendering attributes and layer precedence.
//!
//! Attribute values are plain data consumed by the overlay sweep; the core
//! never interprets colors or font styles, it only merges them by layer.

/// A packed `0xRRGGBB` color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Build a color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

/// Font style bits.
///
/// Combine with [`FontStyle::with`]; `PLAIN` is the empty style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontStyle(pub u8);

impl FontStyle {
    /// No styling.
    pub const PLAIN: Self = Self(0);
    /// Bold bit.
    pub const BOLD: Self = Self(1);
    /// Italic bit.
    pub const ITALIC: Self = Self(2);

    /// Union of two styles.
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether all bits of `other` are set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// The kind of a text effect (underline family, strikeout, box).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectType {
    /// Straight underline.
    Underline,
    /// Waved underline (typically diagnostics).
    WaveUnderline,
    /// Strikeout through the text.
    Strikeout,
    /// Box drawn around the text.
    Boxed,
}

/// A text effect: the kind and its color, merged as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Effect {
    /// Effect kind.
    pub kind: EffectType,
    /// Effect color.
    pub color: Color,
}

/// A set of rendering attributes with independently optional fields.
///
/// Unset fields are transparent: the overlay sweep takes the first set value
/// per field when scanning contributors in layer order, and falls back to the
/// scheme defaults for anything still unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAttributes {
    /// Foreground (text) color.
    pub foreground: Option<Color>,
    /// Background color.
    pub background: Option<Color>,
    /// Font style bits.
    pub font_style: Option<FontStyle>,
    /// Effect kind and color, treated as a single field.
    pub effect: Option<Effect>,
}

impl TextAttributes {
    /// Attributes with every field unset.
    pub const EMPTY: Self = Self {
        foreground: None,
        background: None,
        font_style: None,
        effect: None,
    };

    /// Attributes with only a background color set.
    pub fn background(color: Color) -> Self {
        Self {
            background: Some(color),
            ..Self::EMPTY
        }
    }

    /// Attributes with only a foreground color set.
    pub fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::EMPTY
        }
    }

    /// Returns `true` if every field is unset.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Fill every unset field of `self` from `other`.
    ///
    /// This is the per-field "first non-null wins" step of the overlay merge:
    /// callers apply it walking contributors from the highest layer down.
    pub fn fill_missing_from(&mut self, other: &TextAttributes) {
        if self.foreground.is_none() {
            self.foreground = other.foreground;
        }
        if self.background.is_none() {
            self.background = other.background;
        }
        if self.font_style.is_none() {
            self.font_style = other.font_style;
        }
        if self.effect.is_none() {
            self.effect = other.effect;
        }
    }
}

/// Fixed relative layers for attribute sources.
///
/// Higher values win during the overlay merge. Range highlighters carry their
/// own layer; the remaining sources sit at fixed positions.
pub mod layer {
    /// Caret row background, below everything else.
    pub const CARET_ROW: i32 = 1000;
    /// Lexical (syntax) highlighting.
    pub const SYNTAX: i32 = 2000;
    /// Additional syntax-like sources (semantic highlighting and the like).
    pub const ADDITIONAL_SYNTAX: i32 = 3000;
    /// Guarded (read-only) block overlay.
    pub const GUARDED_BLOCKS: i32 = 3500;
    /// Warning-severity highlighters.
    pub const WARNING: i32 = 4000;
    /// Error-severity highlighters.
    pub const ERROR: i32 = 5000;
    /// Selection.
    pub const SELECTION: i32 = 6000;
    /// Fold placeholder text, above everything.
    pub const FOLD_PLACEHOLDER: i32 = 6500;
}
