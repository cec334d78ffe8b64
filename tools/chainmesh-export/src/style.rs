//! Per-object color and lighting
//!
//! The converter asks a [`StyleProvider`] once per object, in object order.

/// Silver
pub const DEFAULT_COLOR: [f32; 3] = [0.75, 0.75, 0.75];

/// Glossy, but not too much
pub const DEFAULT_LIGHTING: Lighting = Lighting {
    ambient: 0.1,
    diffuse: 0.7,
    specular: 0.6,
    exponent: 32,
};

/// Phong-style light strengths and specular exponent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub exponent: u32,
}

impl Lighting {
    /// Build from `[ambient, diffuse, specular, exponent]`; the exponent is
    /// truncated to an integer
    pub fn from_array(values: [f32; 4]) -> Self {
        Self {
            ambient: values[0],
            diffuse: values[1],
            specular: values[2],
            exponent: values[3].max(0.0) as u32,
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.ambient, self.diffuse, self.specular, self.exponent as f32]
    }
}

impl Default for Lighting {
    fn default() -> Self {
        DEFAULT_LIGHTING
    }
}

/// Draw parameters of one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectStyle {
    pub color: [f32; 3],
    pub lighting: Lighting,
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            lighting: DEFAULT_LIGHTING,
        }
    }
}

/// Source of per-object styles
pub trait StyleProvider {
    /// Style of object `object_index` (0-based)
    fn next(&mut self, object_index: usize) -> ObjectStyle;
}

/// Every object gets [`ObjectStyle::default`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyles;

impl StyleProvider for DefaultStyles {
    fn next(&mut self, _object_index: usize) -> ObjectStyle {
        ObjectStyle::default()
    }
}

/// Explicit styles by object index; objects past the end get the default
#[derive(Debug, Clone, Default)]
pub struct StyleList {
    styles: Vec<ObjectStyle>,
}

impl StyleList {
    pub fn new(styles: Vec<ObjectStyle>) -> Self {
        Self { styles }
    }
}

impl StyleProvider for StyleList {
    fn next(&mut self, object_index: usize) -> ObjectStyle {
        self.styles.get(object_index).copied().unwrap_or_default()
    }
}
