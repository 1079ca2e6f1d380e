use crate::ancestry::AncestorNumber;

/// Generation palette: red, green, blue, gold, cyan, purple, light blue,
/// light green.
pub const LINE_COLORS: [&str; 8] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFB300", "#00FFFF", "#FF00FF", "#7777FF", "#80FF80",
];

/// Colors indexed by generation, wrapping around when the tree is deeper
/// than the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    colors: Vec<String>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            colors: LINE_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ColorTable {
    /// `None` for an empty palette.
    pub fn new(colors: Vec<String>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn for_generation(&self, generation: u32) -> &str {
        &self.colors[generation as usize % self.colors.len()]
    }

    pub fn color_for(&self, number: AncestorNumber) -> &str {
        self.for_generation(number.generation())
    }
}
