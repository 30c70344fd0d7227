//! Named color schemes used to color data points cyclically.

use std::collections::BTreeMap;

/// Scheme selected when nothing else is configured.
pub const DEFAULT_SCHEME: &str = "default";

/// Built-in schemes, in the order the sidebar offers them.
pub const BUILTIN_SCHEMES: [(&str, [&str; 4]); 5] = [
    ("default", ["cyan", "magenta", "green", "yellow"]),
    ("vibrant", ["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4"]),
    ("professional", ["#2C3E50", "#3498DB", "#E74C3C", "#F39C12"]),
    ("pastel", ["#FFB6C1", "#DDA0DD", "#98FB98", "#F0E68C"]),
    ("monochrome", ["#2D3748", "#4A5568", "#718096", "#A0AEC0"]),
];

/// Lookup table from scheme name to its ordered color tokens.
///
/// Built-in schemes keep their fixed order; user palettes from the config file are
/// listed after them in name order. A user palette with a built-in name replaces
/// the built-in colors but keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteTable {
    names: Vec<String>,
    colors: BTreeMap<String, Vec<String>>,
}

impl PaletteTable {
    pub fn builtin() -> Self {
        let mut table = Self {
            names: Vec::new(),
            colors: BTreeMap::new(),
        };
        for (name, colors) in BUILTIN_SCHEMES {
            table.insert(name, colors.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    /// Built-in schemes plus user palettes. Empty user palettes are skipped.
    pub fn with_user_palettes(user: &BTreeMap<String, Vec<String>>) -> Self {
        let mut table = Self::builtin();
        for (name, colors) in user {
            if !colors.is_empty() {
                table.insert(name, colors.clone());
            }
        }
        table
    }

    fn insert(&mut self, name: &str, colors: Vec<String>) {
        if !self.colors.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.colors.insert(name.to_string(), colors);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.colors.get(name).map(|c| c.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    /// Scheme names in display order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Scheme after `name` in display order, wrapping around.
    pub fn next_name(&self, name: &str) -> &str {
        let idx = self.names.iter().position(|n| n == name).unwrap_or(0);
        &self.names[(idx + 1) % self.names.len()]
    }

    /// Scheme before `name` in display order, wrapping around.
    pub fn prev_name(&self, name: &str) -> &str {
        let idx = self.names.iter().position(|n| n == name).unwrap_or(0);
        &self.names[(idx + self.names.len() - 1) % self.names.len()]
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Scheme name with the first letter upper-cased ("vibrant" -> "Vibrant").
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Color for the point at `index`, cycling through `palette`.
pub fn color_at(palette: &[String], index: usize) -> Option<&str> {
    if palette.is_empty() {
        None
    } else {
        Some(palette[index % palette.len()].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_order_is_stable() {
        let table = PaletteTable::builtin();
        assert_eq!(
            table.names(),
            &["default", "vibrant", "professional", "pastel", "monochrome"]
        );
        assert_eq!(
            table.get("vibrant").unwrap(),
            &["#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4"]
        );
    }

    #[test]
    fn user_palettes_extend_and_override() {
        let mut user = BTreeMap::new();
        user.insert("ocean".to_string(), vec!["#003366".to_string()]);
        user.insert("pastel".to_string(), vec!["#FFFFFF".to_string()]);
        user.insert("empty".to_string(), vec![]);
        let table = PaletteTable::with_user_palettes(&user);

        assert_eq!(table.names().len(), 6);
        assert_eq!(table.names()[3], "pastel");
        assert_eq!(table.names()[5], "ocean");
        assert_eq!(table.get("pastel").unwrap(), &["#FFFFFF"]);
        assert!(!table.contains("empty"));
    }

    #[test]
    fn next_and_prev_wrap() {
        let table = PaletteTable::builtin();
        assert_eq!(table.next_name("monochrome"), "default");
        assert_eq!(table.prev_name("default"), "monochrome");
        assert_eq!(table.next_name("default"), "vibrant");
    }

    #[test]
    fn color_at_cycles() {
        let palette: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let picked: Vec<&str> = (0..7).filter_map(|i| color_at(&palette, i)).collect();
        assert_eq!(picked, vec!["a", "b", "c", "a", "b", "c", "a"]);
        assert_eq!(color_at(&[], 0), None);
    }

    #[test]
    fn display_name_capitalizes() {
        assert_eq!(display_name("vibrant"), "Vibrant");
        assert_eq!(display_name(""), "");
    }
}
