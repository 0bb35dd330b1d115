//! Fixed option tables of the garage configurator

use serde::{Deserialize, Serialize};

/// Price per square meter of floor area
pub const RATE_PER_SQUARE_METER: f64 = 120.0;

/// A selectable option with a flat surcharge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
}

impl OptionChoice {
    fn new(id: &str, name: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price,
        }
    }

    fn described(id: &str, name: &str, price: f64, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::new(id, name, price)
        }
    }
}

/// A color finish; colors never affect the price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorChoice {
    pub id: String,
    pub name: String,
    pub hex: String,
}

impl ColorChoice {
    fn new(id: &str, name: &str, hex: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            hex: hex.to_string(),
        }
    }
}

/// The priced option categories of a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionCategory {
    Roof,
    Gate,
    GatePosition,
    WallThickness,
    Foundation,
    Extra,
}

impl OptionCategory {
    pub const ALL: [OptionCategory; 6] = [
        OptionCategory::Roof,
        OptionCategory::Gate,
        OptionCategory::GatePosition,
        OptionCategory::WallThickness,
        OptionCategory::Foundation,
        OptionCategory::Extra,
    ];

    /// Field name of this category in the configuration JSON
    pub fn field_name(&self) -> &'static str {
        match self {
            OptionCategory::Roof => "roofType",
            OptionCategory::Gate => "gateType",
            OptionCategory::GatePosition => "gatePosition",
            OptionCategory::WallThickness => "wallThickness",
            OptionCategory::Foundation => "foundation",
            OptionCategory::Extra => "extras",
        }
    }
}

/// All option tables, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalog {
    pub rate_per_square_meter: f64,
    pub colors: Vec<ColorChoice>,
    pub roof_types: Vec<OptionChoice>,
    pub gate_types: Vec<OptionChoice>,
    pub gate_positions: Vec<OptionChoice>,
    pub wall_thicknesses: Vec<OptionChoice>,
    pub foundations: Vec<OptionChoice>,
    pub extras: Vec<OptionChoice>,
}

impl PriceCatalog {
    /// The manufacturer's standard price list
    pub fn standard() -> Self {
        Self {
            rate_per_square_meter: RATE_PER_SQUARE_METER,
            colors: vec![
                ColorChoice::new("RAL7016", "Anthrazitgrau", "#293133"),
                ColorChoice::new("RAL9006", "Weißaluminium", "#A5A5A5"),
                ColorChoice::new("RAL9016", "Verkehrsweiß", "#F1F1F1"),
                ColorChoice::new("RAL3000", "Feuerrot", "#AF2B1E"),
                ColorChoice::new("RAL5010", "Enzianblau", "#0E294B"),
                ColorChoice::new("RAL6005", "Moosgrün", "#0F4336"),
                ColorChoice::new("RAL8017", "Schokoladenbraun", "#44322D"),
                ColorChoice::new("RAL9005", "Tiefschwarz", "#0A0A0A"),
            ],
            roof_types: vec![
                OptionChoice::described(
                    "standard",
                    "Standarddach",
                    0.0,
                    "Klassisches Flachdach mit leichter Neigung",
                ),
                OptionChoice::described(
                    "elevated",
                    "Satteldach",
                    450.0,
                    "Traditionelles Spitzdach mit 15° Neigung",
                ),
                OptionChoice::described("flat", "Flachdach", 300.0, "Modernes Flachdach ohne Neigung"),
                OptionChoice::described(
                    "asymmetric",
                    "Asymmetrisches Dach",
                    550.0,
                    "Modernes Design mit unterschiedlichen Neigungen",
                ),
                OptionChoice::described("pent", "Pultdach", 400.0, "Einseitig geneigtes Dach"),
            ],
            gate_types: vec![
                OptionChoice::described("rollup", "Rolltor", 0.0, "Platzsparendes Aufrolltor"),
                OptionChoice::described(
                    "sectional",
                    "Sektionaltor",
                    450.0,
                    "Isoliertes Tor aus Paneelen",
                ),
                OptionChoice::described("swing", "Schwingtor", 300.0, "Klassisches Schwingtor"),
                OptionChoice::described(
                    "double",
                    "Zweiflügeltor",
                    250.0,
                    "Traditionelles zweiflügeliges Tor",
                ),
            ],
            gate_positions: vec![
                OptionChoice::new("front", "Vorderseite", 0.0),
                OptionChoice::new("back", "Rückseite", 0.0),
                OptionChoice::new("left", "Linke Seite", 150.0),
                OptionChoice::new("right", "Rechte Seite", 150.0),
            ],
            wall_thicknesses: vec![
                OptionChoice::new("standard", "Standard (0.5mm)", 0.0),
                OptionChoice::new("reinforced", "Verstärkt (0.75mm)", 300.0),
                OptionChoice::new("premium", "Premium (1.0mm)", 600.0),
            ],
            foundations: vec![
                OptionChoice::described("concrete", "Betonfundament", 800.0, "Stabiles Betonfundament"),
                OptionChoice::described("point", "Punktfundament", 400.0, "Kostengünstige Lösung"),
                OptionChoice::described("screw", "Schraubfundament", 600.0, "Schnelle Installation"),
                OptionChoice::described("none", "Ohne Fundament", 0.0, "Eigeninstallation"),
            ],
            extras: vec![
                OptionChoice::described("door", "Zusätzliche Tür", 299.0, "Separate Eingangstür"),
                OptionChoice::described("window", "Fenster", 199.0, "Doppelverglastes Fenster"),
                OptionChoice::described(
                    "gutters",
                    "Dachrinnen",
                    159.0,
                    "Komplettes Entwässerungssystem",
                ),
                OptionChoice::described("ventilation", "Lüftungssystem", 249.0, "Aktive Belüftung"),
                OptionChoice::described("insulation", "Isolierung", 899.0, "Thermische Isolierung"),
                OptionChoice::described(
                    "electricity",
                    "Elektroinstallation",
                    599.0,
                    "Grundlegende Elektrik",
                ),
                OptionChoice::described(
                    "reinforcement",
                    "Schneelastverstärkung",
                    449.0,
                    "Erhöhte Tragfähigkeit",
                ),
                OptionChoice::described("security", "Sicherheitspaket", 349.0, "Zusätzliche Verriegelung"),
            ],
        }
    }

    /// The option table of a category
    pub fn table(&self, category: OptionCategory) -> &[OptionChoice] {
        match category {
            OptionCategory::Roof => &self.roof_types,
            OptionCategory::Gate => &self.gate_types,
            OptionCategory::GatePosition => &self.gate_positions,
            OptionCategory::WallThickness => &self.wall_thicknesses,
            OptionCategory::Foundation => &self.foundations,
            OptionCategory::Extra => &self.extras,
        }
    }

    pub fn find(&self, category: OptionCategory, id: &str) -> Option<&OptionChoice> {
        self.table(category).iter().find(|o| o.id == id)
    }

    /// Surcharge of an option; unknown ids cost nothing
    pub fn surcharge(&self, category: OptionCategory, id: &str) -> f64 {
        self.find(category, id).map(|o| o.price).unwrap_or(0.0)
    }

    pub fn has_color(&self, id: &str) -> bool {
        self.colors.iter().any(|c| c.id == id)
    }
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
