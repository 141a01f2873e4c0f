//! Material reference data
//!
//! Read-only from the engine's perspective. The server loads a [`Catalog`]
//! from the `materials`/`thicknesses` tables; the client uses
//! [`Catalog::builtin`] when it has nothing better.

use serde::{Deserialize, Serialize};

/// Broad material family, used for storefront grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Metals,
    Plastics,
    Composites,
    Wood,
}

impl MaterialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::Metals => "metals",
            MaterialCategory::Plastics => "plastics",
            MaterialCategory::Composites => "composites",
            MaterialCategory::Wood => "wood",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "metals" => Some(MaterialCategory::Metals),
            "plastics" => Some(MaterialCategory::Plastics),
            "composites" => Some(MaterialCategory::Composites),
            "wood" => Some(MaterialCategory::Wood),
            _ => None,
        }
    }
}

/// One stock thickness of a material. `label` is unique within its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thickness {
    pub label: String,
    pub inches: f64,
    pub base_price_per_sq_in: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,
    pub description: String,
    pub color: String,
    /// Ordered as presented to the customer
    pub thicknesses: Vec<Thickness>,
}

impl Material {
    pub fn thickness(&self, label: &str) -> Option<&Thickness> {
        self.thicknesses.iter().find(|t| t.label == label)
    }
}

/// Resolves `(material_id, thickness_label)` to a priced thickness
///
/// This is the only view of reference data the pricing engine needs.
pub trait ThicknessLookup {
    fn thickness(&self, material_id: &str, label: &str) -> Option<&Thickness>;
}

/// Ordered collection of materials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub materials: Vec<Material>,
}

impl Catalog {
    pub fn new(materials: Vec<Material>) -> Self {
        Self { materials }
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Stock materials offered by the shop
    ///
    /// Seeds the database on first start and backs offline quoting.
    pub fn builtin() -> Self {
        fn t(label: &str, inches: f64, price: f64) -> Thickness {
            Thickness {
                label: label.to_string(),
                inches,
                base_price_per_sq_in: price,
            }
        }

        fn m(
            id: &str,
            name: &str,
            category: MaterialCategory,
            description: &str,
            color: &str,
            thicknesses: Vec<Thickness>,
        ) -> Material {
            Material {
                id: id.to_string(),
                name: name.to_string(),
                category,
                description: description.to_string(),
                color: color.to_string(),
                thicknesses,
            }
        }

        use MaterialCategory::*;

        Catalog::new(vec![
            m("mild-steel", "Mild Steel", Metals,
              "Versatile carbon steel for general fabrication, structural parts, and brackets.",
              "#71797E",
              vec![
                  t("22 ga (0.030\")", 0.030, 0.03),
                  t("20 ga (0.036\")", 0.036, 0.035),
                  t("18 ga (0.048\")", 0.048, 0.045),
                  t("16 ga (0.060\")", 0.060, 0.055),
                  t("14 ga (0.075\")", 0.075, 0.07),
                  t("11 ga (0.120\")", 0.120, 0.10),
                  t("3/16\" (0.188)", 0.188, 0.15),
                  t("1/4\" (0.250)", 0.250, 0.20),
              ]),
            m("stainless-304", "304 Stainless Steel", Metals,
              "Corrosion-resistant austenitic stainless for food equipment, marine, and architectural use.",
              "#C0C0C0",
              vec![
                  t("22 ga (0.030\")", 0.030, 0.06),
                  t("20 ga (0.036\")", 0.036, 0.07),
                  t("18 ga (0.048\")", 0.048, 0.09),
                  t("16 ga (0.060\")", 0.060, 0.11),
                  t("14 ga (0.075\")", 0.075, 0.14),
                  t("11 ga (0.120\")", 0.120, 0.20),
                  t("3/16\" (0.188)", 0.188, 0.30),
                  t("1/4\" (0.250)", 0.250, 0.40),
              ]),
            m("stainless-316", "316 Stainless Steel", Metals,
              "Molybdenum-bearing stainless for marine, chemical processing, and medical parts.",
              "#B8B8B8",
              vec![
                  t("20 ga (0.036\")", 0.036, 0.09),
                  t("18 ga (0.048\")", 0.048, 0.12),
                  t("16 ga (0.060\")", 0.060, 0.15),
                  t("14 ga (0.075\")", 0.075, 0.18),
                  t("11 ga (0.120\")", 0.120, 0.26),
                  t("1/4\" (0.250)", 0.250, 0.50),
              ]),
            m("aluminum-5052", "5052 Aluminum", Metals,
              "Good workability and corrosion resistance; a sheet metal staple.",
              "#A8A9AD",
              vec![
                  t("0.040\"", 0.040, 0.04),
                  t("0.063\"", 0.063, 0.05),
                  t("0.080\"", 0.080, 0.06),
                  t("0.100\"", 0.100, 0.08),
                  t("0.125\"", 0.125, 0.10),
                  t("0.190\"", 0.190, 0.14),
                  t("0.250\"", 0.250, 0.18),
              ]),
            m("aluminum-6061", "6061-T6 Aluminum", Metals,
              "Heat-treatable alloy with excellent machinability for structural and precision parts.",
              "#B0B0B0",
              vec![
                  t("0.063\"", 0.063, 0.06),
                  t("0.080\"", 0.080, 0.07),
                  t("0.125\"", 0.125, 0.11),
                  t("0.190\"", 0.190, 0.16),
                  t("0.250\"", 0.250, 0.22),
                  t("0.375\"", 0.375, 0.32),
                  t("0.500\"", 0.500, 0.42),
              ]),
            m("copper-110", "C110 Copper", Metals,
              "High-purity electrolytic copper for electrical and decorative parts.",
              "#B87333",
              vec![
                  t("0.032\"", 0.032, 0.08),
                  t("0.040\"", 0.040, 0.10),
                  t("0.063\"", 0.063, 0.14),
                  t("0.125\"", 0.125, 0.25),
                  t("0.190\"", 0.190, 0.38),
              ]),
            m("brass-260", "260 Brass", Metals,
              "Cartridge brass with excellent formability for decorative and hardware parts.",
              "#C9B037",
              vec![
                  t("0.032\"", 0.032, 0.07),
                  t("0.040\"", 0.040, 0.08),
                  t("0.063\"", 0.063, 0.12),
                  t("0.125\"", 0.125, 0.22),
                  t("0.190\"", 0.190, 0.32),
              ]),
            m("titanium-gr2", "Grade 2 Titanium", Metals,
              "Commercially pure titanium with a high strength-to-weight ratio.",
              "#878681",
              vec![
                  t("0.040\"", 0.040, 0.20),
                  t("0.063\"", 0.063, 0.30),
                  t("0.080\"", 0.080, 0.38),
                  t("0.125\"", 0.125, 0.55),
                  t("0.250\"", 0.250, 1.00),
              ]),
            m("acrylic-clear", "Clear Acrylic", Plastics,
              "Optically clear cast acrylic; a shatter-resistant alternative to glass.",
              "#E8F4FD",
              vec![
                  t("1/16\" (0.060)", 0.060, 0.02),
                  t("1/8\" (0.118)", 0.118, 0.03),
                  t("3/16\" (0.177)", 0.177, 0.04),
                  t("1/4\" (0.236)", 0.236, 0.05),
                  t("3/8\" (0.354)", 0.354, 0.07),
                  t("1/2\" (0.472)", 0.472, 0.09),
              ]),
            m("delrin", "Delrin (Acetal)", Plastics,
              "Engineering thermoplastic with low friction and good dimensional stability.",
              "#F5F5DC",
              vec![
                  t("1/16\" (0.060)", 0.060, 0.03),
                  t("1/8\" (0.125)", 0.125, 0.05),
                  t("1/4\" (0.250)", 0.250, 0.08),
                  t("3/8\" (0.375)", 0.375, 0.12),
                  t("1/2\" (0.500)", 0.500, 0.15),
              ]),
            m("hdpe", "HDPE", Plastics,
              "High-density polyethylene; chemical resistant and food-safe.",
              "#FFFDD0",
              vec![
                  t("1/8\" (0.125)", 0.125, 0.02),
                  t("1/4\" (0.250)", 0.250, 0.04),
                  t("3/8\" (0.375)", 0.375, 0.05),
                  t("1/2\" (0.500)", 0.500, 0.07),
              ]),
            m("carbon-fiber", "Carbon Fiber Sheet", Composites,
              "Woven carbon fiber panel with extreme stiffness at minimal weight.",
              "#2C2C2C",
              vec![
                  t("0.020\"", 0.020, 0.15),
                  t("0.040\"", 0.040, 0.25),
                  t("0.060\"", 0.060, 0.35),
                  t("0.125\"", 0.125, 0.60),
                  t("0.250\"", 0.250, 1.10),
              ]),
            m("g10-fr4", "G10/FR4 Fiberglass", Composites,
              "Glass-reinforced epoxy laminate with excellent electrical insulation.",
              "#9ACD32",
              vec![
                  t("0.031\"", 0.031, 0.04),
                  t("0.063\"", 0.063, 0.06),
                  t("0.093\"", 0.093, 0.08),
                  t("0.125\"", 0.125, 0.10),
                  t("0.250\"", 0.250, 0.18),
              ]),
            m("baltic-birch", "Baltic Birch Plywood", Wood,
              "Multi-ply birch with clean laser-cut edges for prototypes and decorative parts.",
              "#DEB887",
              vec![
                  t("1/8\" (3mm)", 0.125, 0.015),
                  t("1/4\" (6mm)", 0.250, 0.025),
                  t("3/8\" (9mm)", 0.375, 0.035),
                  t("1/2\" (12mm)", 0.500, 0.045),
              ]),
            m("walnut", "Walnut Hardwood", Wood,
              "Dark hardwood with a rich grain for signage and craft work.",
              "#5C4033",
              vec![
                  t("1/8\" (3mm)", 0.125, 0.03),
                  t("1/4\" (6mm)", 0.250, 0.05),
              ]),
        ])
    }
}

impl ThicknessLookup for Catalog {
    fn thickness(&self, material_id: &str, label: &str) -> Option<&Thickness> {
        self.material(material_id).and_then(|m| m.thickness(label))
    }
}

/// A single resolved thickness, used when the caller already looked the
/// pair up (e.g. the server's single-row query)
#[derive(Debug, Clone)]
pub struct ResolvedThickness {
    pub material_id: String,
    pub thickness: Thickness,
}

impl ThicknessLookup for ResolvedThickness {
    fn thickness(&self, material_id: &str, label: &str) -> Option<&Thickness> {
        if self.material_id == material_id && self.thickness.label == label {
            Some(&self.thickness)
        } else {
            None
        }
    }
}
