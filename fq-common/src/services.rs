//! Service add-ons a customer can attach to a part

use serde::Serialize;

/// Prefix shared by all service-fee parameters
pub const SERVICE_PARAM_PREFIX: &str = "svc_";

/// An optional finishing or fabrication step, priced per part
///
/// `parameter_key` names the live pricing parameter for this service. When the
/// snapshot has no such parameter, `flat_fee_fallback` is charged instead;
/// operators are expected to keep the two in sync.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceAddon {
    pub id: &'static str,
    pub name: &'static str,
    pub parameter_key: Option<&'static str>,
    pub flat_fee_fallback: f64,
}

static SERVICES: &[ServiceAddon] = &[
    ServiceAddon {
        id: "laser-cutting",
        name: "Laser Cutting",
        parameter_key: None,
        flat_fee_fallback: 0.0,
    },
    ServiceAddon {
        id: "bending",
        name: "CNC Bending",
        parameter_key: Some("svc_bending"),
        flat_fee_fallback: 4.50,
    },
    ServiceAddon {
        id: "anodizing",
        name: "Anodizing",
        parameter_key: Some("svc_anodizing"),
        flat_fee_fallback: 8.00,
    },
    ServiceAddon {
        id: "powder-coating",
        name: "Powder Coating",
        parameter_key: Some("svc_powder_coating"),
        flat_fee_fallback: 6.00,
    },
    ServiceAddon {
        id: "plating",
        name: "Plating",
        parameter_key: Some("svc_plating"),
        flat_fee_fallback: 10.00,
    },
    ServiceAddon {
        id: "deburring",
        name: "Deburring & Edge Finishing",
        parameter_key: Some("svc_deburring"),
        flat_fee_fallback: 2.00,
    },
    ServiceAddon {
        id: "hardware-insertion",
        name: "Hardware Insertion",
        parameter_key: Some("svc_hardware"),
        flat_fee_fallback: 1.50,
    },
    ServiceAddon {
        id: "countersinking",
        name: "Countersinking",
        parameter_key: Some("svc_countersinking"),
        flat_fee_fallback: 1.00,
    },
];

/// All offered services, in display order
pub fn all() -> &'static [ServiceAddon] {
    SERVICES
}

/// Look up a service by id; unknown ids return None
pub fn find(id: &str) -> Option<&'static ServiceAddon> {
    SERVICES.iter().find(|s| s.id == id)
}
