//! Emission factors in kg CO₂e per unit of activity.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Transport,
    Electricity,
    Food,
    Waste,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Transport,
        Category::Electricity,
        Category::Food,
        Category::Waste,
    ];

    /// Key used in `[PIE_CHART_DATA:{...}]` payloads.
    pub fn chart_key(self) -> &'static str {
        match self {
            Category::Transport => "transport",
            Category::Electricity => "electricity",
            Category::Food => "food",
            Category::Waste => "waste",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionFactor {
    pub activity: &'static str,
    pub kg_per_unit: f64,
    pub unit: &'static str,
    pub category: Category,
}

/// Flights up to this distance use the short-haul factor.
pub const SHORT_HAUL_MAX_KM: f64 = 1500.0;

const FLIGHT_SHORT: EmissionFactor = EmissionFactor {
    activity: "flight_short",
    kg_per_unit: 0.255,
    unit: "km",
    category: Category::Transport,
};

const FLIGHT_LONG: EmissionFactor = EmissionFactor {
    activity: "flight_long",
    kg_per_unit: 0.195,
    unit: "km",
    category: Category::Transport,
};

pub const EMISSION_FACTORS: &[EmissionFactor] = &[
    EmissionFactor {
        activity: "car_petrol",
        kg_per_unit: 0.192,
        unit: "km",
        category: Category::Transport,
    },
    EmissionFactor {
        activity: "car_diesel",
        kg_per_unit: 0.171,
        unit: "km",
        category: Category::Transport,
    },
    EmissionFactor {
        activity: "motorbike",
        kg_per_unit: 0.103,
        unit: "km",
        category: Category::Transport,
    },
    EmissionFactor {
        activity: "bus",
        kg_per_unit: 0.089,
        unit: "km",
        category: Category::Transport,
    },
    EmissionFactor {
        activity: "train",
        kg_per_unit: 0.041,
        unit: "km",
        category: Category::Transport,
    },
    EmissionFactor {
        activity: "electricity",
        kg_per_unit: 0.82,
        unit: "kWh",
        category: Category::Electricity,
    },
    FLIGHT_SHORT,
    FLIGHT_LONG,
    EmissionFactor {
        activity: "beef",
        kg_per_unit: 27.0,
        unit: "kg",
        category: Category::Food,
    },
    EmissionFactor {
        activity: "poultry",
        kg_per_unit: 6.9,
        unit: "kg",
        category: Category::Food,
    },
    EmissionFactor {
        activity: "vegetables",
        kg_per_unit: 2.0,
        unit: "kg",
        category: Category::Food,
    },
    EmissionFactor {
        activity: "waste",
        kg_per_unit: 0.45,
        unit: "kg",
        category: Category::Waste,
    },
];

/// Case-insensitive lookup; surrounding whitespace is ignored.
pub fn factor(activity: &str) -> Option<&'static EmissionFactor> {
    let activity = activity.trim();
    EMISSION_FACTORS
        .iter()
        .find(|f| f.activity.eq_ignore_ascii_case(activity))
}

/// Short-haul up to and including [`SHORT_HAUL_MAX_KM`], long-haul beyond.
pub fn flight_factor(km: f64) -> &'static EmissionFactor {
    if km <= SHORT_HAUL_MAX_KM {
        &FLIGHT_SHORT
    } else {
        &FLIGHT_LONG
    }
}
