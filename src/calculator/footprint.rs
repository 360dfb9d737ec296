//! Per-category footprint from one transport leg, electricity, food and waste.

use serde::Serialize;
use serde_json::{Map, Value};

use super::factors::{factor, flight_factor, Category};
use super::CalculatorError;
use crate::directives::chart::{humanize_key, ChartDataPoint, DEFAULT_CHART_TITLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fuel {
    #[default]
    Petrol,
    Diesel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Car(Fuel),
    Motorbike,
    Bus,
    Train,
    Flight,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Car(Fuel::default())
    }
}

impl TransportMode {
    /// kg CO₂e per km for a leg of `km`. Flights depend on the distance.
    pub fn kg_per_km(self, km: f64) -> f64 {
        let activity = match self {
            TransportMode::Car(Fuel::Petrol) => "car_petrol",
            TransportMode::Car(Fuel::Diesel) => "car_diesel",
            TransportMode::Motorbike => "motorbike",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Flight => return flight_factor(km).kg_per_unit,
        };
        kg_per_unit(activity)
    }
}

/// Inputs of the calculator form. All amounts are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalculatorInput {
    pub mode: TransportMode,
    pub km: f64,
    pub kwh: f64,
    pub beef_kg: f64,
    pub poultry_kg: f64,
    pub vegetables_kg: f64,
    pub waste_kg: f64,
}

impl CalculatorInput {
    /// Parse whitespace-separated `key=value` pairs, e.g.
    /// `mode=car fuel=diesel km=120 kwh=200 beef=0.5 veg=3 waste=4`.
    /// Missing keys keep their defaults. `fuel` only applies to cars.
    pub fn from_args(args: &str) -> Result<Self, CalculatorError> {
        let mut input = CalculatorInput::default();
        let mut mode = None;
        let mut fuel = Fuel::default();

        for pair in args.split_whitespace() {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(CalculatorError::Malformed(pair.to_string()));
            };
            let key = key.to_ascii_lowercase();
            match key.as_str() {
                "mode" => mode = Some(parse_mode(value)?),
                "fuel" => fuel = parse_fuel(value)?,
                "km" | "distance" => input.km = parse_amount(&key, value)?,
                "kwh" | "electricity" => input.kwh = parse_amount(&key, value)?,
                "beef" => input.beef_kg = parse_amount(&key, value)?,
                "poultry" => input.poultry_kg = parse_amount(&key, value)?,
                "veg" | "vegetables" => input.vegetables_kg = parse_amount(&key, value)?,
                "waste" => input.waste_kg = parse_amount(&key, value)?,
                _ => return Err(CalculatorError::UnknownField(key)),
            }
        }

        input.mode = match mode.unwrap_or_default() {
            TransportMode::Car(_) => TransportMode::Car(fuel),
            other => other,
        };
        Ok(input)
    }
}

fn parse_mode(value: &str) -> Result<TransportMode, CalculatorError> {
    match value.to_ascii_lowercase().as_str() {
        "car" => Ok(TransportMode::Car(Fuel::default())),
        "motorbike" => Ok(TransportMode::Motorbike),
        "bus" => Ok(TransportMode::Bus),
        "train" => Ok(TransportMode::Train),
        "flight" | "plane" => Ok(TransportMode::Flight),
        _ => Err(CalculatorError::UnknownChoice {
            kind: "transport mode",
            value: value.to_string(),
        }),
    }
}

fn parse_fuel(value: &str) -> Result<Fuel, CalculatorError> {
    match value.to_ascii_lowercase().as_str() {
        "petrol" | "gasoline" => Ok(Fuel::Petrol),
        "diesel" => Ok(Fuel::Diesel),
        _ => Err(CalculatorError::UnknownChoice {
            kind: "fuel",
            value: value.to_string(),
        }),
    }
}

fn parse_amount(field: &str, value: &str) -> Result<f64, CalculatorError> {
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(CalculatorError::InvalidAmount {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

fn kg_per_unit(activity: &str) -> f64 {
    factor(activity).map_or(0.0, |f| f.kg_per_unit)
}

/// kg CO₂e per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Footprint {
    pub transport: f64,
    pub electricity: f64,
    pub food: f64,
    pub waste: f64,
}

impl Footprint {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transport => self.transport,
            Category::Electricity => self.electricity,
            Category::Food => self.food,
            Category::Waste => self.waste,
        }
    }

    pub fn add(&mut self, category: Category, kg: f64) {
        let slot = match category {
            Category::Transport => &mut self.transport,
            Category::Electricity => &mut self.electricity,
            Category::Food => &mut self.food,
            Category::Waste => &mut self.waste,
        };
        *slot += kg;
    }

    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Positive categories as chart slices, in category order.
    pub fn chart_points(&self) -> Vec<ChartDataPoint> {
        Category::ALL
            .iter()
            .filter(|c| self.get(**c) > 0.0)
            .map(|c| ChartDataPoint {
                label: humanize_key(c.chart_key()),
                value: round2(self.get(*c)),
            })
            .collect()
    }

    /// `[CHART_TITLE:...]` and `[PIE_CHART_DATA:{...}]` lines for this breakdown.
    pub fn chart_tags(&self) -> String {
        let mut data = Map::new();
        for category in Category::ALL {
            data.insert(
                category.chart_key().to_string(),
                Value::from(round2(self.get(category))),
            );
        }
        format!(
            "[CHART_TITLE:{}]\n[PIE_CHART_DATA:{}]",
            DEFAULT_CHART_TITLE,
            Value::Object(data)
        )
    }

    /// One line per category followed by the total, in kg CO₂e.
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = Category::ALL
            .iter()
            .map(|c| format!("{}: {:.2} kg CO₂e", humanize_key(c.chart_key()), self.get(*c)))
            .collect();
        lines.push(format!("🌍 Total: {:.2} kg CO₂e", self.total()));
        lines.join("\n")
    }
}

fn round2(kg: f64) -> f64 {
    (kg * 100.0).round() / 100.0
}

pub fn calculate(input: &CalculatorInput) -> Footprint {
    Footprint {
        transport: input.km * input.mode.kg_per_km(input.km),
        electricity: input.kwh * kg_per_unit("electricity"),
        food: input.beef_kg * kg_per_unit("beef")
            + input.poultry_kg * kg_per_unit("poultry")
            + input.vegetables_kg * kg_per_unit("vegetables"),
        waste: input.waste_kg * kg_per_unit("waste"),
    }
}
