use std::collections::HashMap;

use async_trait::async_trait;

use crate::workflows::lending::domain::{PropertyIntake, PropertyType};
use crate::workflows::lending::gateways::{GatewayError, PropertyValuationGateway};
use crate::workflows::lending::reports::{format_euros, NON_COMPLIANT_PREFIX};

const POSITIVE_KEYWORDS: [&str; 5] = ["rénové", "neuf", "moderne", "récent", "lumineux"];
const NEGATIVE_KEYWORDS: [&str; 4] = ["travaux", "rénover", "ancien", "humidité"];

pub const UNKNOWN_PROPERTY_REPLY: &str = "ERREUR: Localisation ou type de bien non reconnu";

/// Recent sales for one location and property type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSegment {
    pub price_per_sqm: f64,
    pub recent_sales: u32,
}

impl MarketSegment {
    /// Busy markets lift the estimate by at most 10%, quiet ones lower it by at most 10%.
    fn activity_multiplier(&self) -> f64 {
        (f64::from(self.recent_sales) / 100.0).clamp(0.9, 1.1)
    }
}

/// Zoning constraints for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LegalRules {
    pub min_size_sqm: f64,
    pub max_height_m: f64,
    pub protected_areas: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ConditionAssessment {
    status: &'static str,
    multiplier: f64,
    notes: &'static str,
}

/// Market lookup, keyword-based inspection, and zoning compliance in one report.
#[derive(Debug, Clone)]
pub struct PropertyValuationService {
    market: HashMap<(String, PropertyType), MarketSegment>,
    regulations: HashMap<String, LegalRules>,
}

impl Default for PropertyValuationService {
    fn default() -> Self {
        let segment = |price_per_sqm: f64, recent_sales: u32| MarketSegment {
            price_per_sqm,
            recent_sales,
        };

        let market = HashMap::from([
            (("Paris".to_string(), PropertyType::Apartment), segment(10_000.0, 150)),
            (("Paris".to_string(), PropertyType::House), segment(12_000.0, 80)),
            (("Lyon".to_string(), PropertyType::Apartment), segment(5_000.0, 120)),
            (("Lyon".to_string(), PropertyType::House), segment(6_000.0, 60)),
        ]);

        let regulations = HashMap::from([
            (
                "Paris".to_string(),
                LegalRules {
                    min_size_sqm: 9.0,
                    max_height_m: 25.0,
                    protected_areas: vec!["Marais".to_string(), "Montmartre".to_string()],
                },
            ),
            (
                "Lyon".to_string(),
                LegalRules {
                    min_size_sqm: 14.0,
                    max_height_m: 22.0,
                    protected_areas: vec!["Vieux Lyon".to_string()],
                },
            ),
        ]);

        Self::new(market, regulations)
    }
}

impl PropertyValuationService {
    pub fn new(
        market: HashMap<(String, PropertyType), MarketSegment>,
        regulations: HashMap<String, LegalRules>,
    ) -> Self {
        Self {
            market,
            regulations,
        }
    }

    pub fn evaluate(&self, intake: &PropertyIntake) -> String {
        let Some(segment) = self
            .market
            .get(&(intake.location.clone(), intake.property_type))
        else {
            return UNKNOWN_PROPERTY_REPLY.to_string();
        };

        let market_value =
            segment.price_per_sqm * intake.size_sqm * segment.activity_multiplier();
        let condition = inspect(&intake.description);

        if let Some(reason) = self.compliance_violation(intake) {
            return format!("{NON_COMPLIANT_PREFIX} {reason}");
        }

        let final_value = market_value * condition.multiplier;
        format!(
            "EVALUATION DÉTAILLÉE:\n\
             Valeur Estimée: {} EUR\n\
             Analyse du Marché: {} EUR\n\
             État du Bien: {}\n\
             Conformité Légale: Conforme\n\
             Remarques: {}",
            format_euros(final_value),
            format_euros(market_value),
            condition.status,
            condition.notes,
        )
    }

    fn compliance_violation(&self, intake: &PropertyIntake) -> Option<String> {
        let rules = self.regulations.get(&intake.location)?;

        if intake.size_sqm < rules.min_size_sqm {
            return Some(format!(
                "Surface insuffisante (minimum {}m²)",
                rules.min_size_sqm
            ));
        }

        let description = intake.description.to_lowercase();
        rules
            .protected_areas
            .iter()
            .find(|area| description.contains(&area.to_lowercase()))
            .map(|area| format!("Situé dans une zone protégée ({area})"))
    }
}

fn inspect(description: &str) -> ConditionAssessment {
    let description = description.to_lowercase();
    let positive = POSITIVE_KEYWORDS
        .iter()
        .filter(|word| description.contains(*word))
        .count();
    let negative = NEGATIVE_KEYWORDS
        .iter()
        .filter(|word| description.contains(*word))
        .count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => ConditionAssessment {
            status: "Bon état",
            multiplier: 1.1,
            notes: "Propriété bien entretenue",
        },
        std::cmp::Ordering::Less => ConditionAssessment {
            status: "Rénovation nécessaire",
            multiplier: 0.9,
            notes: "Des travaux peuvent être nécessaires",
        },
        std::cmp::Ordering::Equal => ConditionAssessment {
            status: "État moyen",
            multiplier: 1.0,
            notes: "État général satisfaisant",
        },
    }
}

#[async_trait]
impl PropertyValuationGateway for PropertyValuationService {
    async fn valuate_property(&self, intake: &PropertyIntake) -> Result<String, GatewayError> {
        Ok(self.evaluate(intake))
    }
}
