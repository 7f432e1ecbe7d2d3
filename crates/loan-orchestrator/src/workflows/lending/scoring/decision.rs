use async_trait::async_trait;

use crate::workflows::lending::gateways::{ApprovalGateway, ApprovalRequest, GatewayError};
use crate::workflows::lending::reports::{
    format_euros, format_percent, APPROVED_DECISION, REFUSED_DECISION,
};

const RECOMMENDATIONS: [&str; 3] = [
    "Améliorer le score de crédit",
    "Réduire le ratio dette/revenu",
    "Augmenter la période d'emploi stable",
];

/// Hard limits an application must respect regardless of its risk score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstitutionPolicy {
    pub min_credit_score: f64,
    pub max_debt_to_income: f64,
    pub max_loan_to_value: f64,
    pub min_employment_years: i32,
    /// Applications at or above this default probability are refused.
    pub max_default_probability: f64,
}

impl Default for InstitutionPolicy {
    fn default() -> Self {
        Self {
            min_credit_score: 700.0,
            max_debt_to_income: 0.45,
            max_loan_to_value: 0.85,
            min_employment_years: 2,
            max_default_probability: 0.3,
        }
    }
}

/// Offered rate by risk band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterestRates {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl Default for InterestRates {
    fn default() -> Self {
        Self {
            excellent: 0.029,
            good: 0.034,
            average: 0.039,
            poor: 0.045,
        }
    }
}

impl InterestRates {
    fn for_risk_score(&self, risk_score: f64) -> f64 {
        if risk_score >= 80.0 {
            self.excellent
        } else if risk_score >= 70.0 {
            self.good
        } else if risk_score >= 60.0 {
            self.average
        } else {
            self.poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ratios {
    debt_to_income: f64,
    loan_to_value: f64,
}

impl Ratios {
    /// Ratios are undefined when income or property value is zero; the missing inputs are
    /// returned as refusal reasons instead.
    fn of(request: &ApprovalRequest) -> Result<Self, Vec<&'static str>> {
        let mut missing = Vec::new();
        if request.monthly_income == 0.0 {
            missing.push("Revenu mensuel non renseigné");
        }
        if request.property_value == 0.0 {
            missing.push("Valeur du bien non renseignée");
        }
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(Self {
            debt_to_income: request.monthly_expenses / request.monthly_income,
            loan_to_value: request.loan_amount / request.property_value,
        })
    }
}

/// Scores the application, applies the institution's limits, and prices approved loans.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApprovalDecisionService {
    policy: InstitutionPolicy,
    rates: InterestRates,
}

impl ApprovalDecisionService {
    pub fn new(policy: InstitutionPolicy, rates: InterestRates) -> Self {
        Self { policy, rates }
    }

    pub fn evaluate(&self, request: &ApprovalRequest) -> String {
        let ratios = match Ratios::of(request) {
            Ok(ratios) => ratios,
            Err(missing) => return refusal(0.0, 1.0, &missing),
        };

        let risk_score = risk_score(request, ratios);
        let violations = self.violations(request, ratios);
        let default_probability = default_probability(request, ratios, risk_score, &self.policy);
        let approved =
            violations.is_empty() && default_probability < self.policy.max_default_probability;

        if approved {
            format!(
                "{APPROVED_DECISION}\n\
                 Score de Risque: {risk_score:.1}/100\n\
                 Probabilité de Défaut: {}\n\
                 Taux d'Intérêt Proposé: {}\n\
                 Montant Approuvé: {} EUR",
                format_percent(default_probability),
                format_percent(self.rates.for_risk_score(risk_score)),
                format_euros(request.loan_amount),
            )
        } else {
            refusal(risk_score, default_probability, &violations)
        }
    }

    fn violations(&self, request: &ApprovalRequest, ratios: Ratios) -> Vec<&'static str> {
        let mut violations = Vec::new();
        if request.credit_score < self.policy.min_credit_score {
            violations.push("Score de crédit insuffisant");
        }
        if ratios.debt_to_income > self.policy.max_debt_to_income {
            violations.push("Ratio dette/revenu trop élevé");
        }
        if ratios.loan_to_value > self.policy.max_loan_to_value {
            violations.push("Ratio prêt/valeur trop élevé");
        }
        if request.stable_employment_years < self.policy.min_employment_years {
            violations.push("Stabilité d'emploi insuffisante");
        }
        violations
    }
}

fn refusal(risk_score: f64, default_probability: f64, reasons: &[&str]) -> String {
    let reasons: Vec<String> = reasons.iter().map(|item| format!("- {item}")).collect();
    let recommendations: Vec<String> = RECOMMENDATIONS
        .iter()
        .map(|item| format!("- {item}"))
        .collect();
    format!(
        "{REFUSED_DECISION}\n\
         Score de Risque: {risk_score:.1}/100\n\
         Probabilité de Défaut: {}\n\
         Raisons:\n{}\n\
         Recommandations:\n{}",
        format_percent(default_probability),
        reasons.join("\n"),
        recommendations.join("\n"),
    )
}

/// 0 (worst) to 100 (best).
fn risk_score(request: &ApprovalRequest, ratios: Ratios) -> f64 {
    let mut score = 100.0;
    score += (request.credit_score - 700.0) / 10.0;
    score -= ratios.debt_to_income * 100.0;
    score -= ratios.loan_to_value * 50.0;
    score += f64::from(request.stable_employment_years) * 5.0;
    score -= f64::from(request.late_payments) * 10.0;
    if request.has_bankruptcy {
        score -= 50.0;
    }
    score.clamp(0.0, 100.0)
}

fn default_probability(
    request: &ApprovalRequest,
    ratios: Ratios,
    risk_score: f64,
    policy: &InstitutionPolicy,
) -> f64 {
    let mut probability = (100.0 - risk_score) / 100.0;
    probability *= if ratios.debt_to_income > policy.max_debt_to_income {
        1.5
    } else {
        0.8
    };
    probability *= if ratios.loan_to_value > policy.max_loan_to_value {
        1.3
    } else {
        0.9
    };
    probability *= if request.stable_employment_years >= policy.min_employment_years {
        0.7
    } else {
        1.2
    };
    probability *= if request.late_payments > 2 { 1.5 } else { 0.9 };
    if request.has_bankruptcy {
        probability *= 2.0;
    }
    probability.min(1.0)
}

#[async_trait]
impl ApprovalGateway for ApprovalDecisionService {
    async fn decide_approval(&self, request: ApprovalRequest) -> Result<String, GatewayError> {
        Ok(self.evaluate(&request))
    }
}
