use async_trait::async_trait;

use crate::workflows::lending::domain::Solvency;
use crate::workflows::lending::gateways::{GatewayError, SolvencyGateway, SolvencyRequest};

pub const MIN_SOLVENT_SCORE: f64 = 700.0;

const BASE_SCORE: f64 = 1000.0;
const DEBT_WEIGHT: f64 = 0.1;
const LATE_PAYMENT_PENALTY: f64 = 50.0;
const BANKRUPTCY_PENALTY: f64 = 200.0;

/// Credit check: a debt/late-payment/bankruptcy score plus a positive monthly margin.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditCheckService;

impl CreditCheckService {
    pub fn score(request: &SolvencyRequest) -> f64 {
        let mut score = BASE_SCORE
            - request.outstanding_debt as f64 * DEBT_WEIGHT
            - f64::from(request.late_payments) * LATE_PAYMENT_PENALTY;
        if request.has_bankruptcy {
            score -= BANKRUPTCY_PENALTY;
        }
        score
    }

    pub fn assess(request: &SolvencyRequest) -> Solvency {
        if Self::score(request) >= MIN_SOLVENT_SCORE
            && request.monthly_income > request.monthly_expenses
        {
            Solvency::Solvent
        } else {
            Solvency::NotSolvent
        }
    }
}

#[async_trait]
impl SolvencyGateway for CreditCheckService {
    async fn check_solvency(&self, request: SolvencyRequest) -> Result<String, GatewayError> {
        Ok(Self::assess(&request).label().to_string())
    }
}
