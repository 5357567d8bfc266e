use crate::domain::model::{BmiResult, Evaluation, MeasurementInput, ReductionGoal};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Imperial BMI conversion factor (lb/in² to kg/m²).
pub const IMPERIAL_BMI_FACTOR: f64 = 703.0;

/// Share of body weight suggested as a weight-loss goal.
pub const REDUCTION_GOAL_RATIO: f64 = 0.07;

pub const INCHES_PER_FOOT: f64 = 12.0;

/// 四捨五入到兩位小數（0.5 遠離零）
///
/// Rounds the exact decimal value of the double, so `2.675` (stored as
/// 2.67499999...) becomes `2.67` the same way a browser's `toFixed(2)` shows it.
/// Scaling by 100 first would round the product instead and can land on an
/// exact half.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

// 缺值、NaN、零都視為未填
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan() && *v != 0.0)
}

/// Computes BMI and the weight-reduction goal.
///
/// Returns `None` without computing anything when weight or height-feet is
/// missing, zero or not a number, so a half-filled form never produces output.
/// Missing, zero or non-numeric inches count as 0.
///
/// The overweight check compares the rounded numeric BMI, so a value shown as
/// `25.00` never triggers a goal. When the BMI is not above the threshold the
/// goal is reset to 0 rather than left untouched.
pub fn evaluate(input: &MeasurementInput) -> Option<Evaluation> {
    let weight = present(input.weight_pounds)?;
    let feet = present(input.height_feet)?;
    let inches = present(input.height_inches).unwrap_or(0.0);

    let total_inches = feet * INCHES_PER_FOOT + inches;
    let raw_bmi = (weight * IMPERIAL_BMI_FACTOR) / (total_inches * total_inches);
    if !raw_bmi.is_finite() {
        tracing::debug!(total_inches, "height sums to zero, skipping evaluation");
        return None;
    }

    let bmi = BmiResult {
        bmi: round2(raw_bmi),
    };
    let evaluation = Evaluation {
        bmi,
        reduction_goal: ReductionGoal::none(),
    };

    if evaluation.is_overweight() {
        Some(Evaluation {
            reduction_goal: ReductionGoal {
                target_pounds: round2(weight * REDUCTION_GOAL_RATIO),
            },
            ..evaluation
        })
    } else {
        Some(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(weight: f64, feet: f64, inches: f64) -> Evaluation {
        evaluate(&MeasurementInput::new(weight, feet, inches)).unwrap()
    }

    #[test]
    fn test_normal_weight_has_no_goal() {
        // 66 吋：703 * 150 / 4356 = 24.2079...
        let result = eval(150.0, 5.0, 6.0);
        assert_eq!(result.bmi.to_string(), "24.21");
        assert_eq!(result.reduction_goal.to_string(), "0.00");
        assert!(!result.is_overweight());
    }

    #[test]
    fn test_overweight_gets_seven_percent_goal() {
        // 68 吋：703 * 220 / 4624 = 33.4472...
        let result = eval(220.0, 5.0, 8.0);
        assert_eq!(result.bmi.to_string(), "33.45");
        assert_eq!(result.reduction_goal.to_string(), "15.40");
        assert!(result.is_overweight());
    }

    #[test]
    fn test_matches_formula_for_positive_inputs() {
        for (w, ft, inch) in [(98.5, 4.0, 11.0), (310.0, 6.0, 2.0), (180.0, 5.0, 0.0)] {
            let total = ft * 12.0 + inch;
            let expected = round2(703.0 * w / (total * total));
            assert_eq!(eval(w, ft, inch).bmi.bmi, expected);
        }
    }

    #[test]
    fn test_threshold_is_strictly_greater_than_25() {
        // 5 呎 = 60 吋；25 * 3600 / 703 = 128.0227 磅
        let at_threshold = eval(128.0227, 5.0, 0.0);
        assert_eq!(at_threshold.bmi.to_string(), "25.00");
        assert_eq!(at_threshold.reduction_goal.target_pounds, 0.0);

        let above = eval(128.1, 5.0, 0.0);
        assert_eq!(above.bmi.to_string(), "25.02");
        assert_eq!(above.reduction_goal.to_string(), "8.97");
    }

    #[test]
    fn test_threshold_uses_numeric_not_lexical_comparison() {
        // 字串比較下 "156.22" < "25"
        let result = eval(800.0, 5.0, 0.0);
        assert_eq!(result.bmi.to_string(), "156.22");
        assert!(result.is_overweight());
        assert_eq!(result.reduction_goal.to_string(), "56.00");
    }

    #[test]
    fn test_missing_or_zero_weight_is_a_no_op() {
        let mut input = MeasurementInput::new(0.0, 5.0, 6.0);
        assert!(evaluate(&input).is_none());

        input.weight_pounds = None;
        assert!(evaluate(&input).is_none());

        input.weight_pounds = Some(f64::NAN);
        assert!(evaluate(&input).is_none());
    }

    #[test]
    fn test_missing_or_zero_feet_is_a_no_op() {
        assert!(evaluate(&MeasurementInput::new(150.0, 0.0, 66.0)).is_none());
        let input = MeasurementInput {
            weight_pounds: Some(150.0),
            height_feet: None,
            height_inches: Some(6.0),
        };
        assert!(evaluate(&input).is_none());
    }

    #[test]
    fn test_inches_normalization() {
        let explicit = eval(150.0, 5.0, 0.0);

        let omitted = evaluate(&MeasurementInput {
            weight_pounds: Some(150.0),
            height_feet: Some(5.0),
            height_inches: None,
        })
        .unwrap();
        assert_eq!(omitted, explicit);

        // 非數字的吋數補 0，不讓 NaN 流到輸出
        let not_a_number = evaluate(&MeasurementInput {
            weight_pounds: Some(150.0),
            height_feet: Some(5.0),
            height_inches: Some(f64::NAN),
        })
        .unwrap();
        assert_eq!(not_a_number, explicit);
        assert_eq!(not_a_number.bmi.to_string(), "29.29");
    }

    #[test]
    fn test_zero_total_height_is_a_no_op() {
        assert!(evaluate(&MeasurementInput::new(150.0, 1.0, -12.0)).is_none());
    }

    #[test]
    fn test_deterministic() {
        let input = MeasurementInput::new(187.3, 5.0, 10.5);
        let first = evaluate(&input).unwrap();
        let second = evaluate(&input).unwrap();
        assert_eq!(first.bmi.to_string(), second.bmi.to_string());
        assert_eq!(
            first.reduction_goal.to_string(),
            second.reduction_goal.to_string()
        );
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_round2_uses_exact_value_of_the_double() {
        // 2.675 實際存成 2.67499999...，不能先乘 100 再捨入
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn test_display_matches_browser_rounding() {
        // 703 * 198 / 3600 的 double 略小於 38.665
        let result = eval(198.0, 5.0, 0.0);
        assert_eq!(result.bmi.to_string(), "38.66");
        assert_eq!(result.reduction_goal.to_string(), "13.86");

        // 118.5 * 0.07 的 double 略小於 8.295；54 吋下 BMI 遠超過 25
        let result = eval(118.5, 4.0, 6.0);
        assert!(result.is_overweight());
        assert_eq!(result.reduction_goal.to_string(), "8.29");
    }
}
