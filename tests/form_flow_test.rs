use bmi_registry::core::form::{
    BMI_FIELD, HEIGHT_FEET_FIELD, HEIGHT_INCHES_FIELD, REDUCTION_FIELD, WEIGHT_FIELD,
};
use bmi_registry::{BmiForm, VitalsEntry};

/// 逐鍵輸入時，欄位未齊全前不產生任何輸出
#[test]
fn test_keystroke_by_keystroke_entry() {
    let mut form = BmiForm::new();

    form.set(WEIGHT_FIELD, "2");
    assert!(form.recalculate().is_none());
    form.set(WEIGHT_FIELD, "22");
    assert!(form.recalculate().is_none());
    form.set(WEIGHT_FIELD, "220");
    assert!(form.recalculate().is_none());
    assert_eq!(form.get(BMI_FIELD), None);

    form.set(HEIGHT_FEET_FIELD, "5");
    let partial = form.recalculate().unwrap();
    assert_eq!(partial.bmi.to_string(), "42.96");
    assert_eq!(form.get(REDUCTION_FIELD), Some("15.40"));

    form.set(HEIGHT_INCHES_FIELD, "8");
    form.recalculate();
    assert_eq!(form.get(BMI_FIELD), Some("33.45"));
    assert_eq!(form.get(REDUCTION_FIELD), Some("15.40"));
}

#[test]
fn test_recalculated_form_submits_as_valid_vitals() {
    let mut form = BmiForm::new();
    form.set(WEIGHT_FIELD, "150");
    form.set(HEIGHT_FEET_FIELD, "5");
    form.set(HEIGHT_INCHES_FIELD, "6");
    form.recalculate();

    let vitals = VitalsEntry::from_fields(form.fields()).unwrap();
    assert_eq!(vitals.weight, Some(150.0));
    assert_eq!(vitals.height_feet, Some(5));
    assert_eq!(vitals.height_inches, Some(6));
    assert_eq!(vitals.bmi, Some(24.21));
    assert_eq!(vitals.weight_reduction_goal, Some(0.0));
}

#[test]
fn test_lenient_form_input_is_rejected_on_submission() {
    let mut form = BmiForm::new();
    form.set(WEIGHT_FIELD, "150 lbs");
    form.set(HEIGHT_FEET_FIELD, "5");
    assert!(form.recalculate().is_some());

    let err = VitalsEntry::from_fields(form.fields()).unwrap_err();
    assert_eq!(err.0.len(), 1);
    assert_eq!(err.0[0].to_string(), "Weight value must be a number.");
}
