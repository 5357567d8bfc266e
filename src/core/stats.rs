//! Population BMI statistics for a clinic: the average per sex, and the last
//! BMI of each patient grouped by how many classes they attended.

use crate::core::evaluator::round2;
use crate::domain::model::{BodyMassStats, ClassGroup, PopulationRecord, Sex};

/// Patients with this many classes or more (or an unknown count) share the last bucket.
pub const LAST_CLASS_BUCKET: u32 = 5;

fn bucket(classes_attended: u32) -> u32 {
    match classes_attended {
        1..=4 => classes_attended,
        _ => LAST_CLASS_BUCKET,
    }
}

fn stats_for<'a>(records: impl Iterator<Item = &'a PopulationRecord>) -> BodyMassStats {
    let mut groups: Vec<ClassGroup> = (1..=LAST_CLASS_BUCKET)
        .map(|classes_attended| ClassGroup {
            classes_attended,
            values: Vec::new(),
        })
        .collect();

    let mut sum = 0.0;
    let mut count = 0usize;
    for record in records {
        sum += record.last_bmi;
        count += 1;
        // bucket 從 1 開始
        groups[(bucket(record.classes_attended) - 1) as usize]
            .values
            .push(record.last_bmi);
    }

    groups.retain(|g| !g.values.is_empty());

    BodyMassStats {
        average: (count > 0).then(|| round2(sum / count as f64)),
        groups,
    }
}

/// Returns `[male, female]` statistics.
pub fn body_mass_statistics(records: &[PopulationRecord]) -> [BodyMassStats; 2] {
    let male = stats_for(records.iter().filter(|r| r.sex == Sex::Male));
    let female = stats_for(records.iter().filter(|r| r.sex == Sex::Female));
    tracing::debug!(
        records = records.len(),
        male_groups = male.groups.len(),
        female_groups = female.groups.len(),
        "body mass statistics computed"
    );
    [male, female]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sex: Sex, last_bmi: f64, classes_attended: u32) -> PopulationRecord {
        PopulationRecord {
            sex,
            last_bmi,
            classes_attended,
        }
    }

    #[test]
    fn test_empty_population() {
        let [male, female] = body_mass_statistics(&[]);
        assert_eq!(male, BodyMassStats::default());
        assert_eq!(female.average, None);
        assert!(female.groups.is_empty());
    }

    #[test]
    fn test_averages_per_sex() {
        let records = vec![
            record(Sex::Male, 30.0, 1),
            record(Sex::Male, 25.0, 1),
            record(Sex::Female, 22.5, 2),
        ];
        let [male, female] = body_mass_statistics(&records);
        assert_eq!(male.average, Some(27.5));
        assert_eq!(female.average, Some(22.5));
    }

    #[test]
    fn test_average_is_rounded() {
        let records = vec![
            record(Sex::Female, 20.0, 1),
            record(Sex::Female, 21.0, 1),
            record(Sex::Female, 21.0, 1),
        ];
        let [_, female] = body_mass_statistics(&records);
        assert_eq!(female.average, Some(20.67));
    }

    #[test]
    fn test_groups_skip_empty_buckets_and_fold_overflow() {
        let records = vec![
            record(Sex::Male, 31.0, 1),
            record(Sex::Male, 29.0, 3),
            record(Sex::Male, 27.0, 5),
            record(Sex::Male, 26.0, 9),
            record(Sex::Male, 33.0, 0),
        ];
        let [male, _] = body_mass_statistics(&records);

        let buckets: Vec<u32> = male.groups.iter().map(|g| g.classes_attended).collect();
        assert_eq!(buckets, vec![1, 3, 5]);
        assert_eq!(male.groups[2].values, vec![27.0, 26.0, 33.0]);
    }
}
