use super::common::*;
use crate::evaluation::domain::GradeBand;
use crate::evaluation::grading::GradeScale;

fn scale() -> GradeScale {
    GradeScale::new(grade_config().bands)
}

#[test]
fn worked_example_scores_map_to_expected_grades() {
    let scale = scale();

    assert_eq!(scale.grade_for(105.0), Some("A+"));
    assert_eq!(scale.grade_for(120.0), Some("S+"));
}

#[test]
fn band_edges_are_inclusive() {
    let scale = scale();

    assert_eq!(scale.grade_for(114.0), Some("S+"));
    assert_eq!(scale.grade_for(113.99), Some("S"));
    assert_eq!(scale.grade_for(102.0), Some("A+"));
    assert_eq!(scale.grade_for(0.0), Some("C"));
}

#[test]
fn every_reportable_score_maps_to_exactly_one_band() {
    let scale = scale();

    for hundredths in 0..=12_000 {
        let score = f64::from(hundredths) / 100.0;
        let matches = scale
            .bands()
            .iter()
            .filter(|band| band.min_range <= score && score <= band.max_range)
            .count();
        assert_eq!(matches, 1, "score {score} matched {matches} bands");
        assert!(scale.grade_for(score).is_some());
    }
}

#[test]
fn scores_outside_all_bands_have_no_grade() {
    let scale = scale();

    assert_eq!(scale.grade_for(120.5), None);
    assert_eq!(scale.grade_for(-1.0), None);
    assert_eq!(scale.grade_for(113.995), None);
}

#[test]
fn bands_are_ordered_by_descending_minimum() {
    let mut bands = grade_config().bands;
    bands.reverse();
    let scale = GradeScale::new(bands);

    assert_eq!(scale.bands()[0].grade, "S+");
    assert_eq!(scale.grade_for(105.0), Some("A+"));
}

#[test]
fn overlapping_bands_resolve_to_the_higher_band() {
    let scale = GradeScale::new(vec![
        GradeBand {
            grade: "B".to_string(),
            min_range: 80.0,
            max_range: 95.0,
        },
        GradeBand {
            grade: "A".to_string(),
            min_range: 90.0,
            max_range: 100.0,
        },
    ]);

    assert_eq!(scale.grade_for(92.0), Some("A"));
    assert_eq!(scale.grade_for(85.0), Some("B"));
}

#[test]
fn empty_scale_never_grades() {
    let scale = GradeScale::new(Vec::new());

    assert!(scale.is_empty());
    assert_eq!(scale.grade_for(100.0), None);
}
