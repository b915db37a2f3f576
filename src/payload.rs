use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::grading::DerivedFeatures;
use crate::sync::FeatureSnapshot;
use crate::validation::{HighSchoolInputs, TemporalContext};

/// The academic slice of the prediction request.
///
/// Keys match the names the CGPA model was trained on. Unset values are
/// omitted rather than sent as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcademicFeatures {
    pub olevel_subjects: Option<usize>,
    pub uce_distinctions: Option<usize>,
    pub uce_credits: Option<usize>,
    pub average_olevel_grade: Option<f64>,
    pub count_weak_grades_olevel: Option<usize>,
    pub std_dev_olevel_grade: Option<f64>,
    pub best_sum_out_of_six: Option<u32>,
    pub best_sum_out_of_eight: Option<u32>,
    pub best_sum_out_of_ten: Option<u32>,
    pub highest_olevel_grade: Option<u32>,
    pub lowest_olevel_grade: Option<u32>,

    pub alevel_total_grade_weight: Option<f64>,
    pub alevel_average_grade_weight: Option<f64>,
    pub alevel_std_dev_grade_weight: Option<f64>,
    pub alevel_dominant_grade_weight: Option<f64>,
    pub alevel_count_weak_grades: Option<usize>,
    pub general_paper: Option<u8>,
    pub high_school_performance_variance: Option<f64>,
    pub high_school_performance_stability_index: Option<f64>,

    pub uce_year_code: Option<i32>,
    pub uace_year_code: Option<i32>,
    pub year_of_entry_code: Option<i32>,
}

impl AcademicFeatures {
    pub fn new(
        olevel: Option<&DerivedFeatures>,
        alevel: Option<&DerivedFeatures>,
        years: &TemporalContext,
        high_school: &HighSchoolInputs,
    ) -> Self {
        let high_school = high_school.accepted();
        let mut features = AcademicFeatures {
            general_paper: high_school.general_paper,
            high_school_performance_variance: high_school.performance_variance,
            high_school_performance_stability_index: high_school.performance_stability_index,
            uce_year_code: years.olevel_year,
            uace_year_code: years.alevel_year,
            year_of_entry_code: years.entry_year,
            ..Default::default()
        };

        if let Some(o) = olevel {
            features.olevel_subjects = Some(o.count);
            features.uce_distinctions = Some(o.distinction_count);
            features.uce_credits = o.credit_count;
            features.average_olevel_grade = Some(o.average);
            features.count_weak_grades_olevel = Some(o.weak_count);
            features.std_dev_olevel_grade = Some(o.std_dev);
            if let Some(ref x) = o.extremes {
                features.best_sum_out_of_six = x.best_sum_of_six;
                features.best_sum_out_of_eight = x.best_sum_of_eight;
                features.best_sum_out_of_ten = x.best_sum_of_ten;
                features.highest_olevel_grade = Some(x.highest);
                features.lowest_olevel_grade = Some(x.lowest);
            }
        }

        if let Some(a) = alevel {
            features.alevel_total_grade_weight = Some(f64::from(a.total));
            features.alevel_average_grade_weight = Some(a.average);
            features.alevel_std_dev_grade_weight = Some(a.std_dev);
            features.alevel_dominant_grade_weight = Some(f64::from(a.dominant));
            features.alevel_count_weak_grades = Some(a.weak_count);
        }

        features
    }

    /// Every key in wire order, with its value if set.
    pub fn entries(&self) -> Vec<(&'static str, Option<Value>)> {
        fn v<T: Into<Value>>(x: Option<T>) -> Option<Value> {
            x.map(Into::into)
        }

        vec![
            ("olevel_subjects", v(self.olevel_subjects)),
            ("uce_distinctions", v(self.uce_distinctions)),
            ("uce_credits", v(self.uce_credits)),
            ("average_olevel_grade", v(self.average_olevel_grade)),
            ("count_weak_grades_olevel", v(self.count_weak_grades_olevel)),
            ("std_dev_olevel_grade", v(self.std_dev_olevel_grade)),
            ("best_sum_out_of_six", v(self.best_sum_out_of_six)),
            ("best_sum_out_of_eight", v(self.best_sum_out_of_eight)),
            ("best_sum_out_of_ten", v(self.best_sum_out_of_ten)),
            ("highest_olevel_grade", v(self.highest_olevel_grade)),
            ("lowest_olevel_grade", v(self.lowest_olevel_grade)),
            ("alevel_total_grade_weight", v(self.alevel_total_grade_weight)),
            ("alevel_average_grade_weight", v(self.alevel_average_grade_weight)),
            ("alevel_std_dev_grade_weight", v(self.alevel_std_dev_grade_weight)),
            ("alevel_dominant_grade_weight", v(self.alevel_dominant_grade_weight)),
            ("alevel_count_weak_grades", v(self.alevel_count_weak_grades)),
            ("general_paper", v(self.general_paper)),
            (
                "high_school_performance_variance",
                v(self.high_school_performance_variance),
            ),
            (
                "high_school_performance_stability_index",
                v(self.high_school_performance_stability_index),
            ),
            ("uce_year_code", v(self.uce_year_code)),
            ("uace_year_code", v(self.uace_year_code)),
            ("year_of_entry_code", v(self.year_of_entry_code)),
        ]
    }

    /// Flat key → value view of the set fields, for diffing.
    pub fn to_snapshot(&self) -> FeatureSnapshot {
        self.entries()
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
            .collect()
    }
}

impl Serialize for AcademicFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in entries {
            if let Some(value) = value {
                map.serialize_entry(key, &value)?;
            }
        }
        map.end()
    }
}
