use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Systolic/diastolic pressure in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

/// Problem-area-specific symptom group.
///
/// A record carries exactly one group, selected at submission time. The sum
/// type makes "only the active group exists" a compile-time fact: there is
/// no way to populate throat symptoms on a diabetes record, and serializing
/// a record can never leak fields of an inactive group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "problem_area", rename_all = "lowercase")]
pub enum Symptoms {
    Throat {
        #[serde(default)]
        difficulty_swallowing: bool,
        #[serde(default)]
        throat_pain: bool,
    },
    Skin {
        #[serde(default)]
        rash: bool,
        #[serde(default)]
        itching: bool,
        #[serde(default)]
        swelling: bool,
        #[serde(default)]
        redness: bool,
    },
    Respiratory {
        #[serde(default)]
        breathlessness: bool,
        #[serde(default)]
        chest_tightness: bool,
    },
    Cardiovascular {
        #[serde(default)]
        chest_pain: bool,
    },
    Diabetes {
        #[serde(default)]
        blood_sugar: Option<f64>,
        #[serde(default)]
        frequent_thirst: bool,
        #[serde(default)]
        frequent_urination: bool,
    },
}

impl Symptoms {
    /// The problem-area discriminant, as submitted.
    pub fn problem_area(&self) -> &'static str {
        match self {
            Symptoms::Throat { .. } => "throat",
            Symptoms::Skin { .. } => "skin",
            Symptoms::Respiratory { .. } => "respiratory",
            Symptoms::Cardiovascular { .. } => "cardiovascular",
            Symptoms::Diabetes { .. } => "diabetes",
        }
    }

    /// The active group's fields as a JSON object, without the discriminant.
    /// Used when embedding symptoms into a prompt.
    pub fn detail(&self) -> Value {
        match *self {
            Symptoms::Throat {
                difficulty_swallowing,
                throat_pain,
            } => json!({
                "difficulty_swallowing": difficulty_swallowing,
                "throat_pain": throat_pain,
            }),
            Symptoms::Skin {
                rash,
                itching,
                swelling,
                redness,
            } => json!({
                "rash": rash,
                "itching": itching,
                "swelling": swelling,
                "redness": redness,
            }),
            Symptoms::Respiratory {
                breathlessness,
                chest_tightness,
            } => json!({
                "breathlessness": breathlessness,
                "chest_tightness": chest_tightness,
            }),
            Symptoms::Cardiovascular { chest_pain } => json!({
                "chest_pain": chest_pain,
            }),
            Symptoms::Diabetes {
                blood_sugar,
                frequent_thirst,
                frequent_urination,
            } => json!({
                "blood_sugar": blood_sugar,
                "frequent_thirst": frequent_thirst,
                "frequent_urination": frequent_urination,
            }),
        }
    }
}

/// A submitted clinical record: vitals plus one symptom group.
///
/// The core only ever reads these; creation happens through
/// [`crate::RecordStore::create`] and nothing mutates a record afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    pub heart_rate: u32,
    pub spo2: u32,
    pub temperature: f64,
    pub blood_pressure: BloodPressure,
    pub symptoms: Symptoms,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a record; ids and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHealthRecord {
    pub heart_rate: u32,
    pub spo2: u32,
    pub temperature: f64,
    pub blood_pressure: BloodPressure,
    pub symptoms: Symptoms,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symptoms_tagged_by_problem_area() {
        let symptoms = Symptoms::Throat {
            difficulty_swallowing: true,
            throat_pain: false,
        };

        let json = serde_json::to_value(&symptoms).unwrap();
        assert_eq!(json["problem_area"], "throat");
        assert_eq!(json["difficulty_swallowing"], true);
    }

    #[test]
    fn test_symptoms_deserialize_with_defaults() {
        let symptoms: Symptoms =
            serde_json::from_value(json!({ "problem_area": "skin", "rash": true })).unwrap();

        assert_eq!(
            symptoms,
            Symptoms::Skin {
                rash: true,
                itching: false,
                swelling: false,
                redness: false,
            }
        );
    }

    #[test]
    fn test_detail_excludes_discriminant() {
        let symptoms = Symptoms::Diabetes {
            blood_sugar: Some(140.0),
            frequent_thirst: true,
            frequent_urination: false,
        };

        let detail = symptoms.detail();
        assert!(detail.get("problem_area").is_none());
        assert_eq!(detail["blood_sugar"], 140.0);
        assert_eq!(detail["frequent_thirst"], true);
    }

    #[test]
    fn test_problem_area_names() {
        let cardio = Symptoms::Cardiovascular { chest_pain: true };
        assert_eq!(cardio.problem_area(), "cardiovascular");

        let resp: Symptoms =
            serde_json::from_value(json!({ "problem_area": "respiratory" })).unwrap();
        assert_eq!(resp.problem_area(), "respiratory");
    }
}
