use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One set of vital-sign measurements as entered in the capture form.
///
/// Blood pressure is kept as free text ("120/80") and may be empty; the
/// numeric vitals and the note are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Blood pressure as entered, e.g. "120/80".
    #[serde(default)]
    pub pressure: String,
    /// Heart rate in beats per minute.
    pub hr: Option<i64>,
    /// Oxygen saturation in percent (0-100).
    pub spo2: Option<f64>,
    /// Free-text clinical note.
    pub note: Option<String>,
}

/// One timestamped vitals observation, owned by the user who recorded it.
///
/// Records are immutable once created: there are no update or delete
/// operations anywhere in the system. Wire names are camelCase to match
/// the document shape the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsRecord {
    /// Store-assigned unique identifier.
    pub id: String,
    /// Free-text patient identifier; a patient may have many records.
    pub patient_id: String,
    pub vitals: Vitals,
    /// Stamped by the store at write time. Documents without a timestamp
    /// sort as oldest possible (epoch zero).
    pub created_at: Option<DateTime<Utc>>,
    /// Identifier of the user who created the record.
    pub created_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_document_with_missing_vitals() {
        let record: VitalsRecord = serde_json::from_str(
            r#"{
                "id": "abc",
                "patientId": "P1",
                "vitals": { "spo2": 97.5 },
                "createdAt": null,
                "createdBy": "user-1"
            }"#,
        )
        .unwrap();

        assert_eq!(record.patient_id, "P1");
        assert_eq!(record.vitals.spo2, Some(97.5));
        assert_eq!(record.vitals.pressure, "");
        assert_eq!(record.vitals.hr, None);
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let record = VitalsRecord {
            id: "abc".to_string(),
            patient_id: "P1".to_string(),
            vitals: Vitals::default(),
            created_at: None,
            created_by: "user-1".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("patientId").is_some());
        assert!(json.get("createdBy").is_some());
        assert!(json.get("patient_id").is_none());
    }
}
