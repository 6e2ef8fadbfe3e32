use serde::{Deserialize, Serialize};

/// 無法從文字判斷時填入的值
pub const SENTINEL: &str = "Not specified";

/// 輸出 schema 的七個必要欄位，依輸出順序排列，附上給模型看的說明
pub const REQUIRED_FIELDS: [(&str, &str); 7] = [
    ("date", "The date mentioned or current date"),
    (
        "branding_priorities",
        "Branding or awareness priorities and campaigns",
    ),
    ("cleaning_slots", "Scheduled cleaning times and teams"),
    (
        "stabling_geometry",
        "Train identifiers and stabling information",
    ),
    (
        "fitness_certificates",
        "Fitness and certificate validity information",
    ),
    (
        "job_card_status",
        "Status of job cards and maintenance work",
    ),
    ("mileage", "Mileage information if available"),
];

/// The normalized record returned for every conversion.
///
/// Every field is always populated; anything that could not be determined
/// holds [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRecord {
    pub date: String,
    pub branding_priorities: String,
    pub cleaning_slots: String,
    pub stabling_geometry: String,
    pub fitness_certificates: String,
    pub job_card_status: String,
    pub mileage: String,
}

impl TrainRecord {
    pub fn unspecified() -> Self {
        Self {
            date: SENTINEL.to_string(),
            branding_priorities: SENTINEL.to_string(),
            cleaning_slots: SENTINEL.to_string(),
            stabling_geometry: SENTINEL.to_string(),
            fitness_certificates: SENTINEL.to_string(),
            job_card_status: SENTINEL.to_string(),
            mileage: SENTINEL.to_string(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "date" => &self.date,
            "branding_priorities" => &self.branding_priorities,
            "cleaning_slots" => &self.cleaning_slots,
            "stabling_geometry" => &self.stabling_geometry,
            "fitness_certificates" => &self.fitness_certificates,
            "job_card_status" => &self.job_card_status,
            "mileage" => &self.mileage,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "date" => Some(&mut self.date),
            "branding_priorities" => Some(&mut self.branding_priorities),
            "cleaning_slots" => Some(&mut self.cleaning_slots),
            "stabling_geometry" => Some(&mut self.stabling_geometry),
            "fitness_certificates" => Some(&mut self.fitness_certificates),
            "job_card_status" => Some(&mut self.job_card_status),
            "mileage" => Some(&mut self.mileage),
            _ => None,
        }
    }

    /// 仍為 [`SENTINEL`] 的欄位名稱
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| self.field(name) == Some(SENTINEL))
            .collect()
    }
}

impl Default for TrainRecord {
    fn default() -> Self {
        Self::unspecified()
    }
}
