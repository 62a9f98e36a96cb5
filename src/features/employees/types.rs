use serde::{Deserialize, Serialize};

/// An employee record as the backend stores it. Resume fields are filled in
/// by the backend's parsing pipeline after an upload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default)]
    pub id: Option<u64>,
    pub fname: String,
    pub lname: String,
    pub email: String,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub joining_date: String,
    #[serde(default)]
    pub profile_photo_path: Option<String>,
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub resume_score: Option<u32>,
    #[serde(default)]
    pub resume_status: Option<String>,
    #[serde(default)]
    pub job_id: Option<u64>,
}
