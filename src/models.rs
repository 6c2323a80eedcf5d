use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{validate_gender, validate_student_id};

/// Records serialize with the keys the web client reads; columns keep their
/// SQL names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct College {
    #[serde(rename = "code")]
    pub college_code: String,
    #[serde(rename = "name")]
    pub college_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Program {
    #[serde(rename = "code")]
    pub program_code: String,
    #[serde(rename = "name")]
    pub program_name: String,
    #[serde(rename = "collegeCode")]
    pub college_code: String,
    #[serde(rename = "collegeName")]
    pub college_name: Option<String>, // Joined for display
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    #[serde(rename = "id")]
    pub student_id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub gender: String,
    #[serde(rename = "course")]
    pub program_code: String,
    #[serde(rename = "yearLevel")]
    pub year_level: i64,
    #[serde(rename = "profileImage")]
    pub profile_image_url: Option<String>,
    #[serde(rename = "programName")]
    pub program_name: Option<String>, // Joined for display
}

#[derive(Debug, Clone, Validate)]
pub struct NewCollege {
    #[validate(length(
        min = 2,
        max = 10,
        message = "College code must be between 2 and 10 characters"
    ))]
    pub college_code: String,
    #[validate(length(min = 3, message = "College name must be at least 3 characters"))]
    pub college_name: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewProgram {
    #[validate(length(
        min = 2,
        max = 10,
        message = "Program code must be between 2 and 10 characters"
    ))]
    pub program_code: String,
    #[validate(length(min = 3, message = "Program name must be at least 3 characters"))]
    pub program_name: String,
    #[validate(length(
        min = 2,
        max = 10,
        message = "College code must be between 2 and 10 characters"
    ))]
    pub college_code: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewStudent {
    #[validate(custom(function = "validate_student_id"))]
    pub student_id: String,
    #[validate(length(max = 100, message = "First name is too long"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Last name is too long"))]
    pub last_name: String,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
    #[validate(length(
        min = 2,
        max = 10,
        message = "Program code must be between 2 and 10 characters"
    ))]
    pub program_code: String,
    #[validate(range(min = 1, max = 5, message = "Year level must be between 1 and 5"))]
    pub year_level: i64,
    pub profile_image_url: Option<String>,
}

impl NewCollege {
    pub const FIELD_ORDER: [&'static str; 2] = ["college_code", "college_name"];
}

impl NewProgram {
    pub const FIELD_ORDER: [&'static str; 3] = ["program_code", "program_name", "college_code"];
}

impl NewStudent {
    pub const FIELD_ORDER: [&'static str; 6] = [
        "student_id",
        "first_name",
        "last_name",
        "gender",
        "program_code",
        "year_level",
    ];
}
