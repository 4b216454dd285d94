use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{urlencode, SupabaseClient};
use shared_models::auth::{User, UserRole};

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, UpdateDoctorRequest};

const DOCTOR_SELECT: &str = "select=*,user:users(name,email)";

/// Folds one more rating into a running mean, rounded to one decimal.
pub fn next_rating(current: f64, count: i32, value: f64) -> (f64, i32) {
    let total = count + 1;
    let mean = (current * f64::from(count) + value) / f64::from(total);
    (round_to_tenth(mean), total)
}

/// Rounds the exact binary value to one decimal, ties away from zero.
///
/// `(x * 10.0).round()` is not enough: 4.35 is stored just below 4.35 but the
/// product rounds to exactly 43.5.
fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let magnitude = value.abs();
    let scaled = magnitude * 10.0;
    // Exact error of the product above.
    let residual = magnitude.mul_add(10.0, -scaled);
    let floor = scaled.floor();
    let above_half = (scaled - floor) - 0.5;

    let tenths = if above_half >= -residual { floor + 1.0 } else { floor };
    (tenths / 10.0).copysign(value)
}

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// All doctors, best rated first, optionally limited to one specialization.
    pub async fn list_doctors(&self, specialization: Option<&str>) -> Result<Vec<Doctor>, DoctorError> {
        let mut path = format!("/rest/v1/doctors?{}&order=rating.desc", DOCTOR_SELECT);
        if let Some(specialization) = specialization {
            path.push_str(&format!("&specialization=eq.{}", urlencode(specialization)));
        }
        debug!("Listing doctors: {}", path);

        let doctors: Vec<Doctor> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: &Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}&{}", doctor_id, DOCTOR_SELECT);
        let result: Vec<Doctor> = self.supabase.request(Method::GET, &path, None).await?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for user: {}", request.user_id);

        match self.supabase.get_user(&request.user_id).await? {
            Some(user) if user.role == UserRole::Doctor => {}
            _ => {
                warn!("User {} is missing or not a doctor", request.user_id);
                return Err(DoctorError::InvalidUser);
            }
        }

        let existing_path = format!("/rest/v1/doctors?user_id=eq.{}&select=id", request.user_id);
        let existing: Vec<Value> = self.supabase.request(Method::GET, &existing_path, None).await?;
        if !existing.is_empty() {
            warn!("Doctor profile already exists for user {}", request.user_id);
            return Err(DoctorError::ProfileExists);
        }

        let doctor_data = json!({
            "user_id": request.user_id,
            "specialization": request.specialization,
            "qualifications": request.qualifications,
            "experience": request.experience,
            "available_days": request.available_days,
            "available_time_slots": request.available_time_slots,
            "consultation_fee": request.consultation_fee,
            "languages": request.languages,
            "about": request.about,
            "rating": 0.0,
            "total_ratings": 0,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(doctor_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let doctor = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::DatabaseError("Failed to create doctor profile".to_string()))?;

        info!("Doctor profile {} created for user {}", doctor.id, doctor.user_id);
        Ok(doctor)
    }

    /// Applies an allow-listed update.
    ///
    /// Editing is limited to admins and the doctor who owns the profile. Earlier
    /// releases let any signed-in user patch any doctor; other callers now get 403.
    pub async fn update_doctor(
        &self,
        caller: &User,
        doctor_id: &Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;

        if !caller.is_admin() && doctor.user_id != caller.id {
            warn!("User {} tried to edit doctor profile {}", caller.id, doctor_id);
            return Err(DoctorError::NotOwner);
        }

        let mut update_data = serde_json::to_value(&request)
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        if let Value::Object(ref mut fields) = update_data {
            if fields.is_empty() {
                return Ok(doctor);
            }
            fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
        }

        let updated = self.patch_doctor(doctor_id, update_data).await?;
        info!("Doctor profile {} updated by {}", doctor_id, caller.id);
        Ok(updated)
    }

    pub async fn rate_doctor(&self, doctor_id: &Uuid, value: f64) -> Result<Doctor, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;

        // Read-then-write: concurrent ratings can overwrite each other.
        let (rating, total_ratings) = next_rating(doctor.rating, doctor.total_ratings, value);
        debug!(
            "Doctor {} rating {} over {} -> {} over {}",
            doctor_id, doctor.rating, doctor.total_ratings, rating, total_ratings
        );

        let updated = self
            .patch_doctor(
                doctor_id,
                json!({
                    "rating": rating,
                    "total_ratings": total_ratings,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        info!("Doctor {} rated, new mean {}", doctor_id, updated.rating);
        Ok(updated)
    }

    async fn patch_doctor(&self, doctor_id: &Uuid, body: Value) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&{}", doctor_id, DOCTOR_SELECT);
        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_mean_is_rounded_to_one_decimal() {
        assert_eq!(next_rating(4.0, 2, 5.0), (4.3, 3));
    }

    #[test]
    fn first_rating_becomes_the_mean() {
        assert_eq!(next_rating(0.0, 0, 3.0), (3.0, 1));
    }

    #[test]
    fn mean_just_below_a_half_rounds_down() {
        // (4.7 + 4) / 2 is stored as 4.3499999...
        assert_eq!(next_rating(4.7, 1, 4.0), (4.3, 2));
    }

    #[test]
    fn exact_half_rounds_away_from_zero() {
        assert_eq!(next_rating(4.0, 1, 4.5), (4.3, 2));
        assert_eq!(next_rating(0.0, 0, -2.25), (-2.3, 1));
    }

    #[test]
    fn rating_value_is_not_range_checked() {
        assert_eq!(next_rating(5.0, 1, 11.0), (8.0, 2));
    }
}
