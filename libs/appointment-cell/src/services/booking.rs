use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{urlencode, SupabaseClient};
use shared_models::auth::{User, UserRole};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookedSlot, CreateAppointmentRequest,
};
use crate::services::slots::open_slots;

const WITH_DOCTOR: &str = "doctor:users!appointments_doctor_id_fkey(name)";
const WITH_PATIENT: &str = "patient:users!appointments_patient_id_fkey(name)";

/// Role rules for a status change. Admins may change anything.
pub fn check_status_change(
    user: &User,
    appointment: &Appointment,
    status: AppointmentStatus,
) -> Result<(), AppointmentError> {
    let allowed = match user.role {
        UserRole::Patient => {
            appointment.patient_id == user.id && status == AppointmentStatus::Cancelled
        }
        UserRole::Doctor => appointment.doctor_id == user.id,
        UserRole::Admin => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppointmentError::Unauthorized)
    }
}

pub struct AppointmentBookingService {
    supabase: SupabaseClient,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Books a slot for the calling patient.
    ///
    /// The availability check and the insert are two separate store calls, so two
    /// concurrent requests for the same slot can both succeed.
    pub async fn book_appointment(
        &self,
        patient: &User,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let time = request.time.trim().to_string();
        if time.is_empty() {
            return Err(AppointmentError::ValidationError("Time is required".to_string()));
        }
        debug!(
            "Booking doctor {} on {} at {} for patient {}",
            request.doctor_id, request.date, time, patient.id
        );

        let doctor_path = format!(
            "/rest/v1/users?id=eq.{}&role=eq.doctor&select=id",
            request.doctor_id
        );
        let doctors: Vec<Value> = self.supabase.request(Method::GET, &doctor_path, None).await?;
        if doctors.is_empty() {
            warn!("Booking rejected, {} is not a doctor", request.doctor_id);
            return Err(AppointmentError::DoctorNotFound);
        }

        let taken_path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time=eq.{}&status=neq.cancelled&select=id",
            request.doctor_id,
            request.date,
            urlencode(&time)
        );
        let taken: Vec<Value> = self.supabase.request(Method::GET, &taken_path, None).await?;
        if !taken.is_empty() {
            warn!(
                "Booking rejected, doctor {} already booked on {} at {}",
                request.doctor_id, request.date, time
            );
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment_data = json!({
            "patient_id": patient.id,
            "doctor_id": request.doctor_id,
            "date": request.date,
            "time": time,
            "reason": request.reason,
            "status": AppointmentStatus::Pending,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(appointment_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let appointment = result.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Failed to create appointment".to_string())
        })?;

        info!(
            "Appointment {} booked with doctor {} on {} at {}",
            appointment.id, appointment.doctor_id, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Patients see their own bookings, doctors the ones made with them, admins all.
    pub async fn list_appointments(&self, user: &User) -> Result<Vec<Appointment>, AppointmentError> {
        let path = match user.role {
            UserRole::Patient => format!(
                "/rest/v1/appointments?patient_id=eq.{}&select=*,{}&order=date.asc,time.asc",
                user.id, WITH_DOCTOR
            ),
            UserRole::Doctor => format!(
                "/rest/v1/appointments?doctor_id=eq.{}&select=*,{}&order=date.asc,time.asc",
                user.id, WITH_PATIENT
            ),
            UserRole::Admin => format!(
                "/rest/v1/appointments?select=*,{},{}&order=date.asc,time.asc",
                WITH_PATIENT, WITH_DOCTOR
            ),
        };
        debug!("Listing appointments for {} {}", user.role, user.id);

        let appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(appointments)
    }

    pub async fn get_appointment(&self, appointment_id: &Uuid) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;

        result.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn update_status(
        &self,
        user: &User,
        appointment_id: &Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        if let Err(e) = check_status_change(user, &appointment, status) {
            warn!(
                "{} {} may not set appointment {} to {}",
                user.role, user.id, appointment_id, status
            );
            return Err(e);
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({
                    "status": status,
                    "updated_at": Utc::now().to_rfc3339()
                })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let updated = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        info!(
            "Appointment {} moved from {} to {} by {}",
            appointment_id, appointment.status, updated.status, user.id
        );
        Ok(updated)
    }

    pub async fn available_slots(
        &self,
        doctor_id: &Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=neq.cancelled&select=time,status",
            doctor_id, date
        );
        let booked: Vec<BookedSlot> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("Doctor {} has {} bookings on {}", doctor_id, booked.len(), date);

        Ok(open_slots(&booked))
    }
}
