use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{urlencode, SupabaseClient};

use crate::models::{CatalogError, ClinicService, CreateServiceRequest, UpdateServiceRequest};

pub struct ServiceCatalog {
    supabase: SupabaseClient,
}

impl ServiceCatalog {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Available services only. Unfiltered listings are grouped by category.
    pub async fn list_services(&self, category: Option<&str>) -> Result<Vec<ClinicService>, CatalogError> {
        let path = match category {
            Some(category) => format!(
                "/rest/v1/services?is_available=eq.true&category=eq.{}&order=name.asc",
                urlencode(category)
            ),
            None => "/rest/v1/services?is_available=eq.true&order=category.asc,name.asc".to_string(),
        };
        debug!("Listing services: {}", path);

        let services: Vec<ClinicService> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(services)
    }

    pub async fn get_service(&self, service_id: &Uuid) -> Result<ClinicService, CatalogError> {
        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let result: Vec<ClinicService> = self.supabase.request(Method::GET, &path, None).await?;

        result.into_iter().next().ok_or(CatalogError::NotFound)
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> Result<ClinicService, CatalogError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::Validation("Name is required".to_string()));
        }
        self.ensure_name_free(&name, None).await?;

        let service_data = json!({
            "name": name,
            "description": request.description,
            "category": request.category,
            "price": request.price,
            "duration": request.duration,
            "image": request.image,
            "is_available": request.is_available,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<ClinicService> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/services",
                Some(service_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let service = result
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::DatabaseError("Failed to create service".to_string()))?;

        info!("Service {} '{}' created", service.id, service.name);
        Ok(service)
    }

    pub async fn update_service(
        &self,
        service_id: &Uuid,
        mut request: UpdateServiceRequest,
    ) -> Result<ClinicService, CatalogError> {
        let current = self.get_service(service_id).await?;

        if let Some(name) = request.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::Validation("Name is required".to_string()));
            }
            if name != current.name {
                self.ensure_name_free(&name, Some(service_id)).await?;
            }
            request.name = Some(name);
        }

        let mut update_data = serde_json::to_value(&request)
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;
        if let Value::Object(ref mut fields) = update_data {
            if fields.is_empty() {
                return Ok(current);
            }
            fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
        }

        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let result: Vec<ClinicService> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(update_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let updated = result.into_iter().next().ok_or(CatalogError::NotFound)?;
        info!("Service {} updated", service_id);
        Ok(updated)
    }

    /// Hard delete. Appointments carry no service reference, so nothing else is touched.
    pub async fn delete_service(&self, service_id: &Uuid) -> Result<(), CatalogError> {
        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        if deleted.is_empty() {
            return Err(CatalogError::NotFound);
        }

        info!("Service {} deleted", service_id);
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<&Uuid>) -> Result<(), CatalogError> {
        let path = format!("/rest/v1/services?name=eq.{}&select=id", urlencode(name));
        let existing: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        let taken = existing.iter().any(|row| {
            let id = row["id"].as_str().and_then(|id| Uuid::parse_str(id).ok());
            id.as_ref() != except
        });

        if taken {
            warn!("Service name already in use: {}", name);
            return Err(CatalogError::DuplicateName);
        }
        Ok(())
    }
}
