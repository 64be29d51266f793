use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::User;
use shared_utils::policy::{can_perform, Action, Resource};

use crate::error::ScheduleError;
use crate::models::{Specialty, SpecialtyInput};
use crate::store::SpecialtyStore;

pub struct SpecialtyService {
    specialties: Arc<dyn SpecialtyStore>,
}

impl SpecialtyService {
    pub fn new(specialties: Arc<dyn SpecialtyStore>) -> Self {
        Self { specialties }
    }

    /// Active specialties ordered by name.
    pub async fn list_specialties(&self) -> Result<Vec<Specialty>, ScheduleError> {
        let mut specialties: Vec<Specialty> = self.specialties.list().await?
            .into_iter()
            .filter(|specialty| specialty.is_active)
            .collect();

        specialties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specialties)
    }

    pub async fn get_specialty(&self, id: Uuid) -> Result<Option<Specialty>, ScheduleError> {
        Ok(self.specialties.get(id).await?)
    }

    pub async fn create_specialty(&self, user: &User, input: SpecialtyInput) -> Result<Specialty, ScheduleError> {
        ensure_admin(user, Action::CreateSpecialty)?;
        let (name, description) = validate_input(input)?;

        let now = Utc::now();
        let specialty = Specialty {
            id: Uuid::new_v4(),
            name,
            description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.specialties.insert(specialty).await.map_err(|e| {
            if e.is_conflict() {
                ScheduleError::Conflict("A specialty with this name already exists".to_string())
            } else {
                e.into()
            }
        })?;

        info!("Specialty created: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update_specialty(
        &self,
        user: &User,
        id: Uuid,
        input: SpecialtyInput,
    ) -> Result<Specialty, ScheduleError> {
        ensure_admin(user, Action::UpdateSpecialty)?;
        let (name, description) = validate_input(input)?;

        let mut specialty = self.require(id).await?;
        specialty.name = name;
        specialty.description = description;
        specialty.updated_at = Utc::now();

        debug!("Updating specialty {}", id);
        self.specialties.update(specialty).await.map_err(|e| {
            if e.is_conflict() {
                ScheduleError::Conflict("A specialty with this name already exists".to_string())
            } else {
                e.into()
            }
        })
    }

    pub async fn deactivate_specialty(&self, user: &User, id: Uuid) -> Result<Specialty, ScheduleError> {
        ensure_admin(user, Action::DeactivateSpecialty)?;

        let mut specialty = self.require(id).await?;
        specialty.is_active = false;
        specialty.updated_at = Utc::now();

        info!("Deactivating specialty {}", id);
        Ok(self.specialties.update(specialty).await?)
    }

    async fn require(&self, id: Uuid) -> Result<Specialty, ScheduleError> {
        self.specialties.get(id).await?
            .ok_or_else(|| ScheduleError::NotFound(format!("Specialty {} not found", id)))
    }
}

fn ensure_admin(user: &User, action: Action) -> Result<(), ScheduleError> {
    if can_perform(user, action, Resource::Specialty) {
        Ok(())
    } else {
        Err(ScheduleError::Unauthorized("administrator role required".to_string()))
    }
}

fn validate_input(input: SpecialtyInput) -> Result<(String, String), ScheduleError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ScheduleError::Validation("Specialty name is required".to_string()));
    }
    if input.description.trim().is_empty() {
        return Err(ScheduleError::Validation("Specialty description is required".to_string()));
    }

    Ok((name, input.description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_utils::test_utils::TestUser;

    use crate::store::InMemorySpecialtyStore;

    fn service() -> SpecialtyService {
        SpecialtyService::new(Arc::new(InMemorySpecialtyStore::new()))
    }

    fn input(name: &str) -> SpecialtyInput {
        SpecialtyInput {
            name: name.to_string(),
            description: format!("{} description", name),
        }
    }

    #[tokio::test]
    async fn test_only_admins_manage_specialties() {
        let service = service();
        let doctor = TestUser::doctor("doc@example.com").to_user();

        let result = service.create_specialty(&doctor, input("Cardiology")).await;
        assert_matches!(result, Err(ScheduleError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_names_are_trimmed_and_unique() {
        let service = service();
        let admin = TestUser::admin("admin@example.com").to_user();

        let created = service.create_specialty(&admin, input("  Cardiology ")).await.unwrap();
        assert_eq!(created.name, "Cardiology");

        let duplicate = service.create_specialty(&admin, input("Cardiology")).await;
        assert_matches!(duplicate, Err(ScheduleError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let service = service();
        let admin = TestUser::admin("admin@example.com").to_user();

        let result = service.create_specialty(&admin, input("   ")).await;
        assert_matches!(result, Err(ScheduleError::Validation(_)));
    }

    #[tokio::test]
    async fn test_listing_hides_deactivated_and_sorts_by_name() {
        let service = service();
        let admin = TestUser::admin("admin@example.com").to_user();

        service.create_specialty(&admin, input("Pediatrics")).await.unwrap();
        let neuro = service.create_specialty(&admin, input("Neurology")).await.unwrap();
        service.create_specialty(&admin, input("Cardiology")).await.unwrap();
        service.deactivate_specialty(&admin, neuro.id).await.unwrap();

        let names: Vec<_> = service.list_specialties().await.unwrap()
            .into_iter()
            .map(|specialty| specialty.name)
            .collect();
        assert_eq!(names, vec!["Cardiology", "Pediatrics"]);

        // Deactivated specialties remain addressable by id.
        let fetched = service.get_specialty(neuro.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn test_update_unknown_specialty() {
        let service = service();
        let admin = TestUser::admin("admin@example.com").to_user();

        let result = service.update_specialty(&admin, Uuid::new_v4(), input("Dermatology")).await;
        assert_matches!(result, Err(ScheduleError::NotFound(_)));
    }
}
