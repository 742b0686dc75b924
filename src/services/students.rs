//! Student registry service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, UpdateStudent},
    repository::Repository,
};

use super::optional_text;

#[derive(Clone)]
pub struct StudentsService {
    repository: Repository,
}

impl StudentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_students(&self, search: Option<&str>) -> AppResult<Vec<Student>> {
        self.repository.students.list(search).await
    }

    pub async fn get_student(&self, id: i64) -> AppResult<Student> {
        self.repository.students.get_by_id(id).await
    }

    pub async fn add_student(&self, student: CreateStudent) -> AppResult<Student> {
        student.validate()?;

        let student = CreateStudent {
            name: student.name.trim().to_string(),
            class: optional_text(student.class),
            contact: optional_text(student.contact),
        };

        let created = self.repository.students.create(&student).await?;
        tracing::info!("Registered student {} '{}'", created.id, created.name);
        Ok(created)
    }

    pub async fn update_student(&self, id: i64, changes: UpdateStudent) -> AppResult<Student> {
        changes.validate()?;

        let changes = UpdateStudent {
            name: changes.name.map(|n| n.trim().to_string()),
            class: changes.class.map(|c| c.trim().to_string()),
            contact: changes.contact.map(|c| c.trim().to_string()),
        };

        let updated = self.repository.students.update(id, &changes).await?;
        tracing::info!("Updated student {}", id);
        Ok(updated)
    }

    /// Delete a student who holds no book
    pub async fn delete_student(&self, id: i64) -> AppResult<()> {
        if let Err(e) = self.repository.students.delete(id).await {
            if matches!(e, AppError::Conflict(_)) {
                tracing::warn!("Refused to delete student {}: {}", id, e);
            }
            return Err(e);
        }
        tracing::info!("Deleted student {}", id);
        Ok(())
    }
}
