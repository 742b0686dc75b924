//! Students repository for database operations

use sqlx::{Pool, Sqlite, SqliteExecutor};

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, UpdateStudent},
};

use super::{begin_write, like_pattern, loans, search_term};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Sqlite>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Student> {
        fetch_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// List students ordered by name, optionally filtered on name/class/contact
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Student>> {
        let students = match search_term(search) {
            Some(term) => {
                sqlx::query_as::<_, Student>(
                    r#"
                    SELECT * FROM students
                    WHERE LOWER(name) LIKE ?1 ESCAPE '\'
                       OR LOWER(COALESCE(class, '')) LIKE ?1 ESCAPE '\'
                       OR LOWER(COALESCE(contact, '')) LIKE ?1 ESCAPE '\'
                    ORDER BY name, id
                    "#,
                )
                .bind(like_pattern(term))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY name, id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(students)
    }

    pub async fn create(&self, student: &CreateStudent) -> AppResult<Student> {
        let id = sqlx::query("INSERT INTO students (name, class, contact) VALUES (?, ?, ?)")
            .bind(&student.name)
            .bind(&student.class)
            .bind(&student.contact)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Student {
            id,
            name: student.name.clone(),
            class: student.class.clone(),
            contact: student.contact.clone(),
        })
    }

    /// Apply a partial update; empty class/contact clear the stored value
    pub async fn update(&self, id: i64, changes: &UpdateStudent) -> AppResult<Student> {
        let mut tx = begin_write(&self.pool).await?;

        let mut student = fetch_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))?;

        if let Some(ref name) = changes.name {
            student.name = name.clone();
        }
        if let Some(ref class) = changes.class {
            student.class = Some(class.clone()).filter(|c| !c.is_empty());
        }
        if let Some(ref contact) = changes.contact {
            student.contact = Some(contact.clone()).filter(|c| !c.is_empty());
        }

        sqlx::query("UPDATE students SET name = ?, class = ?, contact = ? WHERE id = ?")
            .bind(&student.name)
            .bind(&student.class)
            .bind(&student.contact)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(student)
    }

    /// Delete a student unless they still hold a book
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        if fetch_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(format!("Student with id {} not found", id)));
        }

        let issued = loans::count_issued_for_student(&mut *tx, id).await?;
        if issued > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete student {}: {} book(s) currently issued",
                id, issued
            )));
        }

        sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: i64) -> AppResult<Option<Student>>
where
    E: SqliteExecutor<'e>,
{
    let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(student)
}

/// All students in id order
pub(crate) async fn fetch_all<'e, E>(executor: E) -> AppResult<Vec<Student>>
where
    E: SqliteExecutor<'e>,
{
    let students = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
        .fetch_all(executor)
        .await?;
    Ok(students)
}
