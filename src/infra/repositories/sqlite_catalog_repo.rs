use crate::domain::models::{menu::Menu, staff::Staff};
use crate::domain::ports::{MenuRepository, StaffRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteMenuRepo {
    pool: SqlitePool,
}

impl SqliteMenuRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for SqliteMenuRepo {
    async fn create(&self, menu: &Menu) -> Result<Menu, AppError> {
        sqlx::query_as::<_, Menu>(
            "INSERT INTO menus (id, name, price, duration_min, description, sort_order, active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&menu.id).bind(&menu.name).bind(menu.price).bind(menu.duration_min)
            .bind(&menu.description).bind(menu.sort_order).bind(menu.active).bind(menu.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Menu>, AppError> {
        sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Menu>, AppError> {
        sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE active = 1 ORDER BY sort_order ASC, name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, menu: &Menu) -> Result<Menu, AppError> {
        sqlx::query_as::<_, Menu>(
            "UPDATE menus SET name=?, price=?, duration_min=?, description=?, sort_order=?, active=? WHERE id=? RETURNING *"
        )
            .bind(&menu.name).bind(menu.price).bind(menu.duration_min).bind(&menu.description)
            .bind(menu.sort_order).bind(menu.active).bind(&menu.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Menu not found".into()))
    }
}

pub struct SqliteStaffRepo {
    pool: SqlitePool,
}

impl SqliteStaffRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffRepository for SqliteStaffRepo {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError> {
        sqlx::query_as::<_, Staff>(
            "INSERT INTO staffs (id, name, role, specialty, line_user_id, sort_order, active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&staff.id).bind(&staff.name).bind(&staff.role).bind(&staff.specialty)
            .bind(&staff.line_user_id).bind(staff.sort_order).bind(staff.active).bind(staff.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staffs WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staffs WHERE active = 1 ORDER BY sort_order ASC, name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, staff: &Staff) -> Result<Staff, AppError> {
        sqlx::query_as::<_, Staff>(
            "UPDATE staffs SET name=?, role=?, specialty=?, line_user_id=?, sort_order=?, active=? WHERE id=? RETURNING *"
        )
            .bind(&staff.name).bind(&staff.role).bind(&staff.specialty).bind(&staff.line_user_id)
            .bind(staff.sort_order).bind(staff.active).bind(&staff.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Staff not found".into()))
    }
}
