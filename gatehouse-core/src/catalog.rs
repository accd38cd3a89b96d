use chrono::Utc;
use gatehouse_types::{
    AreaType, AreaTypeId, AreaTypeInput, Permission, PermissionId, PermissionInput,
    PermissionType, PermissionTypeId, PermissionTypeInput, Role, RoleId, RoleInput, User, UserId,
    UserInput,
};
use tracing::info;

use crate::error::{EntityKind, RbacError, RbacResult};
use crate::store::SharedStore;
use crate::validation::{
    validate_actor, validate_area_type, validate_permission_type, validate_role, validate_user,
};

/// Create, read, update and delete for catalog rows.
///
/// Inputs are validated before the store is touched. Deletes of missing rows
/// report `false` instead of failing.
#[derive(Debug, Clone)]
pub struct Catalog {
    store: SharedStore,
}

fn single<T>(rows: Vec<T>, kind: EntityKind) -> RbacResult<T> {
    rows.into_iter().next().ok_or_else(|| RbacError::Persistence {
        path: "store".to_string(),
        message: format!("insert of {kind} returned no row"),
    })
}

fn found<T>(row: Option<T>, kind: EntityKind, id: impl Into<i64>) -> RbacResult<T> {
    row.ok_or_else(|| RbacError::not_found(kind, id))
}

impl Catalog {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // Users

    pub async fn create_user(&self, input: UserInput, actor: &str) -> RbacResult<User> {
        single(self.create_users(vec![input], actor).await?, EntityKind::User)
    }

    pub async fn create_users(&self, inputs: Vec<UserInput>, actor: &str) -> RbacResult<Vec<User>> {
        validate_actor(actor)?;
        for input in &inputs {
            validate_user(input)?;
        }
        let users = self.store.insert_users(inputs, actor, Utc::now()).await?;
        info!("{} created {} user(s)", actor, users.len());
        Ok(users)
    }

    pub async fn get_user(&self, id: UserId) -> RbacResult<User> {
        found(self.store.get_user(id).await?, EntityKind::User, id)
    }

    pub async fn list_users(&self) -> RbacResult<Vec<User>> {
        self.store.list_users().await
    }

    pub async fn update_user(&self, id: UserId, input: UserInput, actor: &str) -> RbacResult<User> {
        validate_actor(actor)?;
        validate_user(&input)?;
        let user = self.store.update_user(id, input, actor, Utc::now()).await?;
        let user = found(user, EntityKind::User, id)?;
        info!("{} updated user {} ({})", actor, id, user.email);
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId, actor: &str) -> RbacResult<bool> {
        validate_actor(actor)?;
        let deleted = self.store.delete_user(id).await?;
        if deleted {
            info!("{} deleted user {}", actor, id);
        }
        Ok(deleted)
    }

    // Roles

    pub async fn create_role(&self, input: RoleInput, actor: &str) -> RbacResult<Role> {
        single(self.create_roles(vec![input], actor).await?, EntityKind::Role)
    }

    pub async fn create_roles(&self, inputs: Vec<RoleInput>, actor: &str) -> RbacResult<Vec<Role>> {
        validate_actor(actor)?;
        for input in &inputs {
            validate_role(input)?;
        }
        let roles = self.store.insert_roles(inputs, actor, Utc::now()).await?;
        info!("{} created {} role(s)", actor, roles.len());
        Ok(roles)
    }

    pub async fn get_role(&self, id: RoleId) -> RbacResult<Role> {
        found(self.store.get_role(id).await?, EntityKind::Role, id)
    }

    pub async fn list_roles(&self) -> RbacResult<Vec<Role>> {
        self.store.list_roles().await
    }

    pub async fn update_role(&self, id: RoleId, input: RoleInput, actor: &str) -> RbacResult<Role> {
        validate_actor(actor)?;
        validate_role(&input)?;
        let role = self.store.update_role(id, input, actor, Utc::now()).await?;
        let role = found(role, EntityKind::Role, id)?;
        info!("{} updated role {} ('{}')", actor, id, role.name);
        Ok(role)
    }

    pub async fn delete_role(&self, id: RoleId, actor: &str) -> RbacResult<bool> {
        validate_actor(actor)?;
        let deleted = self.store.delete_role(id).await?;
        if deleted {
            info!("{} deleted role {}", actor, id);
        }
        Ok(deleted)
    }

    // Area types

    pub async fn create_area_type(&self, input: AreaTypeInput, actor: &str) -> RbacResult<AreaType> {
        single(
            self.create_area_types(vec![input], actor).await?,
            EntityKind::AreaType,
        )
    }

    pub async fn create_area_types(
        &self,
        inputs: Vec<AreaTypeInput>,
        actor: &str,
    ) -> RbacResult<Vec<AreaType>> {
        validate_actor(actor)?;
        for input in &inputs {
            validate_area_type(input)?;
        }
        let rows = self
            .store
            .insert_area_types(inputs, actor, Utc::now())
            .await?;
        info!("{} created {} area type(s)", actor, rows.len());
        Ok(rows)
    }

    /// Returns the area type with this exact name, creating it if needed.
    pub async fn ensure_area_type(&self, name: &str, actor: &str) -> RbacResult<AreaType> {
        validate_actor(actor)?;
        validate_area_type(&AreaTypeInput {
            name: name.to_string(),
        })?;
        let (row, created) = self
            .store
            .ensure_area_type(name, actor, Utc::now())
            .await?;
        if created {
            info!("{} created area type '{}'", actor, row.name);
        }
        Ok(row)
    }

    pub async fn get_area_type(&self, id: AreaTypeId) -> RbacResult<AreaType> {
        found(self.store.get_area_type(id).await?, EntityKind::AreaType, id)
    }

    pub async fn list_area_types(&self) -> RbacResult<Vec<AreaType>> {
        self.store.list_area_types().await
    }

    pub async fn update_area_type(
        &self,
        id: AreaTypeId,
        input: AreaTypeInput,
        actor: &str,
    ) -> RbacResult<AreaType> {
        validate_actor(actor)?;
        validate_area_type(&input)?;
        let row = self
            .store
            .update_area_type(id, input, actor, Utc::now())
            .await?;
        let row = found(row, EntityKind::AreaType, id)?;
        info!("{} renamed area type {} to '{}'", actor, id, row.name);
        Ok(row)
    }

    /// Rejected with `Referenced` while permissions still use the area type.
    pub async fn delete_area_type(&self, id: AreaTypeId, actor: &str) -> RbacResult<bool> {
        validate_actor(actor)?;
        let deleted = self.store.delete_area_type(id).await?;
        if deleted {
            info!("{} deleted area type {}", actor, id);
        }
        Ok(deleted)
    }

    // Permission types

    pub async fn create_permission_type(
        &self,
        input: PermissionTypeInput,
        actor: &str,
    ) -> RbacResult<PermissionType> {
        single(
            self.create_permission_types(vec![input], actor).await?,
            EntityKind::PermissionType,
        )
    }

    pub async fn create_permission_types(
        &self,
        inputs: Vec<PermissionTypeInput>,
        actor: &str,
    ) -> RbacResult<Vec<PermissionType>> {
        validate_actor(actor)?;
        for input in &inputs {
            validate_permission_type(input)?;
        }
        let rows = self
            .store
            .insert_permission_types(inputs, actor, Utc::now())
            .await?;
        info!("{} created {} permission type(s)", actor, rows.len());
        Ok(rows)
    }

    pub async fn ensure_permission_type(
        &self,
        name: &str,
        actor: &str,
    ) -> RbacResult<PermissionType> {
        validate_actor(actor)?;
        validate_permission_type(&PermissionTypeInput {
            name: name.to_string(),
        })?;
        let (row, created) = self
            .store
            .ensure_permission_type(name, actor, Utc::now())
            .await?;
        if created {
            info!("{} created permission type '{}'", actor, row.name);
        }
        Ok(row)
    }

    pub async fn get_permission_type(&self, id: PermissionTypeId) -> RbacResult<PermissionType> {
        found(
            self.store.get_permission_type(id).await?,
            EntityKind::PermissionType,
            id,
        )
    }

    pub async fn list_permission_types(&self) -> RbacResult<Vec<PermissionType>> {
        self.store.list_permission_types().await
    }

    pub async fn update_permission_type(
        &self,
        id: PermissionTypeId,
        input: PermissionTypeInput,
        actor: &str,
    ) -> RbacResult<PermissionType> {
        validate_actor(actor)?;
        validate_permission_type(&input)?;
        let row = self
            .store
            .update_permission_type(id, input, actor, Utc::now())
            .await?;
        let row = found(row, EntityKind::PermissionType, id)?;
        info!("{} renamed permission type {} to '{}'", actor, id, row.name);
        Ok(row)
    }

    pub async fn delete_permission_type(
        &self,
        id: PermissionTypeId,
        actor: &str,
    ) -> RbacResult<bool> {
        validate_actor(actor)?;
        let deleted = self.store.delete_permission_type(id).await?;
        if deleted {
            info!("{} deleted permission type {}", actor, id);
        }
        Ok(deleted)
    }

    // Permissions

    pub async fn create_permission(
        &self,
        input: PermissionInput,
        actor: &str,
    ) -> RbacResult<Permission> {
        single(
            self.create_permissions(vec![input], actor).await?,
            EntityKind::Permission,
        )
    }

    /// Fails with `NotFound` if any input references a missing area or
    /// permission type; nothing is inserted in that case.
    pub async fn create_permissions(
        &self,
        inputs: Vec<PermissionInput>,
        actor: &str,
    ) -> RbacResult<Vec<Permission>> {
        validate_actor(actor)?;
        let rows = self
            .store
            .insert_permissions(inputs, actor, Utc::now())
            .await?;
        info!("{} created {} permission(s)", actor, rows.len());
        Ok(rows)
    }

    pub async fn get_permission(&self, id: PermissionId) -> RbacResult<Permission> {
        found(
            self.store.get_permission(id).await?,
            EntityKind::Permission,
            id,
        )
    }

    pub async fn list_permissions(&self) -> RbacResult<Vec<Permission>> {
        self.store.list_permissions().await
    }

    pub async fn update_permission(
        &self,
        id: PermissionId,
        input: PermissionInput,
        actor: &str,
    ) -> RbacResult<Permission> {
        validate_actor(actor)?;
        let row = self
            .store
            .update_permission(id, input, actor, Utc::now())
            .await?;
        let row = found(row, EntityKind::Permission, id)?;
        info!("{} updated permission {}", actor, id);
        Ok(row)
    }

    pub async fn delete_permission(&self, id: PermissionId, actor: &str) -> RbacResult<bool> {
        validate_actor(actor)?;
        let deleted = self.store.delete_permission(id).await?;
        if deleted {
            info!("{} deleted permission {}", actor, id);
        }
        Ok(deleted)
    }
}
