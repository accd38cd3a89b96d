use chrono::{DateTime, Utc};
use gatehouse_types::{
    AreaType, AreaTypeId, AreaTypeInput, AuditStamp, Permission, PermissionId, PermissionInput,
    PermissionType, PermissionTypeId, PermissionTypeInput, Role, RoleId, RoleInput,
    RolePermission, User, UserId, UserInput, UserPermission, UserRole,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EntityKind, RbacError, RbacResult};

/// Rows keyed by id, with a monotonic id sequence starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Allocates the next id and stores the row built for it.
    pub fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Keeps only rows matching the predicate, returning how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| keep(row));
        before - self.rows.len()
    }
}

/// A catalog row that is created from and updated by an input struct.
pub trait CatalogRow: Clone {
    type Id: Copy + From<i64> + Into<i64>;
    type Input;

    fn build(id: Self::Id, input: Self::Input, actor: &str, at: DateTime<Utc>) -> Self;

    fn apply(&mut self, input: Self::Input, actor: &str, at: DateTime<Utc>);
}

impl<T: CatalogRow> Table<T> {
    pub fn insert_input(&mut self, input: T::Input, actor: &str, at: DateTime<Utc>) -> T {
        self.insert_with(|id| T::build(T::Id::from(id), input, actor, at))
    }

    pub fn update_input(
        &mut self,
        id: T::Id,
        input: T::Input,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Option<T> {
        let row = self.get_mut(id.into())?;
        row.apply(input, actor, at);
        Some(row.clone())
    }
}

/// A catalog row whose name is unique within its table. Name-form capability
/// checks depend on each name resolving to exactly one row.
pub trait NamedRow: CatalogRow {
    const KIND: EntityKind;

    fn row_id(&self) -> i64;

    fn name(&self) -> &str;

    fn input_name(input: &Self::Input) -> &str;

    fn named(name: &str) -> Self::Input;
}

impl<T: NamedRow> Table<T> {
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.values().find(|row| row.name() == name)
    }

    fn check_name_free(&self, name: &str, owner: Option<i64>) -> RbacResult<()> {
        match self.find_by_name(name) {
            Some(row) if Some(row.row_id()) != owner => Err(RbacError::Duplicate {
                kind: T::KIND,
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Inserts all rows, failing on a name that is taken, including by an
    /// earlier input of the same batch.
    pub fn insert_named(
        &mut self,
        inputs: Vec<T::Input>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<T>> {
        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            self.check_name_free(T::input_name(&input), None)?;
            rows.push(self.insert_input(input, actor, at));
        }
        Ok(rows)
    }

    pub fn update_named(
        &mut self,
        id: T::Id,
        input: T::Input,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<T>> {
        if !self.contains(id.into()) {
            return Ok(None);
        }
        self.check_name_free(T::input_name(&input), Some(id.into()))?;
        Ok(self.update_input(id, input, actor, at))
    }

    /// Returns the row with this name, inserting it first if there is none.
    /// The flag tells whether a row was created.
    pub fn ensure_named(&mut self, name: &str, actor: &str, at: DateTime<Utc>) -> (T, bool) {
        if let Some(existing) = self.find_by_name(name) {
            return (existing.clone(), false);
        }
        (self.insert_input(T::named(name), actor, at), true)
    }
}

impl CatalogRow for User {
    type Id = UserId;
    type Input = UserInput;

    fn build(id: UserId, input: UserInput, actor: &str, at: DateTime<Utc>) -> Self {
        User {
            id,
            oid: input.oid,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            is_active: input.is_active,
            is_retired: input.is_retired,
            audit: AuditStamp::created(actor, at),
        }
    }

    fn apply(&mut self, input: UserInput, actor: &str, at: DateTime<Utc>) {
        self.oid = input.oid;
        self.email = input.email;
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.is_active = input.is_active;
        self.is_retired = input.is_retired;
        self.audit.touch(actor, at);
    }
}

impl CatalogRow for Role {
    type Id = RoleId;
    type Input = RoleInput;

    fn build(id: RoleId, input: RoleInput, actor: &str, at: DateTime<Utc>) -> Self {
        Role {
            id,
            name: input.name,
            description: input.description,
            is_active: input.is_active,
            is_retired: input.is_retired,
            audit: AuditStamp::created(actor, at),
        }
    }

    fn apply(&mut self, input: RoleInput, actor: &str, at: DateTime<Utc>) {
        self.name = input.name;
        self.description = input.description;
        self.is_active = input.is_active;
        self.is_retired = input.is_retired;
        self.audit.touch(actor, at);
    }
}

impl CatalogRow for AreaType {
    type Id = AreaTypeId;
    type Input = AreaTypeInput;

    fn build(id: AreaTypeId, input: AreaTypeInput, actor: &str, at: DateTime<Utc>) -> Self {
        AreaType {
            id,
            name: input.name,
            audit: AuditStamp::created(actor, at),
        }
    }

    fn apply(&mut self, input: AreaTypeInput, actor: &str, at: DateTime<Utc>) {
        self.name = input.name;
        self.audit.touch(actor, at);
    }
}

impl CatalogRow for PermissionType {
    type Id = PermissionTypeId;
    type Input = PermissionTypeInput;

    fn build(
        id: PermissionTypeId,
        input: PermissionTypeInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Self {
        PermissionType {
            id,
            name: input.name,
            audit: AuditStamp::created(actor, at),
        }
    }

    fn apply(&mut self, input: PermissionTypeInput, actor: &str, at: DateTime<Utc>) {
        self.name = input.name;
        self.audit.touch(actor, at);
    }
}

impl NamedRow for AreaType {
    const KIND: EntityKind = EntityKind::AreaType;

    fn row_id(&self) -> i64 {
        self.id.into()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_name(input: &AreaTypeInput) -> &str {
        &input.name
    }

    fn named(name: &str) -> AreaTypeInput {
        AreaTypeInput {
            name: name.to_string(),
        }
    }
}

impl NamedRow for PermissionType {
    const KIND: EntityKind = EntityKind::PermissionType;

    fn row_id(&self) -> i64 {
        self.id.into()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_name(input: &PermissionTypeInput) -> &str {
        &input.name
    }

    fn named(name: &str) -> PermissionTypeInput {
        PermissionTypeInput {
            name: name.to_string(),
        }
    }
}

impl CatalogRow for Permission {
    type Id = PermissionId;
    type Input = PermissionInput;

    fn build(id: PermissionId, input: PermissionInput, actor: &str, at: DateTime<Utc>) -> Self {
        Permission {
            id,
            area_type_id: input.area_type_id,
            permission_type_id: input.permission_type_id,
            instance: input.instance,
            description: input.description,
            audit: AuditStamp::created(actor, at),
        }
    }

    fn apply(&mut self, input: PermissionInput, actor: &str, at: DateTime<Utc>) {
        self.area_type_id = input.area_type_id;
        self.permission_type_id = input.permission_type_id;
        self.instance = input.instance;
        self.description = input.description;
        self.audit.touch(actor, at);
    }
}

/// The complete state of a store. This is also the snapshot file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub users: Table<User>,
    pub roles: Table<Role>,
    pub area_types: Table<AreaType>,
    pub permission_types: Table<PermissionType>,
    pub permissions: Table<Permission>,
    pub user_roles: Table<UserRole>,
    pub role_permissions: Table<RolePermission>,
    pub user_permissions: Table<UserPermission>,
}
