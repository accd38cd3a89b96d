use gatehouse_types::{
    AreaTypeInput, EffectiveWindow, OverrideMode, PermissionTypeInput, RoleInput, UserInput,
};

use crate::error::{RbacError, RbacResult};

/// Mutations must name who performs them; an empty actor is rejected.
pub fn validate_actor(actor: &str) -> RbacResult<()> {
    if actor.trim().is_empty() {
        return Err(RbacError::invalid_input("actor must not be empty"));
    }
    Ok(())
}

pub fn parse_override_mode(mode: &str) -> RbacResult<OverrideMode> {
    mode.parse::<OverrideMode>().map_err(RbacError::from)
}

fn require_non_blank(field: &str, value: &str) -> RbacResult<()> {
    if value.trim().is_empty() {
        return Err(RbacError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn validate_user(input: &UserInput) -> RbacResult<()> {
    require_non_blank("email", &input.email)?;
    if !input.email.contains('@') {
        return Err(RbacError::invalid_input(format!(
            "'{}' is not an email address",
            input.email
        )));
    }
    Ok(())
}

pub fn validate_role(input: &RoleInput) -> RbacResult<()> {
    require_non_blank("role name", &input.name)
}

pub fn validate_area_type(input: &AreaTypeInput) -> RbacResult<()> {
    require_non_blank("area type name", &input.name)
}

pub fn validate_permission_type(input: &PermissionTypeInput) -> RbacResult<()> {
    require_non_blank("permission type name", &input.name)
}

pub fn validate_window(window: &EffectiveWindow) -> RbacResult<()> {
    if !window.is_valid() {
        return Err(RbacError::invalid_input(
            "effective_from must not be after effective_through",
        ));
    }
    Ok(())
}
