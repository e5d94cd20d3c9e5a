use axum::http::StatusCode;

use marketplace_auth::{CommandAuthorization, Permission};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Small helper wrapper to associate required permissions with a command.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CmdAuth<C> {
    pub fn new(inner: C, perm: &'static str) -> Self {
        Self {
            inner,
            required: vec![Permission::new(perm)],
        }
    }

    /// Authorize against the caller's roles, yielding the wrapped command.
    pub fn authorize(self, principal: &PrincipalContext) -> Result<C, axum::response::Response> {
        match crate::authz::authorize_command(principal, &self) {
            Ok(()) => Ok(self.inner),
            Err(e) => Err(errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())),
        }
    }
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}
