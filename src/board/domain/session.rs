//! Capability-tagged session context.

use super::{BoardDomainError, Pipeline, Role, UserId};

/// Signed-in user with separate permission and viewing roles.
///
/// The permission role decides what the user may do; the viewing role
/// decides which pipeline the board shows. Only the privileged role may
/// view another role's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    permission_role: Role,
    viewing_role: Role,
}

impl Session {
    /// Opens a session for a user holding `role`.
    ///
    /// The privileged role has no pipeline of its own and starts on the
    /// first working role's board.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        let [first_working_role, ..] = Role::WORKING_ROLES;
        let viewing_role = if role.is_privileged() {
            first_working_role
        } else {
            role
        };
        Self {
            user_id,
            permission_role: role,
            viewing_role,
        }
    }

    /// Returns the signed-in user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the role used for permission checks.
    #[must_use]
    pub const fn permission_role(&self) -> Role {
        self.permission_role
    }

    /// Returns the role whose pipeline is on screen.
    #[must_use]
    pub const fn viewing_role(&self) -> Role {
        self.viewing_role
    }

    /// Returns the pipeline of the viewing role.
    #[must_use]
    pub const fn pipeline(&self) -> Pipeline {
        Pipeline::for_role(self.viewing_role)
    }

    /// Returns whether the session carries elevated permissions.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.permission_role.is_privileged()
    }

    /// Returns whether the session may delete tasks outright.
    #[must_use]
    pub const fn can_delete(&self) -> bool {
        self.is_privileged()
    }

    /// Returns whether the session may export reports.
    #[must_use]
    pub const fn can_export(&self) -> bool {
        self.is_privileged()
    }

    /// Switches the board to another role's pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::ViewNotPermitted`] when a non-privileged
    /// session asks for another role, or when any session asks for a role
    /// without a pipeline.
    pub fn view_as(&mut self, role: Role) -> Result<(), BoardDomainError> {
        let has_pipeline = !Pipeline::for_role(role).is_empty();
        let permitted = has_pipeline && (self.is_privileged() || role == self.permission_role);
        if !permitted {
            return Err(BoardDomainError::ViewNotPermitted {
                permission_role: self.permission_role,
                requested: role,
            });
        }
        self.viewing_role = role;
        Ok(())
    }

    /// Checks the delete privilege.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::DeleteNotPermitted`] for non-privileged
    /// sessions.
    pub const fn ensure_can_delete(&self) -> Result<(), BoardDomainError> {
        if self.can_delete() {
            Ok(())
        } else {
            Err(BoardDomainError::DeleteNotPermitted(self.permission_role))
        }
    }

    /// Checks the export privilege.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::ExportNotPermitted`] for non-privileged
    /// sessions.
    pub const fn ensure_can_export(&self) -> Result<(), BoardDomainError> {
        if self.can_export() {
            Ok(())
        } else {
            Err(BoardDomainError::ExportNotPermitted(self.permission_role))
        }
    }
}
