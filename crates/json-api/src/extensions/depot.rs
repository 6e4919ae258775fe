//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use storefront_app::{auth::Principal, domain::users::records::UserUuid};

const PRINCIPAL_DEPOT_KEY: &str = "principal";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_principal(&mut self, principal: Principal);

    fn principal_or_401(&self) -> Result<Principal, StatusError>;

    fn user_or_401(&self) -> Result<UserUuid, StatusError> {
        self.principal_or_401().map(|principal| principal.user)
    }

    fn admin_or_403(&self) -> Result<Principal, StatusError> {
        let principal = self.principal_or_401()?;

        if !principal.is_admin {
            return Err(StatusError::forbidden().brief("Admin access required"));
        }

        Ok(principal)
    }
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.insert(PRINCIPAL_DEPOT_KEY, principal);
    }

    fn principal_or_401(&self) -> Result<Principal, StatusError> {
        self.get::<Principal>(PRINCIPAL_DEPOT_KEY)
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn principal(is_admin: bool) -> Principal {
        Principal {
            user: UserUuid::from_uuid(Uuid::nil()),
            is_admin,
        }
    }

    #[test]
    fn missing_principal_is_unauthorized() {
        let depot = Depot::new();

        let error = depot.principal_or_401().err();

        assert_eq!(
            error.map(|error| error.code),
            Some(salvo::http::StatusCode::UNAUTHORIZED)
        );
    }

    #[test]
    fn inserted_principal_is_returned() {
        let mut depot = Depot::new();

        depot.insert_principal(principal(false));

        assert_eq!(depot.principal_or_401().ok(), Some(principal(false)));
        assert_eq!(depot.user_or_401().ok(), Some(UserUuid::from_uuid(Uuid::nil())));
    }

    #[test]
    fn non_admin_is_forbidden() {
        let mut depot = Depot::new();

        depot.insert_principal(principal(false));

        let error = depot.admin_or_403().err();

        assert_eq!(
            error.map(|error| error.code),
            Some(salvo::http::StatusCode::FORBIDDEN)
        );
    }

    #[test]
    fn admin_passes() {
        let mut depot = Depot::new();

        depot.insert_principal(principal(true));

        assert_eq!(depot.admin_or_403().ok(), Some(principal(true)));
    }
}
