//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};
use storefront_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        carts::MockCartsService, checkout::MockCheckoutService,
        discounts::{MockDiscountSweeper, MockDiscountsService},
        games::MockGamesService, users::{MockUsersService, records::UserUuid},
    },
};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());
pub(crate) const TEST_ADMIN_UUID: UserUuid = UserUuid::from_uuid(Uuid::max());

/// One mock per service. Unconfigured mocks fail on any call.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) checkout: MockCheckoutService,
    pub(crate) discounts: MockDiscountsService,
    pub(crate) sweeper: MockDiscountSweeper,
    pub(crate) carts: MockCartsService,
    pub(crate) users: MockUsersService,
    pub(crate) games: MockGamesService,
    pub(crate) auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        self.into_state_with_trigger(Arc::new(Notify::new()))
    }

    pub(crate) fn into_state_with_trigger(self, sweep_trigger: Arc<Notify>) -> Arc<State> {
        let app = AppContext {
            checkout: Arc::new(self.checkout),
            discounts: Arc::new(self.discounts),
            sweeper: Arc::new(self.sweeper),
            carts: Arc::new(self.carts),
            users: Arc::new(self.users),
            games: Arc::new(self.games),
            auth: Arc::new(self.auth),
        };

        State::from_app_context(app, sweep_trigger)
    }
}

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(Principal {
        user: TEST_USER_UUID,
        is_admin: false,
    });
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(Principal {
        user: TEST_ADMIN_UUID,
        is_admin: true,
    });
    ctrl.call_next(req, depot, res).await;
}

/// Serve `route` as a signed-in regular user.
pub(crate) fn user_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_user)
            .push(route),
    )
}

/// Serve `route` as a signed-in admin.
pub(crate) fn admin_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_admin)
            .push(route),
    )
}
